//! Oil Spill Probability Estimator
//!
//! Probability is a per-type base (tanker > cargo > other) plus a bonus per
//! anomaly kind present, capped. The slick is a static drift model: an
//! ellipse stretched along the last course over ground, its centre pushed a
//! fraction of a radius downstream from the vessel, radius scaled by
//! probability. No current or wind input.

use crate::config::OilSpillConfig;
use crate::error::ValidationError;
use crate::geo::{ellipse_area_m2, ellipse_ring, offset_bearing};
use crate::types::{
    AnomalyKind, OilSpillEstimate, Severity, VesselClass, VesselStatus, VesselType,
};

#[derive(Debug, Clone)]
pub struct OilSpillEstimator {
    config: OilSpillConfig,
}

impl OilSpillEstimator {
    pub fn new(config: OilSpillConfig) -> Self {
        Self { config }
    }

    /// Spill probability for a classified vessel, in [0, max_probability].
    pub fn probability(&self, status: &VesselStatus) -> f64 {
        let c = &self.config;
        let base = match status.vessel.vessel_type {
            VesselType::Tanker => c.tanker_probability,
            VesselType::Cargo => c.cargo_probability,
            _ => c.other_probability,
        };
        let bonus: f64 = [
            (AnomalyKind::UnexpectedStop, c.unexpected_stop_bonus),
            (AnomalyKind::SpeedDrop, c.speed_drop_bonus),
            (AnomalyKind::CourseDeviation, c.course_deviation_bonus),
        ]
        .iter()
        .filter(|(kind, _)| status.has_anomaly(*kind))
        .map(|(_, b)| b)
        .sum();
        (base + bonus).clamp(0.0, c.max_probability)
    }

    /// Estimate for a vessel already classified as distress. Anything else
    /// is rejected: no estimate exists for it.
    pub fn estimate(&self, status: &VesselStatus) -> Result<OilSpillEstimate, ValidationError> {
        if status.status != VesselClass::Distress {
            return Err(ValidationError::NotInDistress {
                imo: status.imo.clone(),
                status: status.status.to_string(),
            });
        }

        let c = &self.config;
        let probability = (self.probability(status) * 1000.0).round() / 1000.0;
        let radius_km = c.base_radius_km * (0.5 + probability);
        let radius_m = radius_km * 1000.0;
        let anchor = status.vessel.position();
        let course = status.vessel.cog;
        let center = offset_bearing(anchor, course, radius_m * c.drift_offset_fraction);
        let semi_major = radius_m * (1.0 + c.drift_elongation);
        let spill_polygon = ellipse_ring(center, semi_major, radius_m, course, c.ring_points);
        let area_km2 = (ellipse_area_m2(semi_major, radius_m) / 1e6 * 1000.0).round() / 1000.0;

        Ok(OilSpillEstimate {
            imo: status.imo.clone(),
            probability,
            area_km2,
            radius_km: (radius_km * 1000.0).round() / 1000.0,
            spill_polygon,
            center,
            anchor,
            severity: if probability > c.critical_probability {
                Severity::Critical
            } else {
                Severity::Warning
            },
        })
    }
}
