//! Infrastructure & Population Risk Evaluator
//!
//! Cross-references each plume step against the fixed facility registry and
//! the study region's population density, then folds the whole run into a
//! [`RiskSummary`].

use std::collections::BTreeMap;

use crate::config::PlumeConfig;
use crate::geo::haversine_m;
use crate::types::{
    CriticalityTier, ExposureLevel, FacilityImpact, GeoPoint, InfrastructureAtRisk,
    InfrastructureKind, PlumeTimeStep, RiskSummary, SourceType,
};

/// Facilities at or above this capacity (MLD) are primary supply.
pub const PRIMARY_CAPACITY_MLD: f64 = 1000.0;

/// A water facility the evaluator watches.
#[derive(Debug, Clone, PartialEq)]
pub struct Facility {
    pub name: String,
    pub kind: InfrastructureKind,
    pub position: GeoPoint,
    /// Capacity (million litres per day)
    pub capacity_mld: f64,
}

impl Facility {
    pub fn tier(&self) -> CriticalityTier {
        if self.capacity_mld >= PRIMARY_CAPACITY_MLD {
            CriticalityTier::Primary
        } else {
            CriticalityTier::Secondary
        }
    }
}

/// Read-only facility registry.
#[derive(Debug, Clone)]
pub struct InfrastructureRegistry {
    facilities: Vec<Facility>,
}

impl InfrastructureRegistry {
    pub fn new(facilities: Vec<Facility>) -> Self {
        Self { facilities }
    }

    /// Greater Mumbai supply facilities.
    pub fn mumbai() -> Self {
        let f = |name: &str, lat: f64, lon: f64, kind: InfrastructureKind, capacity_mld: f64| Facility {
            name: name.to_string(),
            kind,
            position: GeoPoint::new(lat, lon),
            capacity_mld,
        };
        Self::new(vec![
            f("Bhandup Water Treatment Plant", 19.1550, 72.9375, InfrastructureKind::TreatmentPlant, 2000.0),
            f("Panjrapur Intake", 19.1200, 72.9100, InfrastructureKind::Intake, 800.0),
            f("Vehar Lake Pumping", 19.1580, 72.9050, InfrastructureKind::PumpingStation, 500.0),
            f("Tulsi Lake Reserve", 19.2100, 72.9130, InfrastructureKind::Reservoir, 1200.0),
            f("Coastal Intake South", 18.9500, 72.8200, InfrastructureKind::Intake, 600.0),
        ])
    }

    pub fn facilities(&self) -> &[Facility] {
        &self.facilities
    }
}

impl Default for InfrastructureRegistry {
    fn default() -> Self {
        Self::mumbai()
    }
}

/// Facilities within the plume's risk radii, nearest first.
///
/// Distance is measured to the plume centroid: under `radius * critical_factor`
/// is critical, under `radius * warning_factor` is warning.
pub fn facilities_at_risk(
    registry: &InfrastructureRegistry,
    center: GeoPoint,
    radius_m: f64,
    config: &PlumeConfig,
) -> Vec<InfrastructureAtRisk> {
    let critical = radius_m * config.critical_radius_factor;
    let warning = radius_m * config.warning_radius_factor;

    let mut at_risk: Vec<InfrastructureAtRisk> = registry
        .facilities()
        .iter()
        .filter_map(|f| {
            let dist = haversine_m(center, f.position);
            let level = if dist < critical {
                ExposureLevel::Critical
            } else if dist < warning {
                ExposureLevel::Warning
            } else {
                return None;
            };
            Some(InfrastructureAtRisk {
                name: f.name.clone(),
                kind: f.kind,
                tier: f.tier(),
                distance_km: (dist / 10.0).round() / 100.0,
                risk_level: level,
            })
        })
        .collect();
    at_risk.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km).then_with(|| a.name.cmp(&b.name)));
    at_risk
}

/// Residents exposed inside a footprint. Zero for an empty footprint.
pub fn population_exposure(area_km2: f64, config: &PlumeConfig) -> u64 {
    if area_km2.is_nan() || area_km2 <= 0.0 {
        return 0;
    }
    (area_km2 * config.population_density_per_km2 * config.exposed_fraction).floor() as u64
}

/// Aggregate a complete run. Every step is scanned, not just the last:
/// a facility the plume passes and leaves still counts.
pub fn summarize(source_type: SourceType, steps: &[PlumeTimeStep]) -> RiskSummary {
    let mut impacts: BTreeMap<&str, FacilityImpact> = BTreeMap::new();
    for step in steps {
        for infra in &step.infrastructure_at_risk {
            impacts
                .entry(infra.name.as_str())
                .and_modify(|imp| {
                    imp.worst_level = imp.worst_level.max(infra.risk_level);
                    imp.min_distance_km = imp.min_distance_km.min(infra.distance_km);
                })
                .or_insert_with(|| FacilityImpact {
                    name: infra.name.clone(),
                    kind: infra.kind,
                    tier: infra.tier,
                    first_hour: step.hour,
                    worst_level: infra.risk_level,
                    min_distance_km: infra.distance_km,
                });
        }
    }

    let mut facilities: Vec<FacilityImpact> = impacts.into_values().collect();
    facilities.sort_by(|a, b| a.first_hour.cmp(&b.first_hour).then_with(|| a.name.cmp(&b.name)));

    let count = |kind: InfrastructureKind| facilities.iter().filter(|f| f.kind == kind).count();

    RiskSummary {
        contamination_type: source_type,
        treatment_plants_at_risk: count(InfrastructureKind::TreatmentPlant),
        intakes_at_risk: count(InfrastructureKind::Intake),
        max_population_exposure: steps
            .iter()
            .map(|s| s.estimated_population_exposure)
            .max()
            .unwrap_or(0),
        max_area_km2: steps.iter().map(|s| s.area_km2).fold(0.0, f64::max),
        facilities,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(hour: u32, area_km2: f64, exposure: u64, infra: Vec<InfrastructureAtRisk>) -> PlumeTimeStep {
        PlumeTimeStep {
            hour,
            center: GeoPoint::new(19.0, 72.8),
            radius_m: 0.0,
            radius_km: 0.0,
            plume_polygon: Vec::new(),
            intensity: 0.5,
            risk_grid: Vec::new(),
            area_km2,
            estimated_population_exposure: exposure,
            infrastructure_at_risk: infra,
        }
    }

    fn hit(name: &str, kind: InfrastructureKind, dist: f64, level: ExposureLevel) -> InfrastructureAtRisk {
        InfrastructureAtRisk {
            name: name.to_string(),
            kind,
            tier: CriticalityTier::Secondary,
            distance_km: dist,
            risk_level: level,
        }
    }

    #[test]
    fn test_tiers_by_capacity() {
        let reg = InfrastructureRegistry::default();
        let tiers: Vec<_> = reg.facilities().iter().map(|f| f.tier()).collect();
        assert_eq!(
            tiers,
            vec![
                CriticalityTier::Primary,
                CriticalityTier::Secondary,
                CriticalityTier::Secondary,
                CriticalityTier::Primary,
                CriticalityTier::Secondary,
            ]
        );
    }

    #[test]
    fn test_radius_bands() {
        let reg = InfrastructureRegistry::default();
        let config = PlumeConfig::default();
        let bhandup = reg.facilities()[0].position;

        let at = facilities_at_risk(&reg, bhandup, 500.0, &config);
        assert_eq!(at[0].name, "Bhandup Water Treatment Plant");
        assert_eq!(at[0].risk_level, ExposureLevel::Critical);
        assert_eq!(at[0].tier, CriticalityTier::Primary);

        // ~2.5 km south of Bhandup: outside 2 km, inside 4 km
        let south = GeoPoint::new(19.1325, 72.9375);
        let at = facilities_at_risk(&reg, south, 2000.0, &config);
        let b = at.iter().find(|a| a.name.starts_with("Bhandup")).unwrap();
        assert_eq!(b.risk_level, ExposureLevel::Warning);

        assert!(facilities_at_risk(&reg, GeoPoint::new(18.5, 72.0), 2000.0, &config).is_empty());
    }

    #[test]
    fn test_exposure_zero_for_zero_area() {
        let config = PlumeConfig::default();
        assert_eq!(population_exposure(0.0, &config), 0);
        assert_eq!(population_exposure(-1.0, &config), 0);
        assert_eq!(population_exposure(f64::NAN, &config), 0);
        assert_eq!(population_exposure(2.0, &config), 15_000);
    }

    #[test]
    fn test_summary_scans_every_step() {
        let steps = vec![
            step(0, 0.1, 750, vec![]),
            step(
                1,
                1.0,
                7_500,
                vec![
                    hit("Intake A", InfrastructureKind::Intake, 3.0, ExposureLevel::Warning),
                    hit("Plant", InfrastructureKind::TreatmentPlant, 1.0, ExposureLevel::Critical),
                ],
            ),
            step(2, 2.0, 15_000, vec![hit("Intake A", InfrastructureKind::Intake, 1.5, ExposureLevel::Critical)]),
            // plume has moved past everything by the final hour
            step(3, 3.0, 22_500, vec![]),
        ];
        let s = summarize(SourceType::OilSpill, &steps);
        assert_eq!(s.treatment_plants_at_risk, 1);
        assert_eq!(s.intakes_at_risk, 1);
        assert_eq!(s.max_population_exposure, 22_500);
        assert_eq!(s.max_area_km2, 3.0);

        let intake = s.facilities.iter().find(|f| f.name == "Intake A").unwrap();
        assert_eq!(intake.first_hour, 1);
        assert_eq!(intake.worst_level, ExposureLevel::Critical);
        assert_eq!(intake.min_distance_km, 1.5);
    }
}
