//! Contamination cascade
//!
//! - [`simulator`]: hourly advection/diffusion plume steps
//! - [`infrastructure`]: facility registry, exposure and run summary
//!
//! [`PropagationRequest`] is the raw caller input; [`PropagationRequest::validate`]
//! turns it into a [`ContaminationSource`] and an hour count, or rejects it
//! before any step is computed.

pub mod infrastructure;
pub mod simulator;

pub use infrastructure::{
    facilities_at_risk, population_exposure, summarize, Facility, InfrastructureRegistry,
    PRIMARY_CAPACITY_MLD,
};
pub use simulator::PlumeSimulator;

use serde::{Deserialize, Serialize};

use crate::config::PlumeConfig;
use crate::error::ValidationError;
use crate::geo::MAX_FRAME_LAT_DEG;
use crate::types::{ContaminationSource, SourceType};

/// Raw `simulate_propagation` input.
///
/// Position is required, with latitude inside ±85° (polar sources are
/// rejected). Source type, flow and duration fall back to the configured
/// defaults ("Oil Spill", 180°, 2.0 m/s, 12 h).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropagationRequest {
    #[serde(default)]
    pub source_lat: Option<f64>,
    #[serde(default)]
    pub source_lon: Option<f64>,
    #[serde(default)]
    pub source_type: Option<String>,
    #[serde(default)]
    pub flow_direction: Option<f64>,
    #[serde(default)]
    pub flow_speed: Option<f64>,
    #[serde(default)]
    pub simulation_hours: Option<i64>,
}

fn check_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<f64, ValidationError> {
    if value.is_finite() && value >= min && value <= max {
        Ok(value)
    } else {
        Err(ValidationError::OutOfRange { field, value, min, max })
    }
}

impl PropagationRequest {
    /// Validate against `config`. Nothing is clamped: out-of-range values are errors.
    pub fn validate(&self, config: &PlumeConfig) -> Result<(ContaminationSource, u32), ValidationError> {
        let lat = self.source_lat.ok_or(ValidationError::MissingField("source_lat"))?;
        let lon = self.source_lon.ok_or(ValidationError::MissingField("source_lon"))?;
        let lat = check_range("source_lat", lat, -MAX_FRAME_LAT_DEG, MAX_FRAME_LAT_DEG)?;
        let lon = check_range("source_lon", lon, -180.0, 180.0)?;

        let source_type = match &self.source_type {
            Some(name) => name.parse::<SourceType>()?,
            None => SourceType::OilSpill,
        };
        let flow_direction = check_range(
            "flow_direction",
            self.flow_direction.unwrap_or(config.default_flow_direction_deg),
            0.0,
            360.0,
        )?;
        let flow_speed = check_range(
            "flow_speed",
            self.flow_speed.unwrap_or(config.default_flow_speed_ms),
            0.0,
            config.max_flow_speed_ms,
        )?;

        let hours = self.simulation_hours.unwrap_or(i64::from(config.default_hours));
        if hours < i64::from(config.min_hours) || hours > i64::from(config.max_hours) {
            return Err(ValidationError::SimulationHours {
                value: hours,
                min: config.min_hours,
                max: config.max_hours,
            });
        }

        Ok((
            ContaminationSource {
                lat,
                lon,
                source_type,
                flow_direction,
                flow_speed,
            },
            hours as u32,
        ))
    }
}
