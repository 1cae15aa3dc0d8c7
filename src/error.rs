//! Error taxonomy for the risk engines.
//!
//! - [`ValidationError`]: the caller supplied something the engines refuse to
//!   compute on. Raised before any computation starts.
//! - [`ComputationError`]: an internal inconsistency surfaced while computing.
//!
//! Both fold into [`CoreError`], whose [`CoreError::kind`] is what the HTTP
//! layer reports next to the message. Nothing here is retried internally.

use thiserror::Error;

/// Rejected input.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("unknown scenario '{0}' (expected Normal, Flood Event, Power Failure or High Demand Crisis)")]
    UnknownScenario(String),

    #[error("time_step {value} outside forecast horizon 0-{max} hours")]
    HorizonOutOfRange { value: i64, max: u32 },

    #[error("manual parameter {field} = {value} outside valid range {min}-{max}")]
    ParameterOutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("unknown zone '{0}'")]
    UnknownZone(String),

    #[error("zone {zone} score {value} is not a finite value in 0-100")]
    InvalidZoneScore { zone: String, value: f64 },

    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("{field} = {value} outside valid range {min}-{max}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("simulation_hours {value} outside allowed range {min}-{max}")]
    SimulationHours { value: i64, min: u32, max: u32 },

    #[error("unknown contamination source type '{0}' (expected Oil Spill, Sewage Overflow or Industrial Discharge)")]
    UnknownSourceType(String),

    #[error("vessel {imo}: {reason}")]
    InvalidTelemetry { imo: String, reason: String },

    #[error("vessel {imo} is classified {status}, oil spill estimation requires distress")]
    NotInDistress { imo: String, status: String },
}

/// Internal inconsistency detected during a computation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ComputationError {
    #[error("zone registry is empty")]
    EmptyRegistry,

    #[error("dispatch graph references unknown zone {0}")]
    UnknownGraphNode(u32),

    #[error("fragility model '{model}' produced a non-finite score for zone {zone}")]
    NonFiniteScore { model: String, zone: String },
}

/// Structured failure returned by every core operation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Computation(#[from] ComputationError),
}

impl CoreError {
    /// Failure kind reported across the boundary.
    pub fn kind(&self) -> &'static str {
        match self {
            CoreError::Validation(_) => "validation",
            CoreError::Computation(_) => "computation",
        }
    }
}

pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_follows_variant() {
        let v: CoreError = ValidationError::MissingField("source_lat").into();
        assert_eq!(v.kind(), "validation");
        let c: CoreError = ComputationError::EmptyRegistry.into();
        assert_eq!(c.kind(), "computation");
    }

    #[test]
    fn test_messages_carry_identifying_fields() {
        let e = ValidationError::SimulationHours { value: 30, min: 1, max: 24 };
        assert_eq!(e.to_string(), "simulation_hours 30 outside allowed range 1-24");

        let e: CoreError = ValidationError::UnknownScenario("Drought".into()).into();
        assert!(e.to_string().contains("'Drought'"));
    }
}
