//! AquaShield: Predictive Risk Intelligence Core
//!
//! Turns scenario parameters and live telemetry into zone risk scores,
//! contamination plumes, vessel statuses and human-actionable alerts.
//!
//! ## Engines
//!
//! - **Fragility** ([`fragility`], [`dispatch`]): zone fragility scoring under
//!   a scenario, plus tanker dispatch from low-risk to critical zones
//! - **Plume** ([`plume`]): hour-by-hour contamination plume with
//!   infrastructure and population exposure
//! - **Marine** ([`marine`]): AIS anomaly classification and oil spill
//!   estimation
//!
//! All three feed [`advisory`] for alerts and recommendations. [`RiskCore`]
//! exposes the public operations; [`api`] serves them over HTTP.

pub mod advisory;
pub mod api;
pub mod cfc;
pub mod config;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod fragility;
pub mod geo;
pub mod history;
pub mod marine;
pub mod plume;
pub mod types;

// Re-export configuration
pub use config::{ConfigError, RiskConfig};

// Re-export the operation surface
pub use engine::{
    FragilityRequest, NetworkOptRequest, NetworkPlan, OilSpillRequest, RiskCore,
    VesselAnomalyRequest,
};
pub use plume::PropagationRequest;

// Re-export errors
pub use error::{ComputationError, CoreError, CoreResult, ValidationError};

// Re-export commonly used types
pub use types::{
    Alert, FragilityAnalysis, GeoPoint, MarineAnalysis, OilSpillEstimate, PropagationResult,
    Recommendation, Severity, Vessel, VesselClass, Zone, ZoneStatus,
};

// Re-export history sinks
pub use history::{ChannelSink, HistoryRecord, HistorySink, NullSink};
