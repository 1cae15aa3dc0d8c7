//! Shared data structures for the risk engines
//!
//! - Zone, FeatureVector, ScenarioProfile inputs, DispatchRoute (urban water)
//! - Vessel, AnomalyRecord, VesselStatus, OilSpillEstimate (marine)
//! - ContaminationSource, PlumeTimeStep, RiskSummary (contamination cascade)
//! - Alert, Recommendation (shared advisory output)
//!
//! Every value here is created inside one analysis call and owned by its
//! result. Nothing is mutated after it is returned.

mod alert;
mod marine;
mod plume;
mod zone;

pub use alert::*;
pub use marine::*;
pub use plume::*;
pub use zone::*;

use serde::{Deserialize, Serialize};

/// WGS84 position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Both coordinates finite and inside WGS84 bounds.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }
}
