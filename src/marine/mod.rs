//! Marine oil spill early detection
//!
//! - [`fleet`]: deterministic simulated AIS fleet (seed → vessel batch)
//! - [`anomaly`]: kinematic anomaly rules and normal/suspicious/distress status
//! - [`oil_spill`]: spill probability and slick polygon for distressed vessels

pub mod anomaly;
pub mod fleet;
pub mod oil_spill;

pub use anomaly::{classify_anomalies, AnomalyDetector};
pub use fleet::{base_track, simulated_fleet, steady_history, BaseTrack, BASE_FLEET};
pub use oil_spill::OilSpillEstimator;

use crate::types::{MarineSummary, VesselClass, VesselStatus};

/// Status counts for a classified batch.
pub fn summarize(statuses: &[VesselStatus]) -> MarineSummary {
    let count = |class: VesselClass| statuses.iter().filter(|s| s.status == class).count();
    MarineSummary {
        total: statuses.len(),
        normal: count(VesselClass::Normal),
        suspicious: count(VesselClass::Suspicious),
        distress: count(VesselClass::Distress),
    }
}
