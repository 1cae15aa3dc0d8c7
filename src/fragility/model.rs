//! Fragility scoring models.
//!
//! Scoring is a pluggable strategy behind [`FragilityModel`]. Two models ship:
//!
//! 1. **Calibrated** - zone baseline for the scenario, plus the manual stress
//!    delta, plus linear forecast drift per horizon hour.
//! 2. **Sequence** (default) - the calibrated score corrected by a seeded CfC
//!    network that reads the recent feature window and keeps integrating it
//!    forward over the horizon.
//!
//! Models return raw scores; clamping to 0-100 and tiering happen in the engine.

use crate::cfc::{CfcNetwork, DEFAULT_NEURONS};
use crate::config::FragilityConfig;
use crate::types::FeatureVector;

use super::registry::ZoneSite;
use super::scenario::Scenario;

/// Everything a model may look at for one zone.
#[derive(Debug, Clone, Copy)]
pub struct ScoringInput<'a> {
    pub zone: &'a ZoneSite,
    pub scenario: Scenario,
    /// Recent feature history, oldest first; the last entry is "now"
    pub history: &'a [FeatureVector],
    pub manual_delta: f64,
    /// Forecast horizon (hours ahead)
    pub horizon_hours: u32,
}

/// Trait for fragility scoring strategies.
pub trait FragilityModel: Send + Sync {
    /// Model name reported in results (e.g., "calibrated", "cfc-sequence")
    fn name(&self) -> &str;

    /// Raw fragility score for one zone
    fn score(&self, input: &ScoringInput<'_>) -> f64;
}

// ============================================================================
// Calibrated
// ============================================================================

/// Deterministic baseline + stress + drift.
#[derive(Debug, Clone)]
pub struct CalibratedModel {
    growth_per_hour: f64,
}

impl CalibratedModel {
    pub fn new(growth_per_hour: f64) -> Self {
        Self { growth_per_hour }
    }
}

impl FragilityModel for CalibratedModel {
    fn name(&self) -> &str {
        "calibrated"
    }

    fn score(&self, input: &ScoringInput<'_>) -> f64 {
        input.zone.baseline(input.scenario)
            + input.manual_delta
            + self.growth_per_hour * input.horizon_hours as f64
    }
}

// ============================================================================
// Sequence
// ============================================================================

/// Typical magnitude per feature, in `FeatureVector` order.
const FEATURE_SCALE: [f64; FeatureVector::LEN] = [25.0, 1.0, 10.0, 5.0, 1.0, 1.0];

/// Calibrated score plus a bounded CfC correction.
#[derive(Debug, Clone)]
pub struct SequenceModel {
    calibrated: CalibratedModel,
    network: CfcNetwork,
    /// Largest correction in score points (either sign)
    weight: f64,
}

impl SequenceModel {
    pub fn new(config: &FragilityConfig) -> Self {
        Self {
            calibrated: CalibratedModel::new(config.growth_per_hour),
            network: CfcNetwork::new(FeatureVector::LEN, DEFAULT_NEURONS, config.model_seed),
            weight: config.sequence_weight,
        }
    }

    fn normalize(f: &FeatureVector) -> Vec<f64> {
        f.to_array()
            .iter()
            .zip(FEATURE_SCALE)
            .map(|(v, s)| v / s)
            .collect()
    }
}

impl FragilityModel for SequenceModel {
    fn name(&self) -> &str {
        "cfc-sequence"
    }

    fn score(&self, input: &ScoringInput<'_>) -> f64 {
        let sequence: Vec<Vec<f64>> = input.history.iter().map(Self::normalize).collect();
        // 1h per sample; the horizon continues the integration under current conditions
        let correction = self.network.encode(&sequence, 1.0, input.horizon_hours);
        self.calibrated.score(input) + self.weight * correction
    }
}

/// Model used when none is injected.
pub fn default_model(config: &FragilityConfig) -> Box<dyn FragilityModel> {
    Box::new(SequenceModel::new(config))
}
