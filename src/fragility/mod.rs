//! Urban water network fragility
//!
//! - [`scenario`]: Scenario Normalizer (preset + manual overrides → features)
//! - [`registry`]: the monitored zones and their adjacency graph
//! - [`model`]: pluggable scoring strategies (calibrated, CfC sequence)
//! - [`sample`]: synthetic feature rows
//!
//! [`FragilityEngine`] scores every registered zone under one scenario profile.
//! Zones are scored independently (in parallel), then clamped to 0-100,
//! rounded to two decimals and tiered with the configured thresholds.

pub mod model;
pub mod registry;
pub mod sample;
pub mod scenario;

pub use model::{default_model, CalibratedModel, FragilityModel, ScoringInput, SequenceModel};
pub use registry::{ZoneRegistry, ZoneSite};
pub use sample::sample_data;
pub use scenario::{normalize, stress_points, synthesize_history, Scenario, ScenarioProfile};

use rayon::prelude::*;
use std::sync::Arc;
use tracing::debug;

use crate::config::FragilityConfig;
use crate::error::{ComputationError, ValidationError};
use crate::types::{Zone, ZoneStatus};

/// Scores zones with an injected [`FragilityModel`].
pub struct FragilityEngine {
    config: FragilityConfig,
    registry: Arc<ZoneRegistry>,
    model: Box<dyn FragilityModel>,
}

impl FragilityEngine {
    /// Engine with the default (sequence) model.
    pub fn new(config: FragilityConfig, registry: Arc<ZoneRegistry>) -> Self {
        let model = default_model(&config);
        Self::with_model(config, registry, model)
    }

    pub fn with_model(
        config: FragilityConfig,
        registry: Arc<ZoneRegistry>,
        model: Box<dyn FragilityModel>,
    ) -> Self {
        Self {
            config,
            registry,
            model,
        }
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    pub fn registry(&self) -> &ZoneRegistry {
        &self.registry
    }

    pub fn config(&self) -> &FragilityConfig {
        &self.config
    }

    /// Forecast horizon from the caller (absent → 0), within 0..=max_horizon_hours.
    pub fn validate_horizon(&self, time_step: Option<i64>) -> Result<u32, ValidationError> {
        let value = time_step.unwrap_or(0);
        let max = self.config.max_horizon_hours;
        if value < 0 || value > i64::from(max) {
            return Err(ValidationError::HorizonOutOfRange { value, max });
        }
        Ok(value as u32)
    }

    /// Tier a final score with the configured thresholds.
    pub fn status_for(&self, score: f64) -> ZoneStatus {
        ZoneStatus::from_score(
            score,
            self.config.warning_threshold,
            self.config.critical_threshold,
        )
    }

    /// Score every registered zone under `profile` at `horizon_hours` ahead.
    ///
    /// Output order follows the registry. A non-finite model output fails the
    /// whole call; it is never clamped into range.
    pub fn score_zones(
        &self,
        profile: &ScenarioProfile,
        horizon_hours: u32,
    ) -> Result<Vec<Zone>, ComputationError> {
        if self.registry.is_empty() {
            return Err(ComputationError::EmptyRegistry);
        }
        let history = synthesize_history(&profile.features, self.config.history_window);

        self.registry
            .sites()
            .par_iter()
            .map(|site| {
                let input = ScoringInput {
                    zone: site,
                    scenario: profile.scenario,
                    history: &history,
                    manual_delta: profile.manual_delta,
                    horizon_hours,
                };
                let raw = self.model.score(&input);
                if !raw.is_finite() {
                    return Err(ComputationError::NonFiniteScore {
                        model: self.model.name().to_string(),
                        zone: site.name.clone(),
                    });
                }
                let score = round2(raw.clamp(0.0, 100.0));
                let status = self.status_for(score);
                debug!(zone = %site.name, raw, score, %status, "Zone scored");
                Ok(Zone {
                    id: site.id,
                    name: site.name.clone(),
                    lat: site.position.lat,
                    lon: site.position.lon,
                    features: Some(profile.features),
                    score,
                    status,
                })
            })
            .collect()
    }
}

/// Round to two decimal places.
pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}
