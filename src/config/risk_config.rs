//! Risk Configuration - every engine constant as an operator-tunable TOML value
//!
//! Each struct implements `Default` with the calibrated platform values, so an
//! empty (or absent) config file reproduces the built-in behaviour exactly.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::types::SourceType;

use super::defaults;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "AQUASHIELD_CONFIG";

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "aquashield.toml";

// ============================================================================
// Top-Level Config
// ============================================================================

/// Root configuration for the risk engines.
///
/// Load with `RiskConfig::load()` which searches:
/// 1. `$AQUASHIELD_CONFIG` env var
/// 2. `./aquashield.toml`
/// 3. Built-in defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RiskConfig {
    /// Fragility scoring and tiering
    #[serde(default)]
    pub fragility: FragilityConfig,

    /// Tanker dispatch routing
    #[serde(default)]
    pub dispatch: DispatchConfig,

    /// Contamination plume simulation
    #[serde(default)]
    pub plume: PlumeConfig,

    /// Vessel anomaly rule thresholds
    #[serde(default)]
    pub vessel: VesselConfig,

    /// Simulated AIS fleet
    #[serde(default)]
    pub fleet: FleetConfig,

    /// Oil spill estimation
    #[serde(default)]
    pub oil_spill: OilSpillConfig,

    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,
}

impl RiskConfig {
    /// Load configuration using the standard search order:
    /// 1. `$AQUASHIELD_CONFIG` environment variable
    /// 2. `./aquashield.toml` in the current working directory
    /// 3. Built-in defaults
    pub fn load() -> Self {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            let p = PathBuf::from(&path);
            if p.exists() {
                match Self::load_from_file(&p) {
                    Ok(config) => {
                        info!(path = %p.display(), "Loaded risk config from {}", CONFIG_ENV_VAR);
                        return config;
                    }
                    Err(e) => {
                        warn!(path = %p.display(), error = %e, "Failed to load config from {}, falling back", CONFIG_ENV_VAR);
                    }
                }
            } else {
                warn!(path = %path, "{} points to non-existent file, falling back", CONFIG_ENV_VAR);
            }
        }

        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.exists() {
            match Self::load_from_file(&local) {
                Ok(config) => {
                    info!("Loaded risk config from ./{}", LOCAL_CONFIG_FILE);
                    return config;
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load ./{}, using defaults", LOCAL_CONFIG_FILE);
                }
            }
        }

        info!("No {} found, using built-in defaults", LOCAL_CONFIG_FILE);
        Self::default()
    }

    /// Load from a specific TOML file path.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        Self::from_toml_str(&contents).map_err(|e| match e {
            ConfigError::Parse(_, inner) => ConfigError::Parse(path.to_path_buf(), inner),
            other => other,
        })
    }

    /// Parse and validate a TOML document.
    ///
    /// Unknown keys are logged as warnings (with a suggestion when one is
    /// close enough); they never fail the load.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        for w in super::validation::validate_unknown_keys(contents) {
            warn!("{}", w);
        }

        let config: Self = toml::from_str(contents)
            .map_err(|e| ConfigError::Parse(PathBuf::from("<inline>"), e))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the current config to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(ConfigError::Serialize)
    }

    /// Validate all values for internal consistency.
    ///
    /// Rules:
    /// - Critical thresholds must sit above warning thresholds
    /// - Coefficients used as divisors or radii must be positive
    /// - Fractions must lie in (0, 1]
    /// - Every value must be finite
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors: Vec<String> = Vec::new();

        let f = &self.fragility;
        if f.critical_threshold <= f.warning_threshold {
            errors.push(format!(
                "fragility.critical_threshold ({:.1}) must be > warning_threshold ({:.1})",
                f.critical_threshold, f.warning_threshold
            ));
        }
        if f.history_window < 2 {
            errors.push("fragility.history_window must be >= 2".to_string());
        }
        if f.growth_per_hour < 0.0 {
            errors.push("fragility.growth_per_hour must be >= 0".to_string());
        }
        if f.sequence_weight < 0.0 {
            errors.push("fragility.sequence_weight must be >= 0".to_string());
        }

        let d = &self.dispatch;
        if d.tanker_speed_kmh <= 0.0 {
            errors.push("dispatch.tanker_speed_kmh must be > 0".to_string());
        }
        if d.congestion_alpha < 0.0 || d.congestion_beta <= 0.0 {
            errors.push("dispatch.congestion_alpha must be >= 0 and congestion_beta > 0".to_string());
        }

        let p = &self.plume;
        if p.min_hours == 0 {
            errors.push("plume.min_hours must be >= 1".to_string());
        }
        if p.max_hours < p.min_hours {
            errors.push(format!(
                "plume.max_hours ({}) must be >= min_hours ({})",
                p.max_hours, p.min_hours
            ));
        }
        if p.default_hours < p.min_hours || p.default_hours > p.max_hours {
            errors.push(format!(
                "plume.default_hours ({}) must lie within min_hours-max_hours ({}-{})",
                p.default_hours, p.min_hours, p.max_hours
            ));
        }
        for source in SourceType::ALL {
            let params = p.params(source);
            if params.diffusivity_m2_s <= 0.0 {
                errors.push(format!("plume.{}.diffusivity_m2_s must be > 0", source.config_key()));
            }
            Self::check_fraction(params.intensity_base, &format!("plume.{}.intensity_base", source.config_key()), &mut errors);
            Self::check_fraction(params.persistence, &format!("plume.{}.persistence", source.config_key()), &mut errors);
        }
        if p.source_radius_m < 0.0 {
            errors.push("plume.source_radius_m must be >= 0".to_string());
        }
        if p.ring_points < 3 {
            errors.push("plume.ring_points must be >= 3".to_string());
        }
        if p.grid_resolution < 2 {
            errors.push("plume.grid_resolution must be >= 2".to_string());
        }
        if p.persistence_period_hours <= 0.0 {
            errors.push("plume.persistence_period_hours must be > 0".to_string());
        }
        if p.population_density_per_km2 < 0.0 {
            errors.push("plume.population_density_per_km2 must be >= 0".to_string());
        }
        Self::check_fraction(p.exposed_fraction, "plume.exposed_fraction", &mut errors);
        if p.critical_radius_factor <= 0.0 || p.warning_radius_factor <= p.critical_radius_factor {
            errors.push(format!(
                "plume.warning_radius_factor ({:.2}) must be > critical_radius_factor ({:.2}) > 0",
                p.warning_radius_factor, p.critical_radius_factor
            ));
        }
        if p.default_flow_speed_ms < 0.0 || p.default_flow_speed_ms > p.max_flow_speed_ms {
            errors.push(format!(
                "plume.default_flow_speed_ms ({:.2}) must be in 0-max_flow_speed_ms ({:.2})",
                p.default_flow_speed_ms, p.max_flow_speed_ms
            ));
        }

        let v = &self.vessel;
        Self::check_fraction(v.speed_drop_fraction, "vessel.speed_drop_fraction", &mut errors);
        if v.course_deviation_deg <= 0.0 || v.course_deviation_deg >= 180.0 {
            errors.push("vessel.course_deviation_deg must be in (0, 180)".to_string());
        }
        if v.course_deviation_high_deg < v.course_deviation_deg {
            errors.push(format!(
                "vessel.course_deviation_high_deg ({:.0}) must be >= course_deviation_deg ({:.0})",
                v.course_deviation_high_deg, v.course_deviation_deg
            ));
        }
        if v.underway_speed_knots <= v.stop_speed_knots {
            errors.push(format!(
                "vessel.underway_speed_knots ({:.1}) must be > stop_speed_knots ({:.1})",
                v.underway_speed_knots, v.stop_speed_knots
            ));
        }

        let fl = &self.fleet;
        if !(0.0..=1.0).contains(&fl.anomaly_rate) {
            errors.push("fleet.anomaly_rate must be in [0, 1]".to_string());
        }
        if fl.history_len < 4 {
            errors.push("fleet.history_len must be >= 4".to_string());
        }
        if fl.observation_interval_secs <= 0 {
            errors.push("fleet.observation_interval_secs must be > 0".to_string());
        }
        let span = fl.observation_interval_secs.saturating_mul(fl.history_len as i64);
        if fl.reference_epoch < span || fl.reference_epoch > defaults::MAX_AIS_TIMESTAMP_SECS {
            errors.push(format!(
                "fleet.reference_epoch ({}) must be in {}-{} so every simulated observation is a valid timestamp",
                fl.reference_epoch,
                span,
                defaults::MAX_AIS_TIMESTAMP_SECS
            ));
        }

        let o = &self.oil_spill;
        for (name, value) in [
            ("oil_spill.tanker_probability", o.tanker_probability),
            ("oil_spill.cargo_probability", o.cargo_probability),
            ("oil_spill.other_probability", o.other_probability),
            ("oil_spill.max_probability", o.max_probability),
            ("oil_spill.critical_probability", o.critical_probability),
        ] {
            Self::check_fraction(value, name, &mut errors);
        }
        if o.base_radius_km <= 0.0 {
            errors.push("oil_spill.base_radius_km must be > 0".to_string());
        }
        if o.ring_points < 3 {
            errors.push("oil_spill.ring_points must be >= 3".to_string());
        }

        // Reject NaN/Inf in any config value (sweep all f64 fields via serialization)
        if let Ok(s) = toml::to_string(self) {
            if s.contains("nan") || s.contains("inf") {
                errors.push("Config contains NaN or Inf values, all values must be finite numbers".to_string());
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors))
        }
    }

    fn check_fraction(value: f64, name: &str, errors: &mut Vec<String>) {
        if !value.is_finite() || value <= 0.0 || value > 1.0 {
            errors.push(format!("{name} must be in (0, 1], got {value}"));
        }
    }
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(PathBuf, std::io::Error),
    Parse(PathBuf, toml::de::Error),
    Serialize(toml::ser::Error),
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(path, e) => write!(f, "Config I/O error ({}): {}", path.display(), e),
            ConfigError::Parse(path, e) => {
                write!(f, "Config parse error ({}): {}", path.display(), e)
            }
            ConfigError::Serialize(e) => write!(f, "Config serialization error: {}", e),
            ConfigError::Validation(errors) => {
                writeln!(f, "Config validation failed:")?;
                for e in errors {
                    writeln!(f, "  - {}", e)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Fragility
// ============================================================================

/// Fragility scoring: tier thresholds, forecast drift, sequence model.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FragilityConfig {
    /// Score strictly above this is critical
    pub critical_threshold: f64,
    /// Score at or above this (and not critical) is warning
    pub warning_threshold: f64,
    /// Score points added per forecast hour
    pub growth_per_hour: f64,
    /// Largest accepted forecast horizon (hours)
    pub max_horizon_hours: u32,
    /// Number of synthesized history samples fed to the sequence model
    pub history_window: usize,
    /// Maximum score points the recurrent network contributes (either sign)
    pub sequence_weight: f64,
    /// Seed for the recurrent network weights
    pub model_seed: u64,
}

impl Default for FragilityConfig {
    fn default() -> Self {
        Self {
            critical_threshold: 70.0,
            warning_threshold: 40.0,
            growth_per_hour: 2.5,
            max_horizon_hours: 24,
            history_window: 6,
            sequence_weight: 3.0,
            model_seed: 7,
        }
    }
}

// ============================================================================
// Dispatch
// ============================================================================

/// Tanker routing over the zone graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatchConfig {
    /// Average tanker road speed, used for lag time (km/h)
    pub tanker_speed_kmh: f64,
    /// Congestion scaling of edge cost by endpoint fragility
    pub congestion_alpha: f64,
    /// Congestion nonlinearity exponent
    pub congestion_beta: f64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            tanker_speed_kmh: 25.0,
            congestion_alpha: 0.15,
            congestion_beta: 4.0,
        }
    }
}

// ============================================================================
// Plume
// ============================================================================

/// Per-source-type spread and intensity parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceParams {
    /// Horizontal diffusivity driving radius growth (m^2/s)
    pub diffusivity_m2_s: f64,
    /// Peak intensity at hour 0 (0-1)
    pub intensity_base: f64,
    /// Fraction of intensity retained per persistence period
    pub persistence: f64,
}

/// Contamination plume simulation and exposure evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlumeConfig {
    pub oil_spill: SourceParams,
    pub sewage_overflow: SourceParams,
    pub industrial_discharge: SourceParams,
    /// Shortest accepted simulation (hours)
    pub min_hours: u32,
    /// Longest accepted simulation (hours)
    pub max_hours: u32,
    /// Simulation length used when the caller omits it (hours)
    pub default_hours: u32,
    /// Flow speed used when the caller omits it (m/s)
    pub default_flow_speed_ms: f64,
    /// Flow direction used when the caller omits it (degrees)
    pub default_flow_direction_deg: f64,
    /// Fastest accepted surface flow (m/s)
    pub max_flow_speed_ms: f64,
    /// Fraction of the surface flow speed transferred to the plume centroid
    pub advection_factor: f64,
    /// Along-flow stretch of the plume ring (semi-major = r * (1 + elongation))
    pub elongation: f64,
    /// Plume radius at hour 0 (m)
    pub source_radius_m: f64,
    /// Points in the plume ring (before closing)
    pub ring_points: usize,
    /// Risk grid samples per bounding-box axis
    pub grid_resolution: usize,
    /// Grid points below this intensity are dropped
    pub grid_intensity_floor: f64,
    /// Hours over which intensity decays by one persistence factor
    pub persistence_period_hours: f64,
    /// Residents per km^2 in the study region
    pub population_density_per_km2: f64,
    /// Share of residents in the plume footprint counted as exposed
    pub exposed_fraction: f64,
    /// Facilities within radius * this factor are critical
    pub critical_radius_factor: f64,
    /// Facilities within radius * this factor are warning
    pub warning_radius_factor: f64,
    /// Exposure above this raises a population alert
    pub exposure_alert_threshold: u64,
    /// Maximum alerts returned per simulation
    pub max_alerts: usize,
}

impl Default for PlumeConfig {
    fn default() -> Self {
        Self {
            oil_spill: SourceParams {
                diffusivity_m2_s: 60.0,
                intensity_base: 0.95,
                persistence: 0.9,
            },
            sewage_overflow: SourceParams {
                diffusivity_m2_s: 25.0,
                intensity_base: 0.7,
                persistence: 0.6,
            },
            industrial_discharge: SourceParams {
                diffusivity_m2_s: 35.0,
                intensity_base: 0.85,
                persistence: 0.8,
            },
            min_hours: 1,
            max_hours: 24,
            default_hours: 12,
            default_flow_speed_ms: 2.0,
            default_flow_direction_deg: 180.0,
            max_flow_speed_ms: 10.0,
            advection_factor: 0.25,
            elongation: 0.3,
            source_radius_m: 100.0,
            ring_points: 24,
            grid_resolution: 9,
            grid_intensity_floor: 0.05,
            persistence_period_hours: 6.0,
            population_density_per_km2: 25_000.0,
            exposed_fraction: 0.3,
            critical_radius_factor: 1.0,
            warning_radius_factor: 2.0,
            exposure_alert_threshold: 10_000,
            max_alerts: 10,
        }
    }
}

impl PlumeConfig {
    /// Parameters for one source type.
    pub fn params(&self, source: SourceType) -> &SourceParams {
        match source {
            SourceType::OilSpill => &self.oil_spill,
            SourceType::SewageOverflow => &self.sewage_overflow,
            SourceType::IndustrialDischarge => &self.industrial_discharge,
        }
    }
}

// ============================================================================
// Vessel anomaly rules
// ============================================================================

/// Anomaly rule thresholds. Named so tests can pin exact boundaries.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VesselConfig {
    /// Speed drop flagged when current < average * (1 - fraction)
    pub speed_drop_fraction: f64,
    /// Average speed below this never triggers a speed drop (knots)
    pub speed_drop_min_baseline_knots: f64,
    /// Course deviation threshold (degrees)
    pub course_deviation_deg: f64,
    /// Deviation at or above this is high severity (degrees)
    pub course_deviation_high_deg: f64,
    /// Speed-over-ground treated as stopped (knots)
    pub stop_speed_knots: f64,
    /// Average speed that counts as historically underway (knots)
    pub underway_speed_knots: f64,
    /// Minimum stopped duration for an unexpected stop (seconds)
    pub min_stop_duration_secs: i64,
}

impl Default for VesselConfig {
    fn default() -> Self {
        Self {
            speed_drop_fraction: 0.5,
            speed_drop_min_baseline_knots: 2.0,
            course_deviation_deg: 40.0,
            course_deviation_high_deg: 80.0,
            stop_speed_knots: 1.0,
            underway_speed_knots: 3.0,
            min_stop_duration_secs: 600,
        }
    }
}

// ============================================================================
// Simulated fleet
// ============================================================================

/// Deterministic AIS fleet generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FleetConfig {
    /// Default seed when the caller does not pass one
    pub seed: u64,
    /// Probability that a vessel carries an injected anomaly
    pub anomaly_rate: f64,
    /// Prior observations generated per vessel
    pub history_len: usize,
    /// Spacing between observations (seconds)
    pub observation_interval_secs: i64,
    /// Unix timestamp of the "current" observation
    pub reference_epoch: i64,
}

impl Default for FleetConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            anomaly_rate: 0.25,
            history_len: 6,
            observation_interval_secs: 300,
            // 2026-01-01T00:00:00Z
            reference_epoch: 1_767_225_600,
        }
    }
}

// ============================================================================
// Oil spill
// ============================================================================

/// Spill probability and slick geometry for distressed vessels.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OilSpillConfig {
    pub tanker_probability: f64,
    pub cargo_probability: f64,
    pub other_probability: f64,
    pub unexpected_stop_bonus: f64,
    pub speed_drop_bonus: f64,
    pub course_deviation_bonus: f64,
    pub max_probability: f64,
    /// Probability above this is a critical estimate
    pub critical_probability: f64,
    /// Slick radius at probability 0.5 (km)
    pub base_radius_km: f64,
    /// Downstream offset of the slick centre along the last course, as a fraction of radius
    pub drift_offset_fraction: f64,
    /// Along-course stretch of the slick
    pub drift_elongation: f64,
    pub ring_points: usize,
}

impl Default for OilSpillConfig {
    fn default() -> Self {
        Self {
            tanker_probability: 0.75,
            cargo_probability: 0.45,
            other_probability: 0.20,
            unexpected_stop_bonus: 0.15,
            speed_drop_bonus: 0.05,
            course_deviation_bonus: 0.05,
            max_probability: 0.98,
            critical_probability: 0.6,
            base_radius_km: 1.5,
            drift_offset_fraction: 0.3,
            drift_elongation: 0.4,
            ring_points: 12,
        }
    }
}

// ============================================================================
// Server Config
// ============================================================================

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server bind address.
    ///
    /// Can be overridden by `AQUASHIELD_SERVER_ADDR` env var or `--addr` CLI flag.
    #[serde(default = "default_server_addr")]
    pub addr: String,
}

fn default_server_addr() -> String {
    "0.0.0.0:8000".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: default_server_addr(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
