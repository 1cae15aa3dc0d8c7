//! Config Validation Tests
//!
//! Typo detection (unknown keys with suggestions) and consistency checks on
//! `RiskConfig`, including loading from files on disk.

use std::io::Write;

use aquashield::config::validation::{known_config_keys, suggest_correction, validate_unknown_keys};
use aquashield::config::{ConfigError, RiskConfig};

// ============================================================================
// Typo Detection
// ============================================================================

#[test]
fn typo_in_plume_key_warns_with_suggestion() {
    let toml_str = r#"
[plume]
advection_factr = 0.3
"#;
    let warnings = validate_unknown_keys(toml_str);
    assert_eq!(warnings.len(), 1, "Expected exactly 1 warning");
    assert!(warnings[0].field.contains("advection_factr"));
    assert_eq!(
        warnings[0].suggestion.as_deref(),
        Some("plume.advection_factor"),
        "Should suggest the correct spelling"
    );
}

#[test]
fn typo_in_section_name_warns() {
    let toml_str = r#"
[vesel]
stop_speed_knots = 0.8
"#;
    let warnings = validate_unknown_keys(toml_str);
    assert!(!warnings.is_empty());
    assert!(warnings.iter().any(|w| w.field == "vesel"));
    let section = warnings.iter().find(|w| w.field == "vesel").unwrap();
    assert_eq!(section.suggestion.as_deref(), Some("vessel"));
}

#[test]
fn valid_config_produces_zero_warnings() {
    let toml_str = r#"
[fragility]
critical_threshold = 75.0
warning_threshold = 45.0

[dispatch]
tanker_speed_kmh = 30.0

[plume.industrial_discharge]
diffusivity_m2_s = 40.0
intensity_base = 0.8
persistence = 0.75

[vessel]
course_deviation_deg = 35.0

[fleet]
seed = 11

[server]
addr = "127.0.0.1:9000"
"#;
    let warnings = validate_unknown_keys(toml_str);
    assert!(warnings.is_empty(), "Unexpected warnings: {warnings:?}");
}

#[test]
fn known_keys_cover_every_section() {
    let keys = known_config_keys();
    for section in ["fragility", "dispatch", "plume", "vessel", "fleet", "oil_spill", "server"] {
        assert!(keys.contains(section), "missing section {section}");
    }
    assert!(keys.contains("plume.sewage_overflow.persistence"));
    assert!(keys.contains("vessel.min_stop_duration_secs"));
}

#[test]
fn far_off_key_gets_no_suggestion() {
    let known = known_config_keys();
    assert!(suggest_correction("completely.unrelated.key", &known).is_none());
}

#[test]
fn unknown_keys_do_not_fail_load() {
    let config = RiskConfig::from_toml_str("[fleet]\nseeed = 3\n").expect("typos only warn");
    assert_eq!(config.fleet.seed, 42);
}

// ============================================================================
// Consistency Checks
// ============================================================================

fn validation_errors(config: &RiskConfig) -> Vec<String> {
    match config.validate() {
        Err(ConfigError::Validation(errors)) => errors,
        Err(other) => panic!("unexpected error: {other}"),
        Ok(()) => Vec::new(),
    }
}

#[test]
fn all_errors_collected_in_one_pass() {
    let mut config = RiskConfig::default();
    config.fragility.warning_threshold = 80.0;
    config.plume.oil_spill.diffusivity_m2_s = 0.0;
    config.vessel.underway_speed_knots = 0.5;
    let errors = validation_errors(&config);
    assert_eq!(errors.len(), 3, "{errors:?}");
}

#[test]
fn simulation_hour_bounds_checked() {
    let mut config = RiskConfig::default();
    config.plume.min_hours = 10;
    config.plume.max_hours = 5;
    let errors = validation_errors(&config);
    assert!(errors.iter().any(|e| e.contains("max_hours")));
}

#[test]
fn probabilities_must_be_fractions() {
    let mut config = RiskConfig::default();
    config.oil_spill.tanker_probability = 1.4;
    let errors = validation_errors(&config);
    assert!(errors.iter().any(|e| e.contains("oil_spill.tanker_probability")));
}

#[test]
fn fleet_reference_epoch_must_fit_history() {
    let mut config = RiskConfig::default();
    config.fleet.reference_epoch = 600;
    let errors = validation_errors(&config);
    assert!(errors.iter().any(|e| e.contains("fleet.reference_epoch")), "{errors:?}");

    config.fleet.reference_epoch = i64::MAX;
    assert!(!validation_errors(&config).is_empty());
}

#[test]
fn infinite_value_rejected() {
    let mut config = RiskConfig::default();
    config.plume.population_density_per_km2 = f64::INFINITY;
    assert!(config.validate().is_err());
}

// ============================================================================
// File Loading
// ============================================================================

#[test]
fn load_from_file_reads_overrides() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[oil_spill]\nbase_radius_km = 2.5\n\n[fleet]\nanomaly_rate = 0.5").unwrap();

    let config = RiskConfig::load_from_file(file.path()).unwrap();
    assert_eq!(config.oil_spill.base_radius_km, 2.5);
    assert_eq!(config.fleet.anomaly_rate, 0.5);
    assert_eq!(config.oil_spill.ring_points, 12);
}

#[test]
fn load_from_file_reports_invalid_values() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[fragility]\ncritical_threshold = 20.0").unwrap();

    match RiskConfig::load_from_file(file.path()) {
        Err(ConfigError::Validation(errors)) => {
            assert!(errors.iter().any(|e| e.contains("critical_threshold")))
        }
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn load_from_file_reports_parse_errors_with_path() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[plume\nmax_hours = ").unwrap();

    match RiskConfig::load_from_file(file.path()) {
        Err(ConfigError::Parse(path, _)) => assert_eq!(path, file.path()),
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.toml");
    assert!(matches!(
        RiskConfig::load_from_file(&path),
        Err(ConfigError::Io(_, _))
    ));
}
