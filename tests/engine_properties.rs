//! Engine Property Tests
//!
//! End-to-end invariants of the four risk operations, exercised through
//! `RiskCore` with the default configuration and registries.

use std::collections::HashMap;
use std::sync::Arc;

use aquashield::fragility::Scenario;
use aquashield::plume::population_exposure;
use aquashield::types::{ExposureLevel, ManualParams, ZoneStatus};
use aquashield::{
    CoreError, FragilityRequest, OilSpillRequest, PropagationRequest, RiskConfig, RiskCore,
    ValidationError, VesselAnomalyRequest, VesselClass,
};

fn core() -> RiskCore {
    RiskCore::new(Arc::new(RiskConfig::default()))
}

fn fragility(core: &RiskCore, scenario: Scenario, time_step: i64) -> aquashield::FragilityAnalysis {
    fragility_with(core, scenario, time_step, None)
}

fn fragility_with(
    core: &RiskCore,
    scenario: Scenario,
    time_step: i64,
    manual_params: Option<ManualParams>,
) -> aquashield::FragilityAnalysis {
    core.analyze_fragility(&FragilityRequest {
        scenario: Some(scenario.as_str().to_string()),
        time_step: Some(time_step),
        manual_params,
    })
    .unwrap()
}

fn propagation(source_type: &str, hours: i64) -> PropagationRequest {
    PropagationRequest {
        source_lat: Some(19.05),
        source_lon: Some(72.82),
        source_type: Some(source_type.to_string()),
        flow_direction: Some(180.0),
        flow_speed: Some(2.0),
        simulation_hours: Some(hours),
    }
}

// ============================================================================
// Fragility and dispatch
// ============================================================================

#[test]
fn scores_in_range_and_tiers_match_thresholds() {
    let core = core();
    for scenario in Scenario::ALL {
        for time_step in [0, 6, 12, 24] {
            let result = fragility(&core, scenario, time_step);
            for zone in &result.zones {
                assert!((0.0..=100.0).contains(&zone.score), "{scenario} {zone:?}");
                let expected = if zone.score > 70.0 {
                    ZoneStatus::Critical
                } else if zone.score >= 40.0 {
                    ZoneStatus::Warning
                } else {
                    ZoneStatus::Normal
                };
                assert_eq!(zone.status, expected, "{scenario} h={time_step} {}", zone.name);
            }
        }
    }
}

#[test]
fn dispatch_routes_run_from_non_critical_to_critical() {
    let core = core();
    for scenario in Scenario::ALL {
        for time_step in [0, 8, 16, 24] {
            let result = fragility(&core, scenario, time_step);
            let status: HashMap<u32, ZoneStatus> =
                result.zones.iter().map(|z| (z.id, z.status)).collect();
            for route in &result.dispatch_plan {
                assert_eq!(status[&route.to], ZoneStatus::Critical);
                assert_ne!(status[&route.from], ZoneStatus::Critical);
                assert_eq!(route.route.first(), Some(&route.from));
                assert_eq!(route.route.last(), Some(&route.to));
            }
            assert_eq!(result.summary.dispatch_required, !result.dispatch_plan.is_empty());
            let critical = result.summary.critical_count;
            assert_eq!(
                result.dispatch_plan.len() + result.dispatch_unavailable.len(),
                critical
            );
        }
    }
}

#[test]
fn stressed_presets_score_at_or_above_normal() {
    let core = core();
    for time_step in [0, 12] {
        let normal = fragility(&core, Scenario::Normal, time_step);
        for scenario in [Scenario::FloodEvent, Scenario::PowerFailure, Scenario::HighDemandCrisis] {
            let stressed = fragility(&core, scenario, time_step);
            for (n, s) in normal.zones.iter().zip(&stressed.zones) {
                assert_eq!(n.id, s.id);
                assert!(s.score >= n.score, "{scenario} {}: {} < {}", s.name, s.score, n.score);
            }
        }
    }
}

#[test]
fn stressed_presets_stay_above_normal_under_identical_overrides() {
    let core = core();
    let overrides = [
        ManualParams { power_availability: Some(0.9), ..Default::default() },
        ManualParams { rainfall: Some(0.0), tanker_count: Some(12.0), ..Default::default() },
        ManualParams { demand_surge: Some(2.0), price_index: Some(2.0), ..Default::default() },
    ];
    for manual in overrides {
        for time_step in [0, 12] {
            let normal = fragility_with(&core, Scenario::Normal, time_step, Some(manual.clone()));
            for scenario in [Scenario::FloodEvent, Scenario::PowerFailure, Scenario::HighDemandCrisis] {
                let stressed = fragility_with(&core, scenario, time_step, Some(manual.clone()));
                for (n, s) in normal.zones.iter().zip(&stressed.zones) {
                    assert!(
                        s.score >= n.score,
                        "{scenario} {} with {manual:?}: {} < Normal {}",
                        s.name,
                        s.score,
                        n.score
                    );
                }
            }
        }
    }
}

#[test]
fn horizon_can_change_tier() {
    let core = core();
    let now = fragility(&core, Scenario::Normal, 0);
    let later = fragility(&core, Scenario::Normal, 24);
    assert!(now
        .zones
        .iter()
        .zip(&later.zones)
        .any(|(a, b)| a.status != b.status));
}

#[test]
fn analyze_fragility_is_idempotent() {
    let core = core();
    let a = fragility(&core, Scenario::HighDemandCrisis, 10);
    let b = fragility(&core, Scenario::HighDemandCrisis, 10);
    assert_eq!(a.scores, b.scores);
    assert_eq!(a.dispatch_plan, b.dispatch_plan);
    assert_eq!(a.early_warnings, b.early_warnings);
}

#[test]
fn flood_event_at_hour_zero_has_critical_zone() {
    let result = fragility(&core(), Scenario::FloodEvent, 0);
    assert!(result.summary.critical_count >= 1);
    assert!(result
        .early_warnings
        .iter()
        .any(|a| a.severity == aquashield::Severity::Critical));
}

// ============================================================================
// Plume
// ============================================================================

#[test]
fn oil_spill_twelve_hours_has_thirteen_steps_with_growing_area() {
    let result = core().simulate_propagation(&propagation("Oil Spill", 12)).unwrap();
    assert_eq!(result.time_steps.len(), 13);
    for (i, step) in result.time_steps.iter().enumerate() {
        assert_eq!(step.hour as usize, i);
    }
    assert!(result
        .time_steps
        .windows(2)
        .all(|w| w[1].area_km2 >= w[0].area_km2));
}

#[test]
fn area_non_decreasing_for_every_source_and_duration() {
    let core = core();
    for source in ["Oil Spill", "Sewage Overflow", "Industrial Discharge"] {
        for hours in [1, 6, 24] {
            let result = core.simulate_propagation(&propagation(source, hours)).unwrap();
            assert_eq!(result.time_steps.len(), hours as usize + 1);
            assert!(result
                .time_steps
                .windows(2)
                .all(|w| w[1].area_km2 >= w[0].area_km2 && w[1].radius_m >= w[0].radius_m));
        }
    }
}

#[test]
fn centroid_follows_flow_and_spread_depends_on_source() {
    let core = core();
    let oil = core.simulate_propagation(&propagation("Oil Spill", 6)).unwrap();
    let industrial = core
        .simulate_propagation(&propagation("Industrial Discharge", 6))
        .unwrap();

    // Flow toward 180° moves the plume south
    let first = &oil.time_steps[0];
    let last = &oil.time_steps[6];
    assert!(last.center.lat < first.center.lat);
    assert!((last.center.lon - first.center.lon).abs() < 1e-6);

    assert!(oil.time_steps[6].radius_m > industrial.time_steps[6].radius_m);
}

#[test]
fn population_exposure_non_negative_and_zero_at_zero_area() {
    let config = RiskConfig::default();
    assert_eq!(population_exposure(0.0, &config.plume), 0);
    let result = core().simulate_propagation(&propagation("Sewage Overflow", 24)).unwrap();
    for step in &result.time_steps {
        if step.area_km2 == 0.0 {
            assert_eq!(step.estimated_population_exposure, 0);
        }
    }
    assert_eq!(
        result.risk_summary.max_population_exposure,
        result
            .time_steps
            .iter()
            .map(|s| s.estimated_population_exposure)
            .max()
            .unwrap()
    );
}

#[test]
fn risk_summary_scans_every_step() {
    let result = core().simulate_propagation(&propagation("Oil Spill", 24)).unwrap();
    let max_area = result
        .time_steps
        .iter()
        .map(|s| s.area_km2)
        .fold(0.0, f64::max);
    assert_eq!(result.risk_summary.max_area_km2, max_area);
    for facility in &result.risk_summary.facilities {
        let first = result
            .time_steps
            .iter()
            .find(|s| s.infrastructure_at_risk.iter().any(|f| f.name == facility.name))
            .unwrap();
        assert_eq!(first.hour, facility.first_hour);
        let worst = result
            .time_steps
            .iter()
            .flat_map(|s| &s.infrastructure_at_risk)
            .filter(|f| f.name == facility.name)
            .map(|f| f.risk_level)
            .max()
            .unwrap_or(ExposureLevel::Warning);
        assert_eq!(worst, facility.worst_level);
    }
    assert!(result.alerts.len() <= 10);
}

#[test]
fn polar_sources_rejected_and_high_latitude_runs_keep_growing() {
    let core = core();
    for lat in [90.0, -90.0, 89.999] {
        let mut request = propagation("Oil Spill", 12);
        request.source_lat = Some(lat);
        request.flow_direction = Some(0.0);
        assert!(matches!(
            core.simulate_propagation(&request),
            Err(CoreError::Validation(ValidationError::OutOfRange { field: "source_lat", .. }))
        ));
    }

    for (lat, direction) in [(85.0, 0.0), (-85.0, 180.0), (84.0, 45.0)] {
        let mut request = propagation("Oil Spill", 24);
        request.source_lat = Some(lat);
        request.flow_direction = Some(direction);
        request.flow_speed = Some(10.0);
        let result = core.simulate_propagation(&request).unwrap();
        assert!(result
            .time_steps
            .windows(2)
            .all(|w| w[1].area_km2 >= w[0].area_km2));
        assert!(result.time_steps.iter().all(|s| s.center.is_valid()));
        // Source disc stretched along the flow: pi * 130 m * 100 m
        assert!((result.time_steps[0].area_km2 - 0.0408).abs() < 1e-4);
    }
}

#[test]
fn simulation_hours_out_of_range_rejected() {
    let core = core();
    for hours in [0, 30] {
        match core.simulate_propagation(&propagation("Oil Spill", hours)) {
            Err(CoreError::Validation(ValidationError::SimulationHours { value, .. })) => {
                assert_eq!(value, hours)
            }
            other => panic!("hours = {hours}: expected SimulationHours, got {other:?}"),
        }
    }
}

#[test]
fn missing_flow_speed_uses_documented_default() {
    let core = core();
    let mut request = propagation("Oil Spill", 6);
    request.flow_speed = None;
    let defaulted = core.simulate_propagation(&request).unwrap();
    assert_eq!(defaulted.source.flow_speed, 2.0);
    let explicit = core.simulate_propagation(&propagation("Oil Spill", 6)).unwrap();
    assert_eq!(defaulted.time_steps, explicit.time_steps);
}

// ============================================================================
// Marine
// ============================================================================

#[test]
fn vessel_status_consistent_with_anomalies() {
    let core = core();
    for seed in 0..40 {
        let result = core
            .detect_vessel_anomalies(&VesselAnomalyRequest { vessels: None, seed: Some(seed) })
            .unwrap();
        for status in &result.vessel_statuses {
            match status.status {
                VesselClass::Normal => assert!(status.anomalies.is_empty()),
                VesselClass::Suspicious => assert_eq!(status.anomalies.len(), 1),
                VesselClass::Distress => assert!(!status.anomalies.is_empty()),
            }
            assert!(status.risk_score <= 100);
        }
        let flagged = result.summary.suspicious + result.summary.distress;
        assert_eq!(result.alerts.len(), flagged);
    }
}

#[test]
fn oil_spill_only_for_distress_vessels() {
    let core = core();
    let mut distress_seen = 0;
    for seed in 0..40 {
        let result = core
            .detect_vessel_anomalies(&VesselAnomalyRequest { vessels: None, seed: Some(seed) })
            .unwrap();
        for status in result.vessel_statuses {
            let estimate = core.estimate_oil_spill(&OilSpillRequest {
                vessel: Some(status.vessel.clone()),
            });
            if status.status == VesselClass::Distress {
                distress_seen += 1;
                let e = estimate.unwrap();
                assert!((0.0..=1.0).contains(&e.probability));
                assert_eq!(e.spill_polygon.first(), e.spill_polygon.last());
                assert_eq!(e.anchor, status.vessel.position());
            } else {
                assert!(matches!(
                    estimate,
                    Err(CoreError::Validation(ValidationError::NotInDistress { .. }))
                ));
            }
        }
    }
    assert!(distress_seen > 0, "no distress vessel in 40 simulated fleets");
}

#[test]
fn out_of_range_vessel_timestamp_is_a_validation_error() {
    let core = core();
    let mut vessel = core.vessel_positions(Some(1)).remove(3);
    vessel.history.clear();
    vessel.timestamp = i64::MIN;
    let request = VesselAnomalyRequest { vessels: Some(vec![vessel.clone()]), seed: None };
    assert!(matches!(
        core.detect_vessel_anomalies(&request),
        Err(CoreError::Validation(ValidationError::InvalidTelemetry { .. }))
    ));
    assert!(matches!(
        core.estimate_oil_spill(&OilSpillRequest { vessel: Some(vessel) }),
        Err(CoreError::Validation(ValidationError::InvalidTelemetry { .. }))
    ));
}

#[test]
fn simulated_fleet_is_a_pure_function_of_seed() {
    let core = core();
    assert_eq!(core.vessel_positions(Some(3)), core.vessel_positions(Some(3)));
    let request = VesselAnomalyRequest { vessels: None, seed: Some(3) };
    assert_eq!(
        core.detect_vessel_anomalies(&request).unwrap(),
        core.detect_vessel_anomalies(&request).unwrap()
    );
}
