//! Scenario Normalizer
//!
//! Turns a named preset plus optional manual overrides into one canonical
//! [`FeatureVector`], and measures the stress the overrides carry on their
//! own.

use crate::error::ValidationError;
use crate::types::{FeatureVector, ManualParams};

/// Named scenario preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scenario {
    Normal,
    FloodEvent,
    PowerFailure,
    HighDemandCrisis,
}

impl Scenario {
    pub const ALL: [Scenario; 4] = [
        Scenario::Normal,
        Scenario::FloodEvent,
        Scenario::PowerFailure,
        Scenario::HighDemandCrisis,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Scenario::Normal => "Normal",
            Scenario::FloodEvent => "Flood Event",
            Scenario::PowerFailure => "Power Failure",
            Scenario::HighDemandCrisis => "High Demand Crisis",
        }
    }

    /// Position in per-zone baseline tables.
    pub fn index(&self) -> usize {
        match self {
            Scenario::Normal => 0,
            Scenario::FloodEvent => 1,
            Scenario::PowerFailure => 2,
            Scenario::HighDemandCrisis => 3,
        }
    }

    /// Preset operating conditions for the scenario.
    pub fn preset(&self) -> FeatureVector {
        match self {
            Scenario::Normal => FeatureVector {
                rainfall: 2.0,
                power_availability: 0.95,
                tanker_count: 10.0,
                groundwater_level: 5.0,
                demand_surge: 1.0,
                price_index: 1.0,
            },
            Scenario::FloodEvent => FeatureVector {
                rainfall: 45.0,
                power_availability: 0.7,
                tanker_count: 6.0,
                groundwater_level: 7.5,
                demand_surge: 1.2,
                price_index: 1.1,
            },
            Scenario::PowerFailure => FeatureVector {
                rainfall: 2.0,
                power_availability: 0.3,
                tanker_count: 8.0,
                groundwater_level: 5.0,
                demand_surge: 1.1,
                price_index: 1.2,
            },
            Scenario::HighDemandCrisis => FeatureVector {
                rainfall: 0.5,
                power_availability: 0.9,
                tanker_count: 4.0,
                groundwater_level: 2.5,
                demand_surge: 1.8,
                price_index: 1.6,
            },
        }
    }
}

impl std::fmt::Display for Scenario {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Scenario {
    type Err = ValidationError;

    /// Accepts display names case-insensitively ("flood event", "Flood Event").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Scenario::ALL
            .into_iter()
            .find(|sc| sc.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ValidationError::UnknownScenario(s.to_string()))
    }
}

// ============================================================================
// Manual parameter ranges
// ============================================================================

/// Valid (inclusive) range per feature field, in `FeatureVector` order.
pub const PARAM_RANGES: [(&str, f64, f64); FeatureVector::LEN] = [
    ("rainfall", 0.0, 500.0),
    ("power_availability", 0.0, 1.0),
    ("tanker_count", 0.0, 200.0),
    ("groundwater_level", 0.0, 50.0),
    ("demand_surge", 0.0, 5.0),
    ("price_index", 0.0, 10.0),
];

fn manual_array(manual: &ManualParams) -> [Option<f64>; FeatureVector::LEN] {
    [
        manual.rainfall,
        manual.power_availability,
        manual.tanker_count,
        manual.groundwater_level,
        manual.demand_surge,
        manual.price_index,
    ]
}

// ============================================================================
// Stress adjustment
// ============================================================================

/// Risk points a feature vector carries from threshold breaches.
///
/// rainfall > 20 → 15, power < 0.5 → 20, tankers < 5 → 10,
/// groundwater < 3 → 12, demand > 1.5 → 15, price > 1.5 → 8.
pub fn stress_points(f: &FeatureVector) -> f64 {
    let mut points = 0.0;
    if f.rainfall > 20.0 {
        points += 15.0;
    }
    if f.power_availability < 0.5 {
        points += 20.0;
    }
    if f.tanker_count < 5.0 {
        points += 10.0;
    }
    if f.groundwater_level < 3.0 {
        points += 12.0;
    }
    if f.demand_surge > 1.5 {
        points += 15.0;
    }
    if f.price_index > 1.5 {
        points += 8.0;
    }
    points
}

// ============================================================================
// Profile
// ============================================================================

/// Canonical scenario input for one analysis call.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioProfile {
    pub scenario: Scenario,
    /// Preset merged with manual overrides
    pub features: FeatureVector,
    /// Stress carried by the manual overrides alone, applied on top of
    /// neutral (Normal) conditions; identical overrides add the same points
    /// to every scenario
    pub manual_delta: f64,
}

/// Build a profile from a scenario name (default `Normal`) and overrides.
///
/// Every supplied override must be finite and inside its [`PARAM_RANGES`]
/// entry; missing overrides keep the preset value.
pub fn normalize(
    scenario: Option<&str>,
    manual: &ManualParams,
) -> Result<ScenarioProfile, ValidationError> {
    let scenario = match scenario {
        Some(name) => name.parse::<Scenario>()?,
        None => Scenario::Normal,
    };
    let mut merged = scenario.preset().to_array();
    let mut overrides = Scenario::Normal.preset().to_array();

    for (i, value) in manual_array(manual).into_iter().enumerate() {
        let Some(value) = value else { continue };
        let (field, min, max) = PARAM_RANGES[i];
        if !value.is_finite() || value < min || value > max {
            return Err(ValidationError::ParameterOutOfRange { field, value, min, max });
        }
        merged[i] = value;
        overrides[i] = value;
    }

    Ok(ScenarioProfile {
        scenario,
        features: FeatureVector::from_array(merged),
        manual_delta: stress_points(&FeatureVector::from_array(overrides)),
    })
}

/// Synthesize a recent-history window ending at `current`.
///
/// With no real telemetry, conditions are assumed to have moved linearly
/// from the Normal preset to `current` over `window` samples (oldest first).
pub fn synthesize_history(current: &FeatureVector, window: usize) -> Vec<FeatureVector> {
    let start = Scenario::Normal.preset();
    match window {
        0 => Vec::new(),
        1 => vec![*current],
        n => (0..n)
            .map(|i| start.lerp(current, i as f64 / (n - 1) as f64))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_scenarios_case_insensitive() {
        assert_eq!("Flood Event".parse::<Scenario>(), Ok(Scenario::FloodEvent));
        assert_eq!("power failure".parse::<Scenario>(), Ok(Scenario::PowerFailure));
        assert_eq!(" Normal ".parse::<Scenario>(), Ok(Scenario::Normal));
        assert_eq!(
            "Drought".parse::<Scenario>(),
            Err(ValidationError::UnknownScenario("Drought".into()))
        );
    }

    #[test]
    fn test_missing_scenario_defaults_to_normal() {
        let p = normalize(None, &ManualParams::default()).unwrap();
        assert_eq!(p.scenario, Scenario::Normal);
        assert_eq!(p.features, Scenario::Normal.preset());
        assert_eq!(p.manual_delta, 0.0);
    }

    #[test]
    fn test_manual_override_adds_stress_delta() {
        let manual = ManualParams {
            rainfall: Some(35.0),
            power_availability: Some(0.2),
            ..Default::default()
        };
        let p = normalize(Some("Normal"), &manual).unwrap();
        assert_eq!(p.features.rainfall, 35.0);
        assert_eq!(p.features.tanker_count, 10.0);
        assert_eq!(p.manual_delta, 35.0);
    }

    #[test]
    fn test_normal_preset_carries_no_stress() {
        assert_eq!(stress_points(&Scenario::Normal.preset()), 0.0);
    }

    #[test]
    fn test_same_overrides_add_same_points_to_every_scenario() {
        let manual = ManualParams {
            power_availability: Some(0.9),
            demand_surge: Some(2.0),
            ..Default::default()
        };
        for sc in Scenario::ALL {
            let p = normalize(Some(sc.as_str()), &manual).unwrap();
            assert_eq!(p.manual_delta, 15.0, "{sc}");
            assert_eq!(p.features.power_availability, 0.9);
        }

        // A relieving override never subtracts the preset's own stress
        let manual = ManualParams {
            rainfall: Some(0.0),
            ..Default::default()
        };
        let p = normalize(Some("Flood Event"), &manual).unwrap();
        assert_eq!(p.manual_delta, 0.0);
        assert_eq!(p.features.rainfall, 0.0);
    }

    #[test]
    fn test_out_of_range_override_rejected() {
        let manual = ManualParams {
            power_availability: Some(1.5),
            ..Default::default()
        };
        let err = normalize(None, &manual).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::ParameterOutOfRange { field: "power_availability", .. }
        ));

        let manual = ManualParams {
            rainfall: Some(f64::NAN),
            ..Default::default()
        };
        assert!(normalize(None, &manual).is_err());
    }

    #[test]
    fn test_presets_within_ranges() {
        for sc in Scenario::ALL {
            for (value, (field, min, max)) in sc.preset().to_array().iter().zip(PARAM_RANGES) {
                assert!(*value >= min && *value <= max, "{sc} {field}");
            }
        }
    }

    #[test]
    fn test_history_window_ends_at_current() {
        let current = Scenario::FloodEvent.preset();
        let h = synthesize_history(&current, 6);
        assert_eq!(h.len(), 6);
        assert_eq!(h[0], Scenario::Normal.preset());
        assert_eq!(h[5], current);
        assert_eq!(synthesize_history(&current, 1), vec![current]);
    }
}
