//! Urban water types: FeatureVector, ManualParams, Zone, ZoneStatus, DispatchRoute

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{Alert, GeoPoint, Recommendation};

// ============================================================================
// Features
// ============================================================================

/// Canonical six-field feature vector describing a zone's operating conditions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Rainfall (mm/hr)
    pub rainfall: f64,
    /// Grid power availability (0-1)
    pub power_availability: f64,
    /// Tankers available for dispatch
    pub tanker_count: f64,
    /// Groundwater level (m)
    pub groundwater_level: f64,
    /// Demand relative to seasonal norm (1.0 = normal)
    pub demand_surge: f64,
    /// Water price index relative to norm (1.0 = normal)
    pub price_index: f64,
}

impl FeatureVector {
    pub const LEN: usize = 6;

    pub fn to_array(&self) -> [f64; Self::LEN] {
        [
            self.rainfall,
            self.power_availability,
            self.tanker_count,
            self.groundwater_level,
            self.demand_surge,
            self.price_index,
        ]
    }

    pub fn from_array(values: [f64; Self::LEN]) -> Self {
        Self {
            rainfall: values[0],
            power_availability: values[1],
            tanker_count: values[2],
            groundwater_level: values[3],
            demand_surge: values[4],
            price_index: values[5],
        }
    }

    /// Linear interpolation toward `other` (t = 0 → self, t = 1 → other).
    pub fn lerp(&self, other: &FeatureVector, t: f64) -> FeatureVector {
        let a = self.to_array();
        let b = other.to_array();
        let mut out = [0.0; Self::LEN];
        for i in 0..Self::LEN {
            out[i] = a[i] + (b[i] - a[i]) * t;
        }
        Self::from_array(out)
    }
}

/// Caller-supplied overrides. Missing fields fall back to the preset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ManualParams {
    #[serde(default)]
    pub rainfall: Option<f64>,
    #[serde(default)]
    pub power_availability: Option<f64>,
    #[serde(default)]
    pub tanker_count: Option<f64>,
    #[serde(default)]
    pub groundwater_level: Option<f64>,
    #[serde(default)]
    pub demand_surge: Option<f64>,
    #[serde(default)]
    pub price_index: Option<f64>,
}

// ============================================================================
// Zones
// ============================================================================

/// Status tier of a scored zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoneStatus {
    Normal,
    Warning,
    Critical,
}

impl ZoneStatus {
    /// Fixed tiering: score > critical → critical, warning ≤ score ≤ critical
    /// → warning, below warning → normal.
    pub fn from_score(score: f64, warning_threshold: f64, critical_threshold: f64) -> Self {
        if score > critical_threshold {
            ZoneStatus::Critical
        } else if score >= warning_threshold {
            ZoneStatus::Warning
        } else {
            ZoneStatus::Normal
        }
    }
}

impl std::fmt::Display for ZoneStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ZoneStatus::Normal => write!(f, "normal"),
            ZoneStatus::Warning => write!(f, "warning"),
            ZoneStatus::Critical => write!(f, "critical"),
        }
    }
}

/// A scored zone. Immutable once scored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub id: u32,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    /// Conditions the zone was scored under; absent when the score came
    /// from the caller
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub features: Option<FeatureVector>,
    pub score: f64,
    pub status: ZoneStatus,
}

impl Zone {
    pub fn position(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lon)
    }
}

// ============================================================================
// Dispatch
// ============================================================================

/// Tanker route from a non-critical origin to a critical zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchRoute {
    pub from: u32,
    pub to: u32,
    pub from_name: String,
    pub to_name: String,
    /// Zone ids from origin to destination inclusive
    pub route: Vec<u32>,
    /// Congestion-weighted path cost (km)
    pub path_cost_km: f64,
    /// Expected tanker travel time (minutes)
    pub lag_minutes: f64,
}

/// Critical zone with no reachable non-critical origin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DispatchUnavailable {
    pub zone: u32,
    pub zone_name: String,
    pub reason: String,
}

/// Router output: one route per servable critical zone, plus the rest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DispatchPlan {
    pub routes: Vec<DispatchRoute>,
    pub unavailable: Vec<DispatchUnavailable>,
}

// ============================================================================
// Fragility result
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FragilitySummary {
    pub critical_count: usize,
    pub warning_count: usize,
    pub normal_count: usize,
    /// True iff `dispatch_plan` is non-empty
    pub dispatch_required: bool,
    pub max_score: f64,
    pub avg_score: f64,
}

/// Full result of `analyze_fragility`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FragilityAnalysis {
    pub scenario: String,
    pub time_step: u32,
    pub model: String,
    pub zones: Vec<Zone>,
    /// Zone id (as string) → score
    pub scores: BTreeMap<String, f64>,
    pub dispatch_plan: Vec<DispatchRoute>,
    pub dispatch_unavailable: Vec<DispatchUnavailable>,
    pub early_warnings: Vec<Alert>,
    pub recommendations: Vec<Recommendation>,
    pub summary: FragilitySummary,
}

/// One synthetic feature row from the sample-data generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleRow {
    pub zone_id: u32,
    pub hour: u32,
    #[serde(flatten)]
    pub features: FeatureVector,
}
