//! Marine types: Vessel, Observation, AnomalyRecord, VesselStatus, OilSpillEstimate

use serde::{Deserialize, Serialize};

use super::{Alert, GeoPoint, Severity};

/// AIS ship type category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum VesselType {
    Cargo,
    Tanker,
    Fishing,
    Passenger,
    Military,
    #[default]
    #[serde(other)]
    Other,
}

impl std::fmt::Display for VesselType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VesselType::Cargo => write!(f, "Cargo"),
            VesselType::Tanker => write!(f, "Tanker"),
            VesselType::Fishing => write!(f, "Fishing"),
            VesselType::Passenger => write!(f, "Passenger"),
            VesselType::Military => write!(f, "Military"),
            VesselType::Other => write!(f, "Other"),
        }
    }
}

/// One prior AIS observation used to establish a vessel's recent behaviour.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    /// Unix timestamp (seconds)
    pub timestamp: i64,
    /// Speed over ground (knots)
    pub sog: f64,
    /// Course over ground (degrees)
    pub cog: f64,
}

/// Current AIS telemetry for a vessel plus its short rolling history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vessel {
    pub imo: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub vessel_type: VesselType,
    pub lat: f64,
    pub lon: f64,
    /// Speed over ground (knots)
    pub sog: f64,
    /// Course over ground (degrees)
    pub cog: f64,
    #[serde(default)]
    pub heading: f64,
    /// Unix timestamp of this observation (seconds)
    #[serde(default)]
    pub timestamp: i64,
    /// Prior observations, oldest first
    #[serde(default)]
    pub history: Vec<Observation>,
}

impl Vessel {
    pub fn position(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lon)
    }

    /// Display label, falling back to the IMO number.
    pub fn label(&self) -> &str {
        if self.name.is_empty() {
            &self.imo
        } else {
            &self.name
        }
    }
}

/// Kind of kinematic anomaly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyKind {
    SpeedDrop,
    CourseDeviation,
    /// Highest-severity kind: alone it classifies a vessel as distress
    UnexpectedStop,
}

impl std::fmt::Display for AnomalyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnomalyKind::SpeedDrop => write!(f, "speed drop"),
            AnomalyKind::CourseDeviation => write!(f, "course deviation"),
            AnomalyKind::UnexpectedStop => write!(f, "unexpected stop"),
        }
    }
}

/// Per-anomaly severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnomalySeverity {
    Medium,
    High,
    Critical,
}

/// One detected anomaly with its evidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyRecord {
    #[serde(rename = "type")]
    pub kind: AnomalyKind,
    /// Drop fraction (speed_drop), degrees (course_deviation) or minutes stopped (unexpected_stop)
    pub magnitude: f64,
    pub description: String,
    pub severity: AnomalySeverity,
}

/// Vessel classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VesselClass {
    Normal,
    Suspicious,
    Distress,
}

impl std::fmt::Display for VesselClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VesselClass::Normal => write!(f, "normal"),
            VesselClass::Suspicious => write!(f, "suspicious"),
            VesselClass::Distress => write!(f, "distress"),
        }
    }
}

/// Where the comparison window for a vessel came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BaselineSource {
    /// Caller supplied prior observations
    Supplied,
    /// Synthesized from the simulated fleet's base track
    Fleet,
    /// No history available; no deltas could be evaluated
    Unavailable,
}

/// Classification result for one vessel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VesselStatus {
    pub imo: String,
    pub name: String,
    pub status: VesselClass,
    pub anomalies: Vec<AnomalyRecord>,
    /// Weighted anomaly score (0-100)
    pub risk_score: u32,
    pub baseline: BaselineSource,
    pub vessel: Vessel,
}

impl VesselStatus {
    pub fn has_anomaly(&self, kind: AnomalyKind) -> bool {
        self.anomalies.iter().any(|a| a.kind == kind)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarineSummary {
    pub total: usize,
    pub normal: usize,
    pub suspicious: usize,
    pub distress: usize,
}

/// Full result of `detect_vessel_anomalies`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarineAnalysis {
    pub vessel_statuses: Vec<VesselStatus>,
    pub alerts: Vec<Alert>,
    pub summary: MarineSummary,
}

/// Spill estimate for a distressed vessel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OilSpillEstimate {
    pub imo: String,
    /// Spill probability (0-1)
    pub probability: f64,
    pub area_km2: f64,
    pub radius_km: f64,
    /// Closed ring (first point repeated last)
    pub spill_polygon: Vec<GeoPoint>,
    /// Slick centre (drifted from the last known position)
    pub center: GeoPoint,
    /// Vessel's last known position
    pub anchor: GeoPoint,
    pub severity: Severity,
}
