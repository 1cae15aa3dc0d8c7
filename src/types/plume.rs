//! Contamination cascade types: SourceType, ContaminationSource, PlumeTimeStep, RiskSummary

use serde::{Deserialize, Serialize};

use super::{Alert, GeoPoint};
use crate::error::ValidationError;

/// Contamination source category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceType {
    #[serde(rename = "Oil Spill")]
    OilSpill,
    #[serde(rename = "Sewage Overflow")]
    SewageOverflow,
    #[serde(rename = "Industrial Discharge")]
    IndustrialDischarge,
}

impl SourceType {
    pub const ALL: [SourceType; 3] = [
        SourceType::OilSpill,
        SourceType::SewageOverflow,
        SourceType::IndustrialDischarge,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::OilSpill => "Oil Spill",
            SourceType::SewageOverflow => "Sewage Overflow",
            SourceType::IndustrialDischarge => "Industrial Discharge",
        }
    }

    /// Section name under `[plume]` in the config file.
    pub fn config_key(&self) -> &'static str {
        match self {
            SourceType::OilSpill => "oil_spill",
            SourceType::SewageOverflow => "sewage_overflow",
            SourceType::IndustrialDischarge => "industrial_discharge",
        }
    }
}

impl std::fmt::Display for SourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SourceType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        SourceType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(trimmed) || t.config_key() == trimmed)
            .ok_or_else(|| ValidationError::UnknownSourceType(s.to_string()))
    }
}

/// Validated contamination source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContaminationSource {
    pub lat: f64,
    pub lon: f64,
    #[serde(rename = "type")]
    pub source_type: SourceType,
    /// Bearing the flow heads toward (degrees, 0 = north, 90 = east)
    pub flow_direction: f64,
    /// Surface flow speed (m/s)
    pub flow_speed: f64,
}

impl ContaminationSource {
    pub fn position(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lon)
    }
}

/// One sampled point of the plume heat map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskGridPoint {
    pub lat: f64,
    pub lon: f64,
    /// Absolute intensity, bounded by the step's centroid intensity
    pub intensity: f64,
}

/// Water infrastructure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InfrastructureKind {
    TreatmentPlant,
    Intake,
    PumpingStation,
    Reservoir,
}

/// Criticality of a facility to regional supply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CriticalityTier {
    Primary,
    Secondary,
}

/// Proximity level of a facility to the plume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExposureLevel {
    Warning,
    Critical,
}

/// Facility inside one of the plume's risk radii at a given hour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InfrastructureAtRisk {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: InfrastructureKind,
    pub tier: CriticalityTier,
    pub distance_km: f64,
    pub risk_level: ExposureLevel,
}

/// Plume state at one simulated hour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlumeTimeStep {
    pub hour: u32,
    pub center: GeoPoint,
    pub radius_m: f64,
    pub radius_km: f64,
    /// Closed ring (first point repeated last)
    pub plume_polygon: Vec<GeoPoint>,
    /// Peak intensity at the centroid (0-1)
    pub intensity: f64,
    pub risk_grid: Vec<RiskGridPoint>,
    pub area_km2: f64,
    pub estimated_population_exposure: u64,
    pub infrastructure_at_risk: Vec<InfrastructureAtRisk>,
}

/// Run-wide impact on one facility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacilityImpact {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: InfrastructureKind,
    pub tier: CriticalityTier,
    /// First hour the facility entered a risk radius
    pub first_hour: u32,
    pub worst_level: ExposureLevel,
    pub min_distance_km: f64,
}

/// Aggregates over the whole simulated sequence, not just the final hour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskSummary {
    pub contamination_type: SourceType,
    /// Distinct treatment plants at risk at any hour
    pub treatment_plants_at_risk: usize,
    /// Distinct intakes at risk at any hour
    pub intakes_at_risk: usize,
    pub max_population_exposure: u64,
    pub max_area_km2: f64,
    pub facilities: Vec<FacilityImpact>,
}

/// Full result of `simulate_propagation`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropagationResult {
    pub source: ContaminationSource,
    pub time_steps: Vec<PlumeTimeStep>,
    pub risk_summary: RiskSummary,
    pub alerts: Vec<Alert>,
}
