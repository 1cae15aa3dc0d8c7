//! RiskCore: the public operations over the three engines.
//!
//! Each call validates its whole input first, computes, then hands the
//! structured findings to [`crate::advisory`]. The core holds only read-only
//! configuration and registries, so one instance is shared across threads
//! and HTTP handlers behind an `Arc`.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;
use tracing::{debug, info};

use crate::advisory;
use crate::config::{defaults, RiskConfig};
use crate::dispatch::DispatchRouter;
use crate::error::{CoreResult, ValidationError};
use crate::fragility::{self, round2, FragilityEngine, FragilityModel, ZoneRegistry};
use crate::marine::{self, simulated_fleet, AnomalyDetector, OilSpillEstimator};
use crate::plume::{InfrastructureRegistry, PlumeSimulator, PropagationRequest};
use crate::types::{
    DispatchRoute, DispatchUnavailable, FragilityAnalysis, FragilitySummary, ManualParams,
    MarineAnalysis, OilSpillEstimate, PropagationResult, SampleRow, Vessel, Zone, ZoneStatus,
};

// ============================================================================
// Requests
// ============================================================================

/// `analyze_fragility` input. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FragilityRequest {
    #[serde(default)]
    pub scenario: Option<String>,
    /// Forecast horizon in hours (0-24)
    #[serde(default)]
    pub time_step: Option<i64>,
    #[serde(default)]
    pub manual_params: Option<ManualParams>,
}

/// `optimize_network` input: zone id or zone name → fragility score.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkOptRequest {
    #[serde(default)]
    pub zone_scores: BTreeMap<String, f64>,
}

/// Router output over caller-supplied scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkPlan {
    pub zones: Vec<Zone>,
    pub dispatch_plan: Vec<DispatchRoute>,
    pub dispatch_unavailable: Vec<DispatchUnavailable>,
}

/// `detect_vessel_anomalies` input. No vessels → the simulated fleet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VesselAnomalyRequest {
    #[serde(default)]
    pub vessels: Option<Vec<Vessel>>,
    /// Fleet seed when `vessels` is absent
    #[serde(default)]
    pub seed: Option<u64>,
}

/// `estimate_oil_spill` input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OilSpillRequest {
    #[serde(default)]
    pub vessel: Option<Vessel>,
}

// ============================================================================
// RiskCore
// ============================================================================

pub struct RiskCore {
    config: Arc<RiskConfig>,
    fragility: FragilityEngine,
    router: DispatchRouter,
    plume: PlumeSimulator,
    detector: AnomalyDetector,
    spill: OilSpillEstimator,
}

impl RiskCore {
    /// Core over the built-in Mumbai zone and infrastructure registries.
    pub fn new(config: Arc<RiskConfig>) -> Self {
        Self::with_registries(
            config,
            Arc::new(ZoneRegistry::mumbai()),
            Arc::new(InfrastructureRegistry::mumbai()),
        )
    }

    pub fn with_registries(
        config: Arc<RiskConfig>,
        zones: Arc<ZoneRegistry>,
        infrastructure: Arc<InfrastructureRegistry>,
    ) -> Self {
        let fragility = FragilityEngine::new(config.fragility.clone(), Arc::clone(&zones));
        Self::assemble(config, fragility, zones, infrastructure)
    }

    /// Core with a caller-chosen fragility model.
    pub fn with_fragility_model(config: Arc<RiskConfig>, model: Box<dyn FragilityModel>) -> Self {
        let zones = Arc::new(ZoneRegistry::mumbai());
        let fragility =
            FragilityEngine::with_model(config.fragility.clone(), Arc::clone(&zones), model);
        Self::assemble(config, fragility, zones, Arc::new(InfrastructureRegistry::mumbai()))
    }

    fn assemble(
        config: Arc<RiskConfig>,
        fragility: FragilityEngine,
        zones: Arc<ZoneRegistry>,
        infrastructure: Arc<InfrastructureRegistry>,
    ) -> Self {
        info!(
            model = fragility.model_name(),
            zones = zones.len(),
            facilities = infrastructure.facilities().len(),
            "Risk core initialized"
        );
        Self {
            router: DispatchRouter::new(config.dispatch.clone(), zones),
            plume: PlumeSimulator::new(config.plume.clone(), infrastructure),
            detector: AnomalyDetector::new(config.vessel.clone(), config.fleet.clone()),
            spill: OilSpillEstimator::new(config.oil_spill.clone()),
            fragility,
            config,
        }
    }

    pub fn config(&self) -> &RiskConfig {
        &self.config
    }

    pub fn model_name(&self) -> &str {
        self.fragility.model_name()
    }

    // ------------------------------------------------------------------------
    // Urban water
    // ------------------------------------------------------------------------

    /// Score every zone under a scenario, plan tanker dispatch to critical
    /// zones and attach early warnings and recommendations.
    pub fn analyze_fragility(&self, request: &FragilityRequest) -> CoreResult<FragilityAnalysis> {
        let manual = request.manual_params.clone().unwrap_or_default();
        let profile = fragility::normalize(request.scenario.as_deref(), &manual)?;
        let horizon = self.fragility.validate_horizon(request.time_step)?;

        let zones = self.fragility.score_zones(&profile, horizon)?;
        let plan = self.router.plan(&zones);
        let early_warnings = advisory::fragility_alerts(&zones);
        let recommendations = advisory::fragility_recommendations(&zones, &plan.unavailable);
        let summary = summarize_zones(&zones, !plan.routes.is_empty());

        info!(
            scenario = %profile.scenario,
            horizon,
            critical = summary.critical_count,
            routes = plan.routes.len(),
            "Fragility analysis complete"
        );

        Ok(FragilityAnalysis {
            scenario: profile.scenario.as_str().to_string(),
            time_step: horizon,
            model: self.fragility.model_name().to_string(),
            scores: zones.iter().map(|z| (z.id.to_string(), z.score)).collect(),
            zones,
            dispatch_plan: plan.routes,
            dispatch_unavailable: plan.unavailable,
            early_warnings,
            recommendations,
            summary,
        })
    }

    /// Run the dispatch router over caller-supplied scores. Zones missing
    /// from the map take no part in routing. Returned zones carry no
    /// `features`: the router only reads score, status and position.
    pub fn optimize_network(&self, request: &NetworkOptRequest) -> CoreResult<NetworkPlan> {
        let registry = self.fragility.registry();
        let mut zones = Vec::with_capacity(request.zone_scores.len());
        for (key, &score) in &request.zone_scores {
            let site = registry
                .sites()
                .iter()
                .find(|s| s.id.to_string() == *key || s.name.eq_ignore_ascii_case(key))
                .ok_or_else(|| ValidationError::UnknownZone(key.clone()))?;
            if !score.is_finite() || !(0.0..=100.0).contains(&score) {
                return Err(ValidationError::InvalidZoneScore {
                    zone: key.clone(),
                    value: score,
                }
                .into());
            }
            zones.push(Zone {
                id: site.id,
                name: site.name.clone(),
                lat: site.position.lat,
                lon: site.position.lon,
                features: None,
                score: round2(score),
                status: self.fragility.status_for(score),
            });
        }
        zones.sort_by_key(|z| z.id);
        zones.dedup_by_key(|z| z.id);

        let plan = self.router.plan(&zones);
        info!(
            zones = zones.len(),
            routes = plan.routes.len(),
            unavailable = plan.unavailable.len(),
            "Network optimization complete"
        );
        Ok(NetworkPlan {
            zones,
            dispatch_plan: plan.routes,
            dispatch_unavailable: plan.unavailable,
        })
    }

    /// Deterministic synthetic feature rows for every zone.
    pub fn sample_data(&self, seed: Option<u64>) -> Vec<SampleRow> {
        fragility::sample_data(
            self.fragility.registry(),
            seed.unwrap_or(defaults::SAMPLE_DATA_SEED),
            defaults::SAMPLE_DATA_HOURS,
        )
    }

    // ------------------------------------------------------------------------
    // Marine
    // ------------------------------------------------------------------------

    /// The simulated AIS fleet for a seed (configured seed when absent).
    pub fn vessel_positions(&self, seed: Option<u64>) -> Vec<Vessel> {
        simulated_fleet(seed.unwrap_or(self.config.fleet.seed), &self.config.fleet)
    }

    /// Classify a vessel batch, or the simulated fleet when none is given.
    pub fn detect_vessel_anomalies(
        &self,
        request: &VesselAnomalyRequest,
    ) -> CoreResult<MarineAnalysis> {
        let simulated;
        let vessels: &[Vessel] = match &request.vessels {
            Some(v) => v,
            None => {
                simulated = self.vessel_positions(request.seed);
                &simulated
            }
        };
        if vessels.len() > defaults::MAX_VESSEL_BATCH {
            return Err(ValidationError::OutOfRange {
                field: "vessels",
                value: vessels.len() as f64,
                min: 0.0,
                max: defaults::MAX_VESSEL_BATCH as f64,
            }
            .into());
        }

        let vessel_statuses = self.detector.classify_batch(vessels)?;
        let alerts = advisory::marine_alerts(&vessel_statuses);
        let summary = marine::summarize(&vessel_statuses);

        info!(
            total = summary.total,
            suspicious = summary.suspicious,
            distress = summary.distress,
            simulated = request.vessels.is_none(),
            "Vessel anomaly detection complete"
        );
        Ok(MarineAnalysis {
            vessel_statuses,
            alerts,
            summary,
        })
    }

    /// Spill probability and slick polygon for a vessel that classifies as
    /// distress.
    pub fn estimate_oil_spill(&self, request: &OilSpillRequest) -> CoreResult<OilSpillEstimate> {
        let vessel = request
            .vessel
            .as_ref()
            .ok_or(ValidationError::MissingField("vessel"))?;
        let status = self.detector.classify(vessel)?;
        let estimate = self.spill.estimate(&status)?;
        info!(
            imo = %estimate.imo,
            probability = estimate.probability,
            area_km2 = estimate.area_km2,
            "Oil spill estimated"
        );
        Ok(estimate)
    }

    // ------------------------------------------------------------------------
    // Contamination cascade
    // ------------------------------------------------------------------------

    /// Hour-by-hour plume from a contamination source, with the
    /// infrastructure and population exposure at every hour.
    pub fn simulate_propagation(&self, request: &PropagationRequest) -> CoreResult<PropagationResult> {
        let (source, hours) = request.validate(&self.config.plume)?;
        debug!(
            lat = source.lat,
            lon = source.lon,
            source_type = %source.source_type,
            hours,
            "Simulating propagation"
        );

        let (time_steps, risk_summary) = self.plume.run(&source, hours);
        let alerts = advisory::cascade_alerts(&risk_summary, &time_steps, &self.config.plume);

        info!(
            source_type = %source.source_type,
            hours,
            facilities = risk_summary.facilities.len(),
            max_exposure = risk_summary.max_population_exposure,
            "Propagation simulation complete"
        );
        Ok(PropagationResult {
            source,
            time_steps,
            risk_summary,
            alerts,
        })
    }
}

fn summarize_zones(zones: &[Zone], dispatch_required: bool) -> FragilitySummary {
    let count = |status: ZoneStatus| zones.iter().filter(|z| z.status == status).count();
    let avg = zones.iter().map(|z| z.score).mean();
    FragilitySummary {
        critical_count: count(ZoneStatus::Critical),
        warning_count: count(ZoneStatus::Warning),
        normal_count: count(ZoneStatus::Normal),
        dispatch_required,
        max_score: zones.iter().map(|z| z.score).fold(0.0, f64::max),
        avg_score: if avg.is_nan() { 0.0 } else { round2(avg) },
    }
}
