//! API route handlers
//!
//! Thin transport over [`RiskCore`]: parse the body, run the operation on the
//! blocking pool, wrap the result in the envelope. Successful results are
//! offered to the history sink; failures are logged and returned as
//! `{error: {kind, code, message}}`.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Query, State};
use axum::response::Response;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::warn;

use super::envelope::{ApiErrorResponse, ApiResponse};
use crate::engine::{
    FragilityRequest, NetworkOptRequest, NetworkPlan, OilSpillRequest, RiskCore,
    VesselAnomalyRequest,
};
use crate::error::CoreResult;
use crate::history::{HistoryRecord, HistorySink, NullSink};
use crate::plume::PropagationRequest;
use crate::types::{FragilityAnalysis, MarineAnalysis, OilSpillEstimate, PropagationResult};

// ============================================================================
// API State
// ============================================================================

/// Shared state for API handlers
#[derive(Clone)]
pub struct ApiState {
    pub core: Arc<RiskCore>,
    pub history: Arc<dyn HistorySink>,
}

impl ApiState {
    pub fn new(core: Arc<RiskCore>, history: Arc<dyn HistorySink>) -> Self {
        Self { core, history }
    }

    /// State without history recording.
    pub fn without_history(core: Arc<RiskCore>) -> Self {
        Self::new(core, Arc::new(NullSink))
    }
}

/// Run a core operation off the async executor and envelope the outcome.
async fn run<T, F>(
    state: &ApiState,
    operation: &'static str,
    op: F,
    summarize: fn(&T) -> serde_json::Value,
) -> Response
where
    T: Serialize + Send + 'static,
    F: FnOnce(&RiskCore) -> CoreResult<T> + Send + 'static,
{
    let core = Arc::clone(&state.core);
    match tokio::task::spawn_blocking(move || op(&core)).await {
        Ok(Ok(result)) => {
            state.history.record(HistoryRecord::new(operation, summarize(&result)));
            ApiResponse::ok(result)
        }
        Ok(Err(e)) => {
            warn!(operation, kind = e.kind(), error = %e, "Operation rejected");
            ApiErrorResponse::from_core(&e)
        }
        Err(e) => ApiErrorResponse::internal(format!("{operation} task failed: {e}")),
    }
}

fn rejected(operation: &'static str, rejection: JsonRejection) -> Response {
    warn!(operation, error = %rejection.body_text(), "Malformed request body");
    ApiErrorResponse::bad_request(rejection.body_text())
}

// ============================================================================
// Health
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub fragility_model: String,
    pub operations: [&'static str; 4],
}

/// GET /
pub async fn health(State(state): State<ApiState>) -> Response {
    ApiResponse::ok(HealthResponse {
        status: "ok",
        service: "aquashield",
        version: env!("CARGO_PKG_VERSION"),
        fragility_model: state.core.model_name().to_string(),
        operations: [
            "analyze_fragility",
            "detect_vessel_anomalies",
            "estimate_oil_spill",
            "simulate_propagation",
        ],
    })
}

// ============================================================================
// Urban water
// ============================================================================

/// POST /api/v1/fragility
pub async fn analyze_fragility(
    State(state): State<ApiState>,
    body: Result<Json<FragilityRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match body {
        Ok(b) => b,
        Err(e) => return rejected("analyze_fragility", e),
    };
    run(
        &state,
        "analyze_fragility",
        move |core| core.analyze_fragility(&request),
        |r: &FragilityAnalysis| {
            json!({
                "scenario": r.scenario,
                "time_step": r.time_step,
                "critical": r.summary.critical_count,
                "routes": r.dispatch_plan.len(),
            })
        },
    )
    .await
}

/// POST /api/v1/network/optimize
pub async fn optimize_network(
    State(state): State<ApiState>,
    body: Result<Json<NetworkOptRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match body {
        Ok(b) => b,
        Err(e) => return rejected("optimize_network", e),
    };
    run(
        &state,
        "optimize_network",
        move |core| core.optimize_network(&request),
        |r: &NetworkPlan| json!({ "zones": r.zones.len(), "routes": r.dispatch_plan.len() }),
    )
    .await
}

#[derive(Debug, Default, Deserialize)]
pub struct SeedQuery {
    pub seed: Option<u64>,
}

/// GET /api/v1/sample_data?seed=
pub async fn sample_data(State(state): State<ApiState>, Query(q): Query<SeedQuery>) -> Response {
    ApiResponse::ok(state.core.sample_data(q.seed))
}

// ============================================================================
// Marine
// ============================================================================

/// GET /api/v1/vessels?seed=
pub async fn vessel_positions(
    State(state): State<ApiState>,
    Query(q): Query<SeedQuery>,
) -> Response {
    ApiResponse::ok(state.core.vessel_positions(q.seed))
}

/// POST /api/v1/vessels/anomalies
pub async fn detect_vessel_anomalies(
    State(state): State<ApiState>,
    body: Result<Json<VesselAnomalyRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match body {
        Ok(b) => b,
        Err(e) => return rejected("detect_vessel_anomalies", e),
    };
    run(
        &state,
        "detect_vessel_anomalies",
        move |core| core.detect_vessel_anomalies(&request),
        |r: &MarineAnalysis| {
            json!({
                "total": r.summary.total,
                "suspicious": r.summary.suspicious,
                "distress": r.summary.distress,
            })
        },
    )
    .await
}

/// POST /api/v1/vessels/oil_spill
pub async fn estimate_oil_spill(
    State(state): State<ApiState>,
    body: Result<Json<OilSpillRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match body {
        Ok(b) => b,
        Err(e) => return rejected("estimate_oil_spill", e),
    };
    run(
        &state,
        "estimate_oil_spill",
        move |core| core.estimate_oil_spill(&request),
        |r: &OilSpillEstimate| json!({ "imo": r.imo, "probability": r.probability, "area_km2": r.area_km2 }),
    )
    .await
}

// ============================================================================
// Contamination cascade
// ============================================================================

/// POST /api/v1/propagation
pub async fn simulate_propagation(
    State(state): State<ApiState>,
    body: Result<Json<PropagationRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match body {
        Ok(b) => b,
        Err(e) => return rejected("simulate_propagation", e),
    };
    run(
        &state,
        "simulate_propagation",
        move |core| core.simulate_propagation(&request),
        |r: &PropagationResult| {
            json!({
                "source_type": r.risk_summary.contamination_type,
                "steps": r.time_steps.len(),
                "facilities": r.risk_summary.facilities.len(),
                "max_population_exposure": r.risk_summary.max_population_exposure,
            })
        },
    )
    .await
}

/// Fallback for unmatched paths.
pub async fn not_found() -> Response {
    ApiErrorResponse::not_found("no such endpoint")
}
