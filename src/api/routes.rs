//! API route definitions
//!
//! - GET  /api/v1/sample_data        - synthetic zone feature rows
//! - POST /api/v1/fragility          - zone fragility + dispatch + warnings
//! - POST /api/v1/network/optimize   - dispatch over caller-supplied scores
//! - GET  /api/v1/vessels            - simulated AIS fleet
//! - POST /api/v1/vessels/anomalies  - vessel anomaly detection
//! - POST /api/v1/vessels/oil_spill  - oil spill estimate for a distressed vessel
//! - POST /api/v1/propagation        - contamination plume simulation

use axum::routing::{get, post};
use axum::Router;

use super::handlers::{self, ApiState};

/// Create all v1 API routes
pub fn api_routes(state: ApiState) -> Router {
    Router::new()
        // Urban water
        .route("/fragility", post(handlers::analyze_fragility))
        .route("/network/optimize", post(handlers::optimize_network))
        .route("/sample_data", get(handlers::sample_data))
        // Marine
        .route("/vessels", get(handlers::vessel_positions))
        .route("/vessels/anomalies", post(handlers::detect_vessel_anomalies))
        .route("/vessels/oil_spill", post(handlers::estimate_oil_spill))
        // Contamination cascade
        .route("/propagation", post(handlers::simulate_propagation))
        .with_state(state)
}

/// Health endpoint at the root
pub fn root_routes(state: ApiState) -> Router {
    Router::new()
        .route("/", get(handlers::health))
        .with_state(state)
}
