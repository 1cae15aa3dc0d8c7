//! AquaShield - Predictive Risk Intelligence Core
//!
//! Serves the risk operations over HTTP, or runs one of them from the
//! command line and prints the JSON result.
//!
//! # Usage
//!
//! ```bash
//! # HTTP server (default)
//! aquashield serve --addr 0.0.0.0:8000
//!
//! # One-shot operations
//! aquashield fragility --scenario "Flood Event" --time-step 6
//! aquashield fleet --seed 7
//! aquashield simulate --lat 19.05 --lon 72.82 --source-type "Oil Spill" --hours 12
//! ```
//!
//! # Environment Variables
//!
//! - `AQUASHIELD_CONFIG`: path to a TOML config (default: ./aquashield.toml)
//! - `AQUASHIELD_SERVER_ADDR`: server bind address
//! - `AQUASHIELD_CORS_ORIGINS`: comma-separated allowed CORS origins
//! - `RUST_LOG`: logging level (default: info)

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use aquashield::api::{create_app, ApiState};
use aquashield::config::defaults;
use aquashield::{
    ChannelSink, FragilityRequest, PropagationRequest, RiskConfig, RiskCore, VesselAnomalyRequest,
};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "aquashield")]
#[command(about = "AquaShield predictive risk intelligence core")]
#[command(version)]
struct CliArgs {
    /// Load configuration from this TOML file instead of the search order
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<SubCommand>,
}

#[derive(clap::Subcommand, Debug)]
enum SubCommand {
    /// Run the HTTP server
    Serve {
        /// Override the server address (default from config: "0.0.0.0:8000")
        #[arg(short, long, env = "AQUASHIELD_SERVER_ADDR")]
        addr: Option<String>,
    },
    /// Score every zone under a scenario and plan tanker dispatch
    Fragility {
        #[arg(long, default_value = "Normal")]
        scenario: String,
        /// Forecast horizon in hours (0-24)
        #[arg(long, default_value = "0")]
        time_step: i64,
    },
    /// Classify the simulated AIS fleet
    Fleet {
        /// Fleet seed (default from config)
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Simulate a contamination plume
    Simulate {
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,
        /// Oil Spill, Sewage Overflow or Industrial Discharge
        #[arg(long)]
        source_type: Option<String>,
        /// Flow direction (degrees, 0 = north)
        #[arg(long)]
        direction: Option<f64>,
        /// Flow speed (m/s)
        #[arg(long)]
        speed: Option<f64>,
        #[arg(long)]
        hours: Option<i64>,
    },
}

fn load_config(path: Option<&PathBuf>) -> Result<RiskConfig> {
    match path {
        Some(p) => RiskConfig::load_from_file(p)
            .with_context(|| format!("Failed to load config from {}", p.display())),
        None => Ok(RiskConfig::load()),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

// ============================================================================
// Server
// ============================================================================

async fn serve(core: Arc<RiskCore>, addr: String) -> Result<()> {
    let cancel_token = CancellationToken::new();
    let shutdown_token = cancel_token.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Received Ctrl+C, initiating shutdown...");
        shutdown_token.cancel();
    });

    let (history, history_task) =
        ChannelSink::spawn(defaults::HISTORY_CHANNEL_CAPACITY, cancel_token.clone());
    let app = create_app(ApiState::new(core, Arc::new(history)));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!(addr = %addr, "HTTP server listening");

    let server_token = cancel_token.clone();
    let result = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            server_token.cancelled().await;
            info!("[HttpServer] Received shutdown signal");
        })
        .await;

    cancel_token.cancel();
    match history_task.await {
        Ok(drained) => info!(drained, "History sink stopped"),
        Err(e) => error!(error = %e, "History sink task failed"),
    }

    result.context("HTTP server error")?;
    info!("AquaShield shutdown complete");
    Ok(())
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = CliArgs::parse();
    let config = load_config(args.config.as_ref())?;
    let server_addr = config.server.addr.clone();
    let core = Arc::new(RiskCore::new(Arc::new(config)));

    let command = args.command.unwrap_or_else(|| SubCommand::Serve {
        addr: std::env::var("AQUASHIELD_SERVER_ADDR").ok(),
    });
    match command {
        SubCommand::Serve { addr } => serve(core, addr.unwrap_or(server_addr)).await,
        SubCommand::Fragility {
            scenario,
            time_step,
        } => print_json(&core.analyze_fragility(&FragilityRequest {
            scenario: Some(scenario),
            time_step: Some(time_step),
            manual_params: None,
        })?),
        SubCommand::Fleet { seed } => print_json(&core.detect_vessel_anomalies(
            &VesselAnomalyRequest {
                vessels: None,
                seed,
            },
        )?),
        SubCommand::Simulate {
            lat,
            lon,
            source_type,
            direction,
            speed,
            hours,
        } => print_json(&core.simulate_propagation(&PropagationRequest {
            source_lat: Some(lat),
            source_lon: Some(lon),
            source_type,
            flow_direction: direction,
            flow_speed: speed,
            simulation_hours: hours,
        })?),
    }
}
