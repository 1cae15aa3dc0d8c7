//! Risk Configuration Module
//!
//! Engine constants loaded from TOML, replacing hardcoded coefficients with
//! operator-tunable values.
//!
//! ## Loading Order
//!
//! 1. `AQUASHIELD_CONFIG` environment variable (path to TOML file)
//! 2. `aquashield.toml` in the current working directory
//! 3. Built-in defaults
//!
//! Engines take the loaded config by `Arc` at construction; there is no
//! process-wide mutable configuration.

mod risk_config;
pub mod defaults;
pub mod validation;

pub use risk_config::*;
