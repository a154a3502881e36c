//! Application setup and initialization
//!
//! Everything that runs once at startup: configuration checks, telemetry,
//! services and the router.

pub mod routes;
pub mod server;
pub mod services;
pub mod validation;

use crate::state::AppState;
use anyhow::{Context, Result};
use intake_core::Config;
use std::sync::Arc;

/// Initialize the entire application
pub fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    crate::telemetry::init_telemetry(config.log_format(), config.environment())?;

    // Fail fast on misconfiguration
    validation::validate_config(&config).context("Configuration validation failed")?;

    tracing::info!("Configuration loaded and validated successfully");

    let state = services::initialize_services(&config)?;

    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
