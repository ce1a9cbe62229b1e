//! Application setup and initialization

pub mod database;
pub mod routes;
pub mod server;
pub mod storage;
pub mod validation;

use crate::state::AppState;
use anyhow::{Context, Result};
use snapvault_core::Config;
use snapvault_db::PostgresUploadRepository;
use std::sync::Arc;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    crate::telemetry::init_telemetry(config.is_production())?;

    // Fail fast on misconfiguration
    validation::validate_config(&config).context("Configuration validation failed")?;
    tracing::info!(
        environment = %config.environment(),
        "Configuration loaded and validated successfully"
    );

    let pool = database::setup_database(&config).await?;
    let storage = storage::setup_storage(&config).await?;
    let repository = Arc::new(PostgresUploadRepository::new(pool));

    let state = Arc::new(AppState::new(config.clone(), storage, repository));
    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
