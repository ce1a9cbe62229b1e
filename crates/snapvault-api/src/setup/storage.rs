//! Storage setup and initialization

use anyhow::{Context, Result};
use snapvault_core::Config;
use snapvault_storage::{create_storage, Storage};
use std::sync::Arc;

/// Build the configured backend and check that it answers.
///
/// An unreachable backend is logged, not fatal: uploads fail with
/// `STORAGE_ERROR` and `/health` reports `degraded` until it recovers.
pub async fn setup_storage(config: &Config) -> Result<Arc<dyn Storage>> {
    tracing::info!(backend = %config.storage_backend(), "Initializing storage...");
    let storage = create_storage(config)
        .await
        .context("Failed to initialize storage backend")?;

    match storage.exists(crate::constants::HEALTH_CHECK_KEY).await {
        Ok(_) => tracing::info!(
            backend = %storage.backend_type(),
            "Storage initialized successfully"
        ),
        Err(e) => tracing::warn!(
            backend = %storage.backend_type(),
            error = %e,
            "Storage backend is not reachable yet"
        ),
    }

    Ok(storage)
}
