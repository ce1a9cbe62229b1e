//! Health check handlers.
//!
//! `/health` never fails: each probe is bounded by a timeout and its outcome
//! is reported as a status string next to the composite status.

use crate::constants::HEALTH_CHECK_KEY;
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use snapvault_core::models::{HealthReport, HealthStatus, PROBE_HEALTHY};
use std::fmt::Display;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

const TIMEOUT: Duration = Duration::from_secs(5);

/// Run an async check with timeout; returns "healthy", "timeout", or "{prefix}: {error}".
async fn run_check<F, E>(timeout: Duration, f: F, error_prefix: &str) -> String
where
    F: Future<Output = Result<(), E>>,
    E: Display,
{
    match tokio::time::timeout(timeout, f).await {
        Ok(Ok(())) => PROBE_HEALTHY.to_string(),
        Ok(Err(e)) => format!("{}: {}", error_prefix, e),
        Err(_) => "timeout".to_string(),
    }
}

/// Liveness probe - process is running.
pub async fn liveness_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(serde_json::json!({ "status": "alive" })),
    )
}

/// Readiness probe - the metadata store must answer.
pub async fn readiness_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let database = run_check(TIMEOUT, state.repository.ping(), "not_ready").await;

    if database == PROBE_HEALTHY {
        (
            StatusCode::OK,
            Json(serde_json::json!({ "status": "ready", "database": "ready" })),
        )
    } else {
        tracing::error!(database = %database, "Readiness check failed");
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::json!({ "status": "not_ready", "database": database })),
        )
    }
}

/// Composite health of the metadata store and the storage backend.
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Composite and per-probe status", body = HealthReport)
    )
)]
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthReport> {
    let storage = state.storage.clone();
    let (database, storage) = tokio::join!(
        run_check(TIMEOUT, state.repository.ping(), "unhealthy"),
        run_check(
            TIMEOUT,
            async move { storage.exists(HEALTH_CHECK_KEY).await.map(drop) },
            "degraded",
        ),
    );

    let database_ok = database == PROBE_HEALTHY;
    let storage_ok = storage == PROBE_HEALTHY;

    let total_uploads = if database_ok {
        match tokio::time::timeout(TIMEOUT, state.repository.count()).await {
            Ok(Ok(count)) => Some(count),
            _ => None,
        }
    } else {
        None
    };

    let status = HealthStatus::from_probes(database_ok, storage_ok);
    if status != HealthStatus::Healthy {
        tracing::warn!(database = %database, storage = %storage, "Health check degraded");
    }

    Json(HealthReport {
        status,
        database,
        storage,
        total_uploads,
    })
}
