//! Route configuration and setup.
//!
//! Health checks live in [health](health).

pub mod health;

use crate::api_doc::ApiDoc;
use crate::constants::{API_PREFIX, OPENAPI_PATH};
use crate::handlers;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{get, post},
    Json, Router,
};
use snapvault_core::{Config, StorageBackend};
use std::sync::Arc;
use std::time::Duration;
use tower::limit::ConcurrencyLimitLayer;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

/// Room for multipart framing and non-file fields on top of the file itself.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;

    let api_routes = Router::new()
        .route(&format!("{}/upload", API_PREFIX), post(handlers::upload::upload_file))
        .route("/upload", post(handlers::upload::upload_file))
        .route(&format!("{}/uploads", API_PREFIX), get(handlers::uploads::list_uploads))
        .route("/uploads", get(handlers::uploads::list_uploads))
        .route(
            &format!("{}/uploads/{{id}}", API_PREFIX),
            get(handlers::uploads::get_upload),
        )
        .route(&format!("{}/stats", API_PREFIX), get(handlers::stats::upload_stats));

    let health_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/live", get(health::liveness_check))
        .route("/health/ready", get(health::readiness_check));

    let mut app = Router::new()
        .route("/", get(handlers::home))
        .merge(api_routes)
        .merge(health_routes)
        .route(OPENAPI_PATH, get(|| async { Json(ApiDoc::openapi()) }))
        .merge(utoipa_rapidoc::RapiDoc::new(OPENAPI_PATH).path("/docs"));

    // Local files are served back from the same origin under their base URL
    let base_url = config.local_storage_base_url().trim_end_matches('/');
    if config.storage_backend() == StorageBackend::Local && base_url.starts_with('/') {
        tracing::info!(
            path = %config.local_storage_path(),
            base_url = %base_url,
            "Serving local uploads"
        );
        app = app.nest_service(base_url, ServeDir::new(config.local_storage_path()));
    }

    let body_limit = config
        .max_file_size_bytes()
        .checked_add(MULTIPART_OVERHEAD_BYTES)
        .ok_or_else(|| {
            anyhow::anyhow!(
                "Maximum file size ({} bytes) leaves no room for multipart overhead",
                config.max_file_size_bytes()
            )
        })?;
    tracing::info!(
        body_limit_bytes = body_limit,
        http_concurrency_limit = config.http_concurrency_limit(),
        request_timeout_secs = config.request_timeout_secs(),
        "HTTP limits configured"
    );

    let app = app
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors)
                .layer(ConcurrencyLimitLayer::new(config.http_concurrency_limit()))
                .layer(TimeoutLayer::new(Duration::from_secs(
                    config.request_timeout_secs(),
                ))),
        )
        .with_state(state);

    Ok(app)
}

/// Setup CORS configuration
fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let methods = [Method::GET, Method::POST, Method::OPTIONS];

    let cors = if config.cors_origins().iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins()
            .iter()
            .map(|o| {
                o.parse::<HeaderValue>()
                    .map_err(|e| anyhow::anyhow!("Invalid CORS origin '{}': {}", o, e))
            })
            .collect::<Result<Vec<_>, _>>()?;

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(Any)
    };
    Ok(cors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use snapvault_core::UploadServiceConfig;
    use snapvault_processing::test_helpers::{InMemoryUploadRepository, MemoryStorage};

    fn config_with_max_bytes(max_bytes: usize) -> Config {
        let mut config = UploadServiceConfig::from_vars(|key| match key {
            "DATABASE_URL" => Some("postgresql://localhost/snapvault".to_string()),
            _ => None,
        })
        .unwrap();
        config.pipeline.max_bytes = max_bytes;
        Config(Box::new(config))
    }

    fn state(config: &Config) -> Arc<AppState> {
        Arc::new(AppState::new(
            config.clone(),
            Arc::new(MemoryStorage::new()),
            Arc::new(InMemoryUploadRepository::new()),
        ))
    }

    #[test]
    fn test_body_limit_overflow_is_a_config_error() {
        let config = config_with_max_bytes(usize::MAX);
        let err = setup_routes(&config, state(&config)).unwrap_err();
        assert!(err.to_string().contains("multipart overhead"));
    }

    #[test]
    fn test_default_limits_build_router() {
        let config = config_with_max_bytes(16 * 1024 * 1024);
        assert!(setup_routes(&config, state(&config)).is_ok());
    }
}
