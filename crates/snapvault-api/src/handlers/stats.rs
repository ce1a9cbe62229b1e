use std::sync::Arc;

use axum::{extract::State, Json};
use chrono::Utc;
use snapvault_core::models::UploadStats;
use snapvault_db::db::start_of_day_utc;

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/v1/stats",
    tag = "uploads",
    responses(
        (status = 200, description = "Aggregate upload statistics", body = UploadStats),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state), fields(operation = "upload_stats"))]
pub async fn upload_stats(
    State(state): State<Arc<AppState>>,
) -> Result<Json<UploadStats>, HttpAppError> {
    let stats = state
        .repository
        .stats(start_of_day_utc(Utc::now()))
        .await?;
    Ok(Json(stats))
}
