use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use snapvault_core::models::UploadRecord;
use snapvault_core::UploadError;
use utoipa::ToSchema;

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use crate::utils::ip_extraction::ClientIpOpt;
use crate::utils::upload::read_file_field;

#[derive(Debug, Serialize, ToSchema)]
pub struct UploadResponse {
    pub message: String,
    pub record: UploadRecord,
    /// Whether the stored bytes were re-encoded to bound their size.
    pub optimized: bool,
}

/// Upload image handler
///
/// Reads the `file` multipart field and runs it through the upload pipeline.
/// Every rejection carries a stable `code`; validation failures are 4xx and
/// leave no trace, storage and persistence failures are 500.
#[utoipa::path(
    post,
    path = "/api/v1/upload",
    tag = "uploads",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Image accepted", body = UploadResponse),
        (status = 400, description = "Rejected by validation", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 500, description = "Storage or persistence failure", body = ErrorResponse)
    )
)]
#[tracing::instrument(
    skip_all,
    fields(client_ip = ?client_ip, operation = "upload_file")
)]
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    ClientIpOpt(client_ip): ClientIpOpt,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<UploadResponse>), HttpAppError> {
    let multipart = multipart.map_err(|e| {
        UploadError::NoFile(format!("No file part in the request: {}", e.body_text()))
    })?;

    let max_bytes = state.pipeline.config().max_bytes;
    let mut submission = read_file_field(multipart, max_bytes).await?;
    submission.source_address = client_ip;

    let receipt = state.pipeline.run(submission).await?;

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            message: "File uploaded successfully".to_string(),
            record: receipt.record,
            optimized: receipt.optimized,
        }),
    ))
}
