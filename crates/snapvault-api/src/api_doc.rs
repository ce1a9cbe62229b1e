//! OpenAPI documentation, served at `/api/openapi.json` and browsable at `/docs`.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use crate::setup::routes::health;
use snapvault_core::models;
use snapvault_core::UploadFailureKind;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Snapvault API",
        version = "0.1.0",
        description = "Image upload intake: validation, optional optimization, storage and metadata listing."
    ),
    paths(
        handlers::upload::upload_file,
        handlers::uploads::list_uploads,
        handlers::uploads::get_upload,
        handlers::stats::upload_stats,
        health::health_check,
    ),
    components(schemas(
        error::ErrorResponse,
        handlers::upload::UploadResponse,
        models::UploadRecord,
        models::UploadPage,
        models::UploadStats,
        models::ExtensionCount,
        models::HealthReport,
        models::HealthStatus,
        UploadFailureKind,
    )),
    tags(
        (name = "uploads", description = "Upload intake and listing"),
        (name = "health", description = "Service health")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_upload_paths() {
        let doc = ApiDoc::openapi();
        for path in ["/api/v1/upload", "/api/v1/uploads", "/api/v1/uploads/{id}", "/api/v1/stats", "/health"] {
            assert!(doc.paths.paths.contains_key(path), "{}", path);
        }
    }
}
