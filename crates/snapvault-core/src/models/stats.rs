use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Upload count for one original-file extension.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ExtensionCount {
    pub extension: String,
    pub count: i64,
}

/// Aggregate read-only view over all upload records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct UploadStats {
    pub total_uploads: i64,
    pub total_bytes: i64,
    /// Records created since 00:00 UTC today.
    pub uploads_today: i64,
    /// Sorted by count descending, then extension.
    pub by_extension: Vec<ExtensionCount>,
}
