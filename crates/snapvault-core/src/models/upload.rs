use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[cfg(feature = "sqlx")]
use sqlx::FromRow;

/// One accepted upload. Written once at the end of a successful pipeline run
/// and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[cfg_attr(feature = "sqlx", derive(FromRow))]
pub struct UploadRecord {
    pub id: i64,
    /// Backend-assigned identifier, unique per backend.
    pub storage_key: String,
    /// Sanitized client-declared filename.
    pub original_name: String,
    /// Relative path (local backend) or absolute URL (remote backends).
    pub location: String,
    /// Size of the bytes actually persisted.
    pub byte_size: i64,
    pub width: Option<i32>,
    pub height: Option<i32>,
    /// Best-effort client address, diagnostics only. Never rendered.
    #[serde(skip_serializing, default)]
    pub source_address: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl UploadRecord {
    /// Lowercase suffix of the original filename, or `""` when there is none.
    pub fn extension(&self) -> String {
        extension_of(&self.original_name)
    }
}

/// Lowercase suffix after the last `.`, or `""` when the name has none.
pub fn extension_of(filename: &str) -> String {
    match filename.rsplit_once('.') {
        Some((_, ext)) => ext.to_ascii_lowercase(),
        None => String::new(),
    }
}

/// Values the pipeline hands to the repository; `id` and `created_at` are
/// assigned on insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUpload {
    pub storage_key: String,
    pub original_name: String,
    pub location: String,
    pub byte_size: i64,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub source_address: Option<String>,
}

/// One page of the newest-first listing.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UploadPage {
    pub items: Vec<UploadRecord>,
    pub total: i64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
}

impl UploadPage {
    pub fn new(items: Vec<UploadRecord>, total: i64, page: u32, page_size: u32) -> Self {
        let total_pages = if total <= 0 || page_size == 0 {
            0
        } else {
            ((total as u64).div_ceil(page_size as u64)).min(u32::MAX as u64) as u32
        };
        Self {
            items,
            total,
            page,
            page_size,
            total_pages,
        }
    }
}
