//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must implement.

use crate::StorageBackend;
use async_trait::async_trait;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// What a backend reports after durably storing an object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    /// Backend-assigned identifier, unique for the backend's lifetime.
    pub storage_key: String,
    /// Path or absolute URL clients fetch the bytes from.
    pub location: String,
    /// Size of the stored object as reported by the backend.
    pub size_bytes: u64,
}

/// Storage abstraction trait
///
/// The upload pipeline only ever sees this trait, so backends can be swapped by
/// configuration and replaced with in-memory fakes in tests.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Durably store `data` under a newly generated key.
    ///
    /// `filename` is the sanitized client filename; backends use it only to
    /// derive the extension of the generated key.
    async fn upload(
        &self,
        filename: &str,
        content_type: &str,
        data: Vec<u8>,
    ) -> StorageResult<StoredObject>;

    /// Check if an object exists. Also used as the connectivity probe.
    async fn exists(&self, storage_key: &str) -> StorageResult<bool>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
