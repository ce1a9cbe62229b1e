//! Snapvault Core Library
//!
//! This crate provides the domain models, error types and configuration
//! shared by every Snapvault component.

pub mod config;
pub mod error;
pub mod models;
pub mod storage_types;

// Re-export commonly used types
pub use config::{BaseConfig, Config, PipelineConfig, UploadServiceConfig};
pub use error::{AppError, ErrorMetadata, LogLevel, UploadError, UploadFailureKind};
pub use storage_types::StorageBackend;
