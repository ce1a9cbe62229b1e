//! Snapvault Storage Library
//!
//! This crate provides the storage abstraction the upload pipeline writes through,
//! plus its backends: local filesystem, S3-compatible object stores and the
//! Cloudinary upload API.
//!
//! # Storage key format
//!
//! Local and S3 keys are generated here from a random 128-bit token and the
//! file extension (`{token}.{ext}`, prefixed with `uploads/` on S3). Cloudinary
//! assigns its own public id, which becomes the key. Keys never contain `..`
//! or a leading `/`.

#[cfg(feature = "storage-cloudinary")]
pub mod cloudinary;
pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
#[cfg(feature = "storage-cloudinary")]
pub use cloudinary::CloudinaryStorage;
pub use factory::create_storage;
pub use keys::generate_object_name;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use snapvault_core::StorageBackend;
pub use traits::{Storage, StorageError, StorageResult, StoredObject};
