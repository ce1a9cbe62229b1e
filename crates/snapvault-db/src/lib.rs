//! Snapvault database layer
//!
//! Repository trait for upload metadata and its PostgreSQL implementation.

pub mod db;

pub use db::{PostgresUploadRepository, UploadRepository, MIGRATOR};
