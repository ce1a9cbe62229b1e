//! Test helpers for pipeline and HTTP tests
//!
//! In-memory storage and repository doubles plus generated image fixtures.
//! No database or network is needed.

pub mod fixtures;
pub mod mock_repositories;
pub mod mock_storage;

pub use fixtures::*;
pub use mock_repositories::{sample_upload, FailingUploadRepository, InMemoryUploadRepository};
pub use mock_storage::{FailingStorage, MemoryStorage};
