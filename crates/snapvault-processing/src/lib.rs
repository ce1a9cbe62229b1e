//! Snapvault processing library
//!
//! The upload intake pipeline: file validation, image optimization and the
//! orchestrator that drives a submission through storage and the metadata
//! repository.

pub mod optimizer;
pub mod upload;
pub mod validator;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

pub use optimizer::{ImageOptimizer, OptimizeError, OptimizedImage};
pub use upload::{sanitize_filename, UploadPipeline, UploadReceipt, UploadSubmission};
pub use validator::{DecodedImage, FileValidator};
