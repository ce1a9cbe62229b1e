//! Upload intake: validate → optimize → store → record.

mod filename;
pub mod pipeline;
pub mod types;

pub use filename::sanitize_filename;
pub use pipeline::UploadPipeline;
pub use types::{UploadReceipt, UploadSubmission};
