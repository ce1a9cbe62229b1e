//! Types for the upload pipeline.

use snapvault_core::models::UploadRecord;
use std::fmt;

/// One file submitted for intake.
#[derive(Clone, Debug, Default)]
pub struct UploadSubmission {
    /// Client-declared filename; `None` when the request had no file part.
    pub filename: Option<String>,
    pub data: Vec<u8>,
    /// First forwarded-for entry or the peer address.
    pub source_address: Option<String>,
}

impl UploadSubmission {
    pub fn new(filename: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            filename: Some(filename.into()),
            data,
            ..Self::default()
        }
    }

    pub fn with_source_address(mut self, address: impl Into<String>) -> Self {
        self.source_address = Some(address.into());
        self
    }
}

/// Result of a successful pipeline run.
#[derive(Clone, Debug)]
pub struct UploadReceipt {
    pub record: UploadRecord,
    /// Size reported by the storage backend.
    pub stored_size: u64,
    pub width: u32,
    pub height: u32,
    /// Whether the stored bytes were re-encoded by the optimizer.
    pub optimized: bool,
}

/// Where a pipeline run stopped. Used in logs.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PipelineStage {
    Received,
    Validated,
    Optimized,
    Stored,
    Recorded,
}

impl fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineStage::Received => "received",
            PipelineStage::Validated => "validated",
            PipelineStage::Optimized => "optimized",
            PipelineStage::Stored => "stored",
            PipelineStage::Recorded => "recorded",
        };
        f.write_str(name)
    }
}
