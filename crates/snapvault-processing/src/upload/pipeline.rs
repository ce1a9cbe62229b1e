//! Upload pipeline orchestrator.
//!
//! Drives one submission through validation, optional optimization, storage
//! and metadata persistence, strictly in that order. Each run is independent
//! and holds no lock across stages, so any number of runs may be in flight.
//!
//! A run either returns the persisted record or exactly one classified
//! [`UploadError`]. Validation failures happen before any side effect. A
//! persistence failure after a successful store leaves the stored object in
//! place; it is logged with its storage key so it can be reconciled.

use std::sync::Arc;

use snapvault_core::models::NewUpload;
use snapvault_core::{PipelineConfig, UploadError};
use snapvault_db::UploadRepository;
use snapvault_storage::Storage;

use super::filename::{sanitize_filename, with_extension};
use super::types::{PipelineStage, UploadReceipt, UploadSubmission};
use crate::optimizer::{ImageOptimizer, OptimizedImage};
use crate::validator::{DecodedImage, FileValidator};

/// Bytes handed to the storage backend.
struct Payload {
    data: Vec<u8>,
    filename: String,
    content_type: &'static str,
    optimized: bool,
}

#[derive(Clone)]
pub struct UploadPipeline {
    validator: Arc<FileValidator>,
    optimizer: ImageOptimizer,
    storage: Arc<dyn Storage>,
    repository: Arc<dyn UploadRepository>,
}

impl UploadPipeline {
    pub fn new(
        config: PipelineConfig,
        storage: Arc<dyn Storage>,
        repository: Arc<dyn UploadRepository>,
    ) -> Self {
        Self {
            optimizer: ImageOptimizer::from_config(&config),
            validator: Arc::new(FileValidator::new(config)),
            storage,
            repository,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        self.validator.config()
    }

    #[tracing::instrument(
        skip_all,
        fields(
            filename = submission.filename.as_deref().unwrap_or(""),
            size_bytes = submission.data.len(),
        )
    )]
    pub async fn run(&self, submission: UploadSubmission) -> Result<UploadReceipt, UploadError> {
        let UploadSubmission {
            filename,
            data,
            source_address,
        } = submission;

        let extension = self
            .validator
            .validate_metadata(filename.as_deref(), data.len())
            .inspect_err(|e| log_rejection(PipelineStage::Received, e))?;
        let original_name = sanitize_filename(filename.as_deref().unwrap_or_default());

        let (data, decoded) = self
            .decode(data)
            .await
            .inspect_err(|e| log_rejection(PipelineStage::Received, e))?;
        let (width, height) = (decoded.width, decoded.height);

        let payload = self.prepare(decoded, data, &original_name, &extension).await;

        let stored = self
            .storage
            .upload(&payload.filename, payload.content_type, payload.data)
            .await
            .map_err(|e| {
                tracing::error!(
                    stage = %PipelineStage::Optimized,
                    backend = %self.storage.backend_type(),
                    error = %e,
                    "Storage upload failed"
                );
                UploadError::Storage(e.to_string())
            })?;

        let new_upload = NewUpload {
            storage_key: stored.storage_key.clone(),
            original_name,
            location: stored.location.clone(),
            byte_size: i64::try_from(stored.size_bytes).unwrap_or(i64::MAX),
            width: i32::try_from(width).ok(),
            height: i32::try_from(height).ok(),
            source_address,
        };

        let record = self.repository.insert(new_upload).await.map_err(|e| {
            tracing::error!(
                stage = %PipelineStage::Stored,
                storage_key = %stored.storage_key,
                location = %stored.location,
                error = %e,
                "Failed to record upload; stored object is orphaned"
            );
            UploadError::Persistence(e.to_string())
        })?;

        tracing::info!(
            stage = %PipelineStage::Recorded,
            upload_id = record.id,
            storage_key = %record.storage_key,
            stored_bytes = stored.size_bytes,
            width,
            height,
            optimized = payload.optimized,
            "Upload accepted"
        );

        Ok(UploadReceipt {
            record,
            stored_size: stored.size_bytes,
            width,
            height,
            optimized: payload.optimized,
        })
    }

    /// Decode off the async runtime. The bytes are handed back for storage.
    async fn decode(&self, data: Vec<u8>) -> Result<(Vec<u8>, DecodedImage), UploadError> {
        let validator = Arc::clone(&self.validator);
        let (data, decoded) = tokio::task::spawn_blocking(move || {
            let decoded = validator.decode(&data);
            (data, decoded)
        })
        .await
        .map_err(|e| UploadError::InvalidImage(format!("Image decoding aborted: {}", e)))?;

        Ok((data, decoded?))
    }

    /// Pick the bytes to store. Optimization failures fall back to the original
    /// payload and are never surfaced to the caller.
    async fn prepare(
        &self,
        decoded: DecodedImage,
        original: Vec<u8>,
        original_name: &str,
        extension: &str,
    ) -> Payload {
        let DecodedImage { image, format, .. } = decoded;
        // Stored keys follow the detected format, not the declared name
        let detected_extension = format.extensions_str().first().copied().unwrap_or(extension);
        let passthrough = |data: Vec<u8>| Payload {
            data,
            filename: with_extension(original_name, detected_extension),
            content_type: format.to_mime_type(),
            optimized: false,
        };

        if !self.optimizer.should_optimize(original.len()) {
            return passthrough(original);
        }

        let optimizer = self.optimizer;
        let result = tokio::task::spawn_blocking(move || optimizer.optimize(&image)).await;

        match result {
            Ok(Ok(optimized)) => {
                tracing::debug!(
                    stage = %PipelineStage::Validated,
                    original_bytes = original.len(),
                    optimized_bytes = optimized.data.len(),
                    "Payload optimized"
                );
                Payload {
                    data: optimized.data,
                    filename: with_extension(original_name, OptimizedImage::EXTENSION),
                    content_type: OptimizedImage::CONTENT_TYPE,
                    optimized: true,
                }
            }
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "Optimization failed, storing original bytes");
                passthrough(original)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Optimization task aborted, storing original bytes");
                passthrough(original)
            }
        }
    }
}

fn log_rejection(stage: PipelineStage, error: &UploadError) {
    tracing::debug!(
        stage = %stage,
        code = error.kind().code(),
        error = %error,
        "Upload rejected"
    );
}
