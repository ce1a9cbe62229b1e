//! Storage-size optimization for large uploads.
//!
//! Payloads above the configured threshold are flattened to RGB, shrunk to
//! fit the bounding box and re-encoded as JPEG. Smaller payloads are stored
//! exactly as received.

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView};
use snapvault_core::PipelineConfig;

#[derive(Debug, thiserror::Error)]
pub enum OptimizeError {
    #[error("Failed to encode optimized image: {0}")]
    Encode(#[from] image::ImageError),
}

/// Re-encoded payload
#[derive(Debug, Clone)]
pub struct OptimizedImage {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl OptimizedImage {
    pub const EXTENSION: &'static str = "jpg";
    pub const CONTENT_TYPE: &'static str = "image/jpeg";
}

#[derive(Debug, Clone, Copy)]
pub struct ImageOptimizer {
    threshold_bytes: usize,
    max_dimension: u32,
    quality: u8,
}

impl ImageOptimizer {
    pub fn new(threshold_bytes: usize, max_dimension: u32, quality: u8) -> Self {
        Self {
            threshold_bytes,
            max_dimension,
            quality: quality.clamp(1, 100),
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(
            config.optimize_threshold_bytes,
            config.optimize_max_dimension,
            config.optimize_quality,
        )
    }

    /// Only payloads strictly larger than the threshold are re-encoded.
    pub fn should_optimize(&self, original_size: usize) -> bool {
        original_size > self.threshold_bytes
    }

    /// Dimensions after fitting into the bounding box. Never upscales.
    pub fn target_dimensions(&self, width: u32, height: u32) -> (u32, u32) {
        let max = self.max_dimension;
        if width <= max && height <= max {
            return (width, height);
        }

        let ratio = f64::min(max as f64 / width as f64, max as f64 / height as f64);
        let w = ((width as f64 * ratio).round() as u32).clamp(1, max);
        let h = ((height as f64 * ratio).round() as u32).clamp(1, max);
        (w, h)
    }

    /// Flatten, downscale and re-encode. CPU-bound: call from a blocking context.
    ///
    /// Alpha and palette channels are dropped; transparency does not survive.
    pub fn optimize(&self, image: &DynamicImage) -> Result<OptimizedImage, OptimizeError> {
        let (width, height) = image.dimensions();
        let (target_w, target_h) = self.target_dimensions(width, height);

        let rgb = DynamicImage::ImageRgb8(image.to_rgb8());
        let rgb = if (target_w, target_h) != (width, height) {
            rgb.resize_exact(target_w, target_h, FilterType::Lanczos3)
        } else {
            rgb
        };

        let mut data = Vec::new();
        let encoder = JpegEncoder::new_with_quality(&mut data, self.quality);
        rgb.write_with_encoder(encoder)?;

        tracing::debug!(
            original_width = width,
            original_height = height,
            width = target_w,
            height = target_h,
            size_bytes = data.len(),
            quality = self.quality,
            "Image optimized"
        );

        Ok(OptimizedImage {
            data,
            width: target_w,
            height: target_h,
        })
    }
}
