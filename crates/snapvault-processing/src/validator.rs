//! Submission validation.
//!
//! Checks run cheapest first: presence, extension and size only look at the
//! declared filename and byte length, so obviously-invalid submissions are
//! rejected before any decoding work happens.

use image::{DynamicImage, ImageFormat, ImageReader};
use snapvault_core::{PipelineConfig, UploadError};
use std::io::Cursor;

/// A payload that passed every validation step.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    pub image: DynamicImage,
    pub format: ImageFormat,
    pub width: u32,
    pub height: u32,
}

/// Upload file validator
#[derive(Debug, Clone)]
pub struct FileValidator {
    config: PipelineConfig,
}

impl FileValidator {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Presence check. Returns the trimmed declared filename.
    pub fn validate_presence<'a>(&self, filename: Option<&'a str>) -> Result<&'a str, UploadError> {
        match filename.map(str::trim) {
            Some(name) if !name.is_empty() => Ok(name),
            Some(_) => Err(UploadError::NoFile("No selected file".to_string())),
            None => Err(UploadError::NoFile("No file part in the request".to_string())),
        }
    }

    /// Extension check. Returns the lowercase extension.
    pub fn validate_extension(&self, filename: &str) -> Result<String, UploadError> {
        let extension = filename
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();

        if extension.is_empty() || !self.config.is_extension_allowed(&extension) {
            return Err(UploadError::UnsupportedType {
                extension,
                allowed: self.config.sorted_extensions(),
            });
        }

        Ok(extension)
    }

    /// Size bounds, both inclusive.
    pub fn validate_size(&self, size: usize) -> Result<(), UploadError> {
        if size < self.config.min_bytes {
            return Err(UploadError::FileTooSmall {
                size,
                min: self.config.min_bytes,
            });
        }

        if size > self.config.max_bytes {
            return Err(UploadError::FileTooLarge {
                max: self.config.max_bytes,
            });
        }

        Ok(())
    }

    /// Presence, extension and size checks. Returns the lowercase extension.
    pub fn validate_metadata(
        &self,
        filename: Option<&str>,
        size: usize,
    ) -> Result<String, UploadError> {
        let filename = self.validate_presence(filename)?;
        let extension = self.validate_extension(filename)?;
        self.validate_size(size)?;
        Ok(extension)
    }

    /// Decode the payload and enforce the dimension bound.
    ///
    /// Dimensions are read from the image header first so oversized images are
    /// rejected before their pixel buffer is allocated. CPU-bound: call from a
    /// blocking context.
    pub fn decode(&self, data: &[u8]) -> Result<DecodedImage, UploadError> {
        let reader = ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .map_err(|e| UploadError::InvalidImage(e.to_string()))?;

        let format = reader
            .format()
            .ok_or_else(|| UploadError::InvalidImage("Unrecognized image format".to_string()))?;

        let (width, height) = reader
            .into_dimensions()
            .map_err(|e| UploadError::InvalidImage(e.to_string()))?;

        self.validate_dimensions(width, height)?;

        let image = image::load_from_memory_with_format(data, format)
            .map_err(|e| UploadError::InvalidImage(e.to_string()))?;

        Ok(DecodedImage {
            width: image.width(),
            height: image.height(),
            image,
            format,
        })
    }

    pub fn validate_dimensions(&self, width: u32, height: u32) -> Result<(), UploadError> {
        let max = self.config.max_dimension;
        if width > max || height > max {
            return Err(UploadError::ImageTooLarge { width, height, max });
        }
        Ok(())
    }

    /// Run every check in order.
    pub fn validate(
        &self,
        filename: Option<&str>,
        data: &[u8],
    ) -> Result<(String, DecodedImage), UploadError> {
        let extension = self.validate_metadata(filename, data.len())?;
        let decoded = self.decode(data)?;
        Ok((extension, decoded))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::fixtures::noise_png;
    use snapvault_core::UploadFailureKind;

    fn validator() -> FileValidator {
        FileValidator::new(PipelineConfig::default())
    }

    fn kind<T>(result: Result<T, UploadError>) -> UploadFailureKind {
        match result {
            Ok(_) => panic!("expected rejection"),
            Err(e) => e.kind(),
        }
    }

    #[test]
    fn test_missing_or_empty_filename_is_no_file() {
        let v = validator();
        assert_eq!(kind(v.validate(None, &[0; 500])), UploadFailureKind::NoFile);
        assert_eq!(kind(v.validate(Some(""), &[0; 500])), UploadFailureKind::NoFile);
        assert_eq!(kind(v.validate(Some("   "), &[0; 500])), UploadFailureKind::NoFile);
    }

    #[test]
    fn test_extension_match_is_case_insensitive() {
        let v = validator();
        assert_eq!(v.validate_extension("IMG.PNG").unwrap(), "png");
        assert_eq!(v.validate_extension("photo.JpEg").unwrap(), "jpeg");
    }

    #[test]
    fn test_unsupported_extensions() {
        let v = validator();
        for name in ["notes.txt", "png", "archive.", "image.png.exe", "photo.tiff"] {
            assert_eq!(
                kind(v.validate_extension(name)),
                UploadFailureKind::UnsupportedType,
                "{}",
                name
            );
        }
    }

    #[test]
    fn test_extension_checked_before_size() {
        let v = validator();
        assert_eq!(
            kind(v.validate(Some("tiny.txt"), &[0; 3])),
            UploadFailureKind::UnsupportedType
        );
    }

    #[test]
    fn test_size_bounds_are_inclusive() {
        let v = validator();
        let max = 16 * 1024 * 1024;

        assert_eq!(kind(v.validate_size(99)), UploadFailureKind::FileTooSmall);
        assert!(v.validate_size(100).is_ok());
        assert!(v.validate_size(max).is_ok());
        assert_eq!(kind(v.validate_size(max + 1)), UploadFailureKind::FileTooLarge);
    }

    #[test]
    fn test_boundary_sizes_reach_decoding() {
        let v = validator();
        // Garbage at exactly the bounds passes the size check and fails to decode
        assert_eq!(
            kind(v.validate(Some("a.png"), &vec![7u8; 100])),
            UploadFailureKind::InvalidImage
        );
        assert_eq!(
            kind(v.validate(Some("a.png"), &vec![7u8; 16 * 1024 * 1024])),
            UploadFailureKind::InvalidImage
        );
    }

    #[test]
    fn test_truncated_image_is_invalid() {
        let v = validator();
        let png = noise_png(64, 64);
        let truncated = &png[..png.len() / 2];
        let err = v.validate(Some("cut.png"), truncated).unwrap_err();
        assert_eq!(err.kind(), UploadFailureKind::InvalidImage);
    }

    #[test]
    fn test_valid_png_decodes_with_dimensions() {
        let v = validator();
        let png = noise_png(120, 80);
        let (extension, decoded) = v.validate(Some("ok.png"), &png).unwrap();
        assert_eq!(extension, "png");
        assert_eq!((decoded.width, decoded.height), (120, 80));
        assert_eq!(decoded.format, ImageFormat::Png);
    }

    #[test]
    fn test_content_sniffed_not_extension() {
        // PNG bytes declared as .jpg still decode; the extension is only an allow-list check
        let v = validator();
        let png = noise_png(20, 20);
        let (extension, decoded) = v.validate(Some("actually_png.jpg"), &png).unwrap();
        assert_eq!(extension, "jpg");
        assert_eq!(decoded.format, ImageFormat::Png);
    }

    #[test]
    fn test_dimension_limit_is_inclusive() {
        let v = FileValidator::new(PipelineConfig {
            max_dimension: 64,
            ..PipelineConfig::default()
        });

        assert!(v.validate(Some("edge.png"), &noise_png(64, 64)).is_ok());

        let err = v.validate(Some("wide.png"), &noise_png(65, 10)).unwrap_err();
        assert_eq!(
            err,
            UploadError::ImageTooLarge {
                width: 65,
                height: 10,
                max: 64
            }
        );

        let err = v.validate(Some("tall.png"), &noise_png(10, 65)).unwrap_err();
        assert_eq!(err.kind(), UploadFailureKind::ImageTooLarge);
    }

    #[test]
    fn test_canonical_dimension_bound() {
        let v = validator();
        assert!(v.validate_dimensions(8000, 8000).is_ok());
        assert!(v.validate_dimensions(8001, 1).is_err());
        assert!(v.validate_dimensions(1, 8001).is_err());
    }
}
