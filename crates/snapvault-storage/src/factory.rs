#[cfg(feature = "storage-cloudinary")]
use crate::CloudinaryStorage;
#[cfg(feature = "storage-local")]
use crate::LocalStorage;
#[cfg(feature = "storage-s3")]
use crate::S3Storage;
use crate::{Storage, StorageBackend, StorageError, StorageResult};
use snapvault_core::Config;
use std::sync::Arc;

/// Create a storage backend based on configuration
pub async fn create_storage(config: &Config) -> StorageResult<Arc<dyn Storage>> {
    match config.storage_backend() {
        #[cfg(feature = "storage-local")]
        StorageBackend::Local => {
            let storage = LocalStorage::new(
                config.local_storage_path(),
                config.local_storage_base_url().to_string(),
            )
            .await?;
            Ok(Arc::new(storage))
        }

        #[cfg(not(feature = "storage-local"))]
        StorageBackend::Local => Err(StorageError::ConfigError(
            "Local storage backend not available (storage-local feature not enabled)".to_string(),
        )),

        #[cfg(feature = "storage-s3")]
        StorageBackend::S3 => {
            let bucket = config
                .s3_bucket()
                .map(String::from)
                .ok_or_else(|| StorageError::ConfigError("S3_BUCKET not configured".to_string()))?;
            let region = config
                .s3_region()
                .or_else(|| config.aws_region())
                .map(String::from)
                .ok_or_else(|| {
                    StorageError::ConfigError("S3_REGION or AWS_REGION not configured".to_string())
                })?;
            let endpoint = config.s3_endpoint().map(String::from);

            let storage = S3Storage::new(bucket, region, endpoint)?;
            Ok(Arc::new(storage))
        }

        #[cfg(not(feature = "storage-s3"))]
        StorageBackend::S3 => Err(StorageError::ConfigError(
            "S3 storage backend not available (storage-s3 feature not enabled)".to_string(),
        )),

        #[cfg(feature = "storage-cloudinary")]
        StorageBackend::Cloudinary => {
            let missing = |name: &str| StorageError::ConfigError(format!("{} not configured", name));
            let storage = CloudinaryStorage::new(
                config
                    .cloudinary_cloud_name()
                    .map(String::from)
                    .ok_or_else(|| missing("CLOUDINARY_CLOUD_NAME"))?,
                config
                    .cloudinary_api_key()
                    .map(String::from)
                    .ok_or_else(|| missing("CLOUDINARY_API_KEY"))?,
                config
                    .cloudinary_api_secret()
                    .map(String::from)
                    .ok_or_else(|| missing("CLOUDINARY_API_SECRET"))?,
                config.cloudinary_folder().map(String::from),
            )?;
            Ok(Arc::new(storage))
        }

        #[cfg(not(feature = "storage-cloudinary"))]
        StorageBackend::Cloudinary => Err(StorageError::ConfigError(
            "Cloudinary storage backend not available (storage-cloudinary feature not enabled)"
                .to_string(),
        )),
    }
}

#[cfg(all(test, feature = "storage-local"))]
mod tests {
    use super::*;
    use snapvault_core::UploadServiceConfig;
    use std::collections::HashMap;

    #[tokio::test]
    async fn test_local_backend_selected_by_default() {
        let dir = tempfile::tempdir().unwrap();
        let vars: HashMap<&str, String> = HashMap::from([
            ("DATABASE_URL", "postgresql://localhost/snapvault".to_string()),
            ("LOCAL_STORAGE_PATH", dir.path().display().to_string()),
        ]);
        let config = Config(Box::new(
            UploadServiceConfig::from_vars(|key| vars.get(key).cloned()).unwrap(),
        ));

        let storage = create_storage(&config).await.unwrap();
        assert_eq!(storage.backend_type(), StorageBackend::Local);
    }
}
