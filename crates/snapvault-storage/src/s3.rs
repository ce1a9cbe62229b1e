use crate::keys::generate_object_name;
use crate::traits::{Storage, StorageError, StorageResult, StoredObject};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path;
use object_store::{
    Attribute, AttributeValue, Attributes, Error as ObjectStoreError, ObjectStore,
    ObjectStoreExt, PutOptions, PutPayload,
};

const KEY_PREFIX: &str = "uploads";

/// Objects in one bucket of AWS S3 or an S3-compatible provider.
#[derive(Clone)]
pub struct S3Storage {
    store: AmazonS3,
    bucket: String,
    region: String,
    /// Set for S3-compatible providers such as MinIO.
    endpoint_url: Option<String>,
}

impl S3Storage {
    /// Credentials are read from the standard AWS environment variables.
    /// A plain `http://` endpoint is allowed for local providers.
    pub fn new(bucket: String, region: String, endpoint_url: Option<String>) -> StorageResult<Self> {
        let builder = AmazonS3Builder::from_env()
            .with_bucket_name(&bucket)
            .with_region(&region);

        let builder = match endpoint_url.as_deref() {
            Some(endpoint) => builder
                .with_endpoint(endpoint)
                .with_allow_http(endpoint.starts_with("http://")),
            None => builder,
        };

        let store = builder.build().map_err(|e| {
            StorageError::ConfigError(format!("Invalid S3 configuration for bucket {}: {}", bucket, e))
        })?;

        Ok(S3Storage {
            store,
            bucket,
            region,
            endpoint_url,
        })
    }

    fn generate_key(filename: &str) -> String {
        format!("{}/{}", KEY_PREFIX, generate_object_name(filename))
    }

    /// Public URL for an object.
    ///
    /// AWS gets the virtual-hosted form; custom endpoints get path-style
    /// `{endpoint}/{bucket}/{key}`, which every S3-compatible provider accepts.
    fn generate_url(&self, key: &str) -> String {
        public_url(&self.bucket, &self.region, self.endpoint_url.as_deref(), key)
    }
}

fn public_url(bucket: &str, region: &str, endpoint_url: Option<&str>, key: &str) -> String {
    match endpoint_url {
        Some(endpoint) => format!("{}/{}/{}", endpoint.trim_end_matches('/'), bucket, key),
        None => format!("https://{}.s3.{}.amazonaws.com/{}", bucket, region, key),
    }
}

#[async_trait]
impl Storage for S3Storage {
    async fn upload(
        &self,
        filename: &str,
        content_type: &str,
        data: Vec<u8>,
    ) -> StorageResult<StoredObject> {
        let key = Self::generate_key(filename);
        let size_bytes = data.len() as u64;
        let started = std::time::Instant::now();

        // Served with the right type straight from the public URL
        let options = PutOptions {
            attributes: Attributes::from_iter([(
                Attribute::ContentType,
                AttributeValue::from(content_type.to_string()),
            )]),
            ..PutOptions::default()
        };

        if let Err(e) = self
            .store
            .put_opts(
                &Path::from(key.as_str()),
                PutPayload::from(Bytes::from(data)),
                options,
            )
            .await
        {
            tracing::error!(
                bucket = %self.bucket,
                key = %key,
                size_bytes,
                duration_ms = started.elapsed().as_secs_f64() * 1000.0,
                error = %e,
                "S3 put failed"
            );
            return Err(StorageError::UploadFailed(e.to_string()));
        }

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            content_type,
            size_bytes,
            duration_ms = started.elapsed().as_secs_f64() * 1000.0,
            "Stored object in S3"
        );

        Ok(StoredObject {
            location: self.generate_url(&key),
            storage_key: key,
            size_bytes,
        })
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        match self.store.head(&Path::from(storage_key)).await {
            Ok(_) => Ok(true),
            Err(ObjectStoreError::NotFound { .. }) => Ok(false),
            Err(e) => Err(StorageError::BackendError(e.to_string())),
        }
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aws_url_is_virtual_hosted() {
        assert_eq!(
            public_url("images", "eu-west-1", None, "uploads/abc.png"),
            "https://images.s3.eu-west-1.amazonaws.com/uploads/abc.png"
        );
    }

    #[test]
    fn test_custom_endpoint_url_is_path_style() {
        assert_eq!(
            public_url(
                "images",
                "us-east-1",
                Some("http://localhost:9000/"),
                "uploads/abc.png"
            ),
            "http://localhost:9000/images/uploads/abc.png"
        );
    }

    #[test]
    fn test_keys_are_prefixed() {
        let key = S3Storage::generate_key("cat.webp");
        assert!(key.starts_with("uploads/"));
        assert!(key.ends_with(".webp"));
    }
}
