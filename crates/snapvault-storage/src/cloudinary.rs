//! Cloudinary upload API backend.
//!
//! Uploads are signed requests against `/v1_1/{cloud}/image/upload`. The
//! service assigns the public id and the delivery URL, and applies the
//! automatic quality/format transformation on its side.

use crate::keys::key_extension;
use crate::traits::{Storage, StorageError, StorageResult, StoredObject};
use crate::StorageBackend;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::time::Duration;
use uuid::Uuid;

const DEFAULT_API_BASE: &str = "https://api.cloudinary.com/v1_1";
const AUTO_TRANSFORMATION: &str = "q_auto,f_auto";

/// Cloudinary storage implementation
#[derive(Clone)]
pub struct CloudinaryStorage {
    client: Client,
    api_base: String,
    cloud_name: String,
    api_key: String,
    api_secret: String,
    folder: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    public_id: String,
    secure_url: String,
    bytes: u64,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl CloudinaryStorage {
    pub fn new(
        cloud_name: String,
        api_key: String,
        api_secret: String,
        folder: Option<String>,
    ) -> StorageResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| StorageError::ConfigError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(CloudinaryStorage {
            client,
            api_base: DEFAULT_API_BASE.to_string(),
            cloud_name,
            api_key,
            api_secret,
            folder: folder.map(|f| f.trim_matches('/').to_string()).filter(|f| !f.is_empty()),
        })
    }

    /// Point the client at a different API host (used against local fakes).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}/{}", self.api_base, self.cloud_name, path)
    }

    /// Parameters that take part in the signature, sorted by name.
    fn signed_params(&self, public_id: &str, timestamp: i64) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("public_id", public_id.to_string()),
            ("timestamp", timestamp.to_string()),
            ("transformation", AUTO_TRANSFORMATION.to_string()),
        ];
        if let Some(folder) = &self.folder {
            params.push(("folder", folder.clone()));
        }
        params.sort_by(|a, b| a.0.cmp(b.0));
        params
    }

    fn read_error(status: StatusCode, body: &str) -> String {
        match serde_json::from_str::<ErrorResponse>(body) {
            Ok(parsed) => format!("{}: {}", status, parsed.error.message),
            Err(_) => format!("{}: {}", status, body.chars().take(200).collect::<String>()),
        }
    }
}

/// SHA-256 hex digest of `k1=v1&k2=v2...` followed by the API secret.
fn sign(params: &[(&str, String)], api_secret: &str) -> String {
    let to_sign = params
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(to_sign.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}

#[async_trait]
impl Storage for CloudinaryStorage {
    async fn upload(
        &self,
        filename: &str,
        content_type: &str,
        data: Vec<u8>,
    ) -> StorageResult<StoredObject> {
        let public_id = Uuid::new_v4().simple().to_string();
        let timestamp = chrono::Utc::now().timestamp();
        let params = self.signed_params(&public_id, timestamp);
        let signature = sign(&params, &self.api_secret);
        let size = data.len();

        let file_part = reqwest::multipart::Part::bytes(data)
            .file_name(format!("{}.{}", public_id, key_extension(filename)))
            .mime_str(content_type)
            .map_err(|e| StorageError::UploadFailed(format!("Invalid content type: {}", e)))?;

        let mut form = reqwest::multipart::Form::new()
            .part("file", file_part)
            .text("api_key", self.api_key.clone())
            .text("signature", signature)
            .text("signature_algorithm", "sha256");
        for (name, value) in params {
            form = form.text(name, value);
        }

        let start = std::time::Instant::now();

        let response = self
            .client
            .post(self.endpoint("image/upload"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| StorageError::UploadFailed(format!("Failed to send request: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| StorageError::UploadFailed(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            let message = Self::read_error(status, &body);
            tracing::error!(
                cloud = %self.cloud_name,
                size_bytes = size,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                error = %message,
                "Cloudinary upload failed"
            );
            return Err(StorageError::UploadFailed(message));
        }

        let uploaded: UploadResponse = serde_json::from_str(&body).map_err(|e| {
            StorageError::BackendError(format!("Unexpected upload response: {}", e))
        })?;

        tracing::info!(
            cloud = %self.cloud_name,
            public_id = %uploaded.public_id,
            size_bytes = uploaded.bytes,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Cloudinary upload successful"
        );

        Ok(StoredObject {
            storage_key: uploaded.public_id,
            location: uploaded.secure_url,
            size_bytes: uploaded.bytes,
        })
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        let url = self.endpoint(&format!("resources/image/upload/{}", storage_key));

        let response = self
            .client
            .get(url)
            .basic_auth(&self.api_key, Some(&self.api_secret))
            .send()
            .await
            .map_err(|e| StorageError::BackendError(e.to_string()))?;

        match response.status() {
            s if s.is_success() => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            s => {
                let body = response.text().await.unwrap_or_default();
                Err(StorageError::BackendError(Self::read_error(s, &body)))
            }
        }
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Cloudinary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage(folder: Option<&str>) -> CloudinaryStorage {
        CloudinaryStorage::new(
            "demo".to_string(),
            "1234".to_string(),
            "abcd".to_string(),
            folder.map(String::from),
        )
        .unwrap()
    }

    #[test]
    fn test_signed_params_are_sorted() {
        let params = storage(Some("/gallery/")).signed_params("abc", 1_700_000_000);
        let names: Vec<&str> = params.iter().map(|(k, _)| *k).collect();
        assert_eq!(names, vec!["folder", "public_id", "timestamp", "transformation"]);
        assert_eq!(params[0].1, "gallery");
    }

    #[test]
    fn test_signature_is_sha256_of_params_and_secret() {
        let params = vec![
            ("public_id", "abc".to_string()),
            ("timestamp", "1700000000".to_string()),
        ];
        let expected = {
            let mut hasher = Sha256::new();
            hasher.update(b"public_id=abc&timestamp=1700000000abcd");
            hex::encode(hasher.finalize())
        };
        assert_eq!(sign(&params, "abcd"), expected);
        assert_eq!(sign(&params, "abcd").len(), 64);
    }

    #[test]
    fn test_endpoint_uses_cloud_name() {
        let s = storage(None).with_api_base("http://127.0.0.1:9999/v1_1/");
        assert_eq!(
            s.endpoint("image/upload"),
            "http://127.0.0.1:9999/v1_1/demo/image/upload"
        );
    }

    #[test]
    fn test_error_message_extracted_from_body() {
        let msg = CloudinaryStorage::read_error(
            StatusCode::UNAUTHORIZED,
            r#"{"error":{"message":"Invalid Signature"}}"#,
        );
        assert!(msg.contains("Invalid Signature"));
    }

    #[test]
    fn test_upload_response_shape() {
        let parsed: UploadResponse = serde_json::from_str(
            r#"{"public_id":"gallery/abc","secure_url":"https://res.cloudinary.com/demo/image/upload/gallery/abc.jpg","bytes":5120,"width":10,"height":10}"#,
        )
        .unwrap();
        assert_eq!(parsed.public_id, "gallery/abc");
        assert_eq!(parsed.bytes, 5120);
    }
}
