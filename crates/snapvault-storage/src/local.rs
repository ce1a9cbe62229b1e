use crate::keys::generate_object_name;
use crate::traits::{Storage, StorageError, StorageResult, StoredObject};
use crate::StorageBackend;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Files in one directory on local disk, served back under `base_url`.
#[derive(Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
}

impl LocalStorage {
    /// Creates `base_path` (and its parents) when missing.
    pub async fn new(base_path: impl Into<PathBuf>, base_url: String) -> StorageResult<Self> {
        let base_path = base_path.into();
        if let Err(e) = fs::create_dir_all(&base_path).await {
            return Err(StorageError::ConfigError(format!(
                "Cannot create upload directory {}: {}",
                base_path.display(),
                e
            )));
        }

        Ok(Self {
            base_path,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Resolve a key inside the base directory. Keys that could escape it are rejected.
    fn resolve(&self, storage_key: &str) -> StorageResult<PathBuf> {
        let escapes = storage_key.is_empty()
            || storage_key.starts_with('/')
            || storage_key.contains("..")
            || storage_key.contains('\\');
        if escapes {
            return Err(StorageError::InvalidKey(format!(
                "'{}' is not a valid local storage key",
                storage_key
            )));
        }
        Ok(self.base_path.join(storage_key))
    }
}

/// Write to a file that must not exist yet, then fsync it.
async fn write_new_file(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let mut file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await?;
    file.write_all(data).await?;
    file.sync_all().await
}

#[async_trait]
impl Storage for LocalStorage {
    async fn upload(
        &self,
        filename: &str,
        _content_type: &str,
        data: Vec<u8>,
    ) -> StorageResult<StoredObject> {
        let key = generate_object_name(filename);
        let path = self.resolve(&key)?;
        let size_bytes = data.len() as u64;
        let started = std::time::Instant::now();

        write_new_file(&path, &data).await.map_err(|e| {
            StorageError::UploadFailed(format!("Cannot write {}: {}", path.display(), e))
        })?;

        tracing::info!(
            key = %key,
            path = %path.display(),
            size_bytes,
            duration_ms = started.elapsed().as_secs_f64() * 1000.0,
            "Stored upload on local disk"
        );

        Ok(StoredObject {
            location: format!("{}/{}", self.base_url, key),
            storage_key: key,
            size_bytes,
        })
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        let path = self.resolve(storage_key)?;
        Ok(fs::try_exists(&path).await?)
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}
