//! In-memory storage doubles.

use async_trait::async_trait;
use snapvault_core::StorageBackend;
use snapvault_storage::{generate_object_name, Storage, StorageError, StorageResult, StoredObject};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Storage that keeps objects in a map. Reports itself as the local backend.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    objects: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    upload_calls: Arc<AtomicUsize>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, storage_key: &str) -> Option<Vec<u8>> {
        self.objects.lock().unwrap().get(storage_key).cloned()
    }

    pub fn len(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn upload_calls(&self) -> usize {
        self.upload_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn upload(
        &self,
        filename: &str,
        _content_type: &str,
        data: Vec<u8>,
    ) -> StorageResult<StoredObject> {
        self.upload_calls.fetch_add(1, Ordering::SeqCst);

        let storage_key = generate_object_name(filename);
        let size_bytes = data.len() as u64;
        self.objects
            .lock()
            .unwrap()
            .insert(storage_key.clone(), data);

        Ok(StoredObject {
            location: format!("/uploads/files/{}", storage_key),
            storage_key,
            size_bytes,
        })
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        Ok(self.objects.lock().unwrap().contains_key(storage_key))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}

/// Storage whose every call fails, as an unreachable backend would.
#[derive(Clone, Default)]
pub struct FailingStorage {
    upload_calls: Arc<AtomicUsize>,
}

impl FailingStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upload_calls(&self) -> usize {
        self.upload_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Storage for FailingStorage {
    async fn upload(
        &self,
        _filename: &str,
        _content_type: &str,
        _data: Vec<u8>,
    ) -> StorageResult<StoredObject> {
        self.upload_calls.fetch_add(1, Ordering::SeqCst);
        Err(StorageError::BackendError("backend unreachable".to_string()))
    }

    async fn exists(&self, _storage_key: &str) -> StorageResult<bool> {
        Err(StorageError::BackendError("backend unreachable".to_string()))
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}
