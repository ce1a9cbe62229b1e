//! In-memory repository doubles.
//!
//! These mirror the Postgres repository's ordering and aggregation so handler
//! tests can run without a database.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use snapvault_core::models::{
    extension_of, ExtensionCount, NewUpload, UploadRecord, UploadStats,
};
use snapvault_core::AppError;
use snapvault_db::UploadRepository;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Clone, Default)]
pub struct InMemoryUploadRepository {
    records: Arc<Mutex<Vec<UploadRecord>>>,
    insert_calls: Arc<AtomicUsize>,
}

impl InMemoryUploadRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert with an explicit creation time.
    pub fn insert_at(&self, upload: NewUpload, created_at: DateTime<Utc>) -> UploadRecord {
        let mut records = self.records.lock().unwrap();
        let id = records.iter().map(|r| r.id).max().unwrap_or(0) + 1;
        let record = UploadRecord {
            id,
            storage_key: upload.storage_key,
            original_name: upload.original_name,
            location: upload.location,
            byte_size: upload.byte_size,
            width: upload.width,
            height: upload.height,
            source_address: upload.source_address,
            created_at,
        };
        records.push(record.clone());
        record
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn insert_calls(&self) -> usize {
        self.insert_calls.load(Ordering::SeqCst)
    }

    fn sorted(&self) -> Vec<UploadRecord> {
        let mut records = self.records.lock().unwrap().clone();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        records
    }
}

/// Minimal record for seeding listings.
pub fn sample_upload(original_name: &str, byte_size: i64) -> NewUpload {
    NewUpload {
        storage_key: format!("{}-{}", byte_size, original_name),
        original_name: original_name.to_string(),
        location: format!("/uploads/files/{}", original_name),
        byte_size,
        width: Some(10),
        height: Some(10),
        source_address: None,
    }
}

#[async_trait]
impl UploadRepository for InMemoryUploadRepository {
    async fn insert(&self, upload: NewUpload) -> Result<UploadRecord, AppError> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.insert_at(upload, Utc::now()))
    }

    async fn get(&self, id: i64) -> Result<Option<UploadRecord>, AppError> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == id)
            .cloned())
    }

    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<UploadRecord>, AppError> {
        Ok(self
            .sorted()
            .into_iter()
            .skip(offset.max(0) as usize)
            .take(limit.max(0) as usize)
            .collect())
    }

    async fn count(&self) -> Result<i64, AppError> {
        Ok(self.len() as i64)
    }

    async fn stats(&self, since: DateTime<Utc>) -> Result<UploadStats, AppError> {
        let records = self.records.lock().unwrap();

        let mut by_extension: BTreeMap<String, i64> = BTreeMap::new();
        for record in records.iter() {
            *by_extension.entry(extension_of(&record.original_name)).or_default() += 1;
        }
        let mut by_extension: Vec<ExtensionCount> = by_extension
            .into_iter()
            .map(|(extension, count)| ExtensionCount { extension, count })
            .collect();
        // BTreeMap order is the ascending-extension tie-break; the sort is stable
        by_extension.sort_by(|a, b| b.count.cmp(&a.count));

        Ok(UploadStats {
            total_uploads: records.len() as i64,
            total_bytes: records.iter().map(|r| r.byte_size).sum(),
            uploads_today: records.iter().filter(|r| r.created_at >= since).count() as i64,
            by_extension,
        })
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}

/// Repository whose every call fails, as an unreachable database would.
#[derive(Clone, Default)]
pub struct FailingUploadRepository {
    insert_calls: Arc<AtomicUsize>,
}

impl FailingUploadRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_calls(&self) -> usize {
        self.insert_calls.load(Ordering::SeqCst)
    }

    fn unavailable() -> AppError {
        AppError::Internal("database unavailable".to_string())
    }
}

#[async_trait]
impl UploadRepository for FailingUploadRepository {
    async fn insert(&self, _upload: NewUpload) -> Result<UploadRecord, AppError> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);
        Err(Self::unavailable())
    }

    async fn get(&self, _id: i64) -> Result<Option<UploadRecord>, AppError> {
        Err(Self::unavailable())
    }

    async fn list(&self, _limit: i64, _offset: i64) -> Result<Vec<UploadRecord>, AppError> {
        Err(Self::unavailable())
    }

    async fn count(&self) -> Result<i64, AppError> {
        Err(Self::unavailable())
    }

    async fn stats(&self, _since: DateTime<Utc>) -> Result<UploadStats, AppError> {
        Err(Self::unavailable())
    }

    async fn ping(&self) -> Result<(), AppError> {
        Err(Self::unavailable())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[tokio::test]
    async fn test_list_is_newest_first_with_id_tie_break() {
        let repo = InMemoryUploadRepository::new();
        let now = Utc::now();
        let older = repo.insert_at(sample_upload("a.png", 100), now - Duration::hours(1));
        let first = repo.insert_at(sample_upload("b.png", 100), now);
        let second = repo.insert_at(sample_upload("c.png", 100), now);

        let ids: Vec<i64> = repo.list(10, 0).await.unwrap().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![second.id, first.id, older.id]);

        let page: Vec<i64> = repo.list(1, 1).await.unwrap().iter().map(|r| r.id).collect();
        assert_eq!(page, vec![first.id]);
    }

    #[tokio::test]
    async fn test_stats_group_by_extension() {
        let repo = InMemoryUploadRepository::new();
        let now = Utc::now();
        repo.insert_at(sample_upload("a.png", 100), now);
        repo.insert_at(sample_upload("b.PNG", 200), now);
        repo.insert_at(sample_upload("c.jpg", 300), now - Duration::days(2));
        repo.insert_at(sample_upload("d.gif", 400), now);

        let stats = repo.stats(now - Duration::hours(1)).await.unwrap();
        assert_eq!(stats.total_uploads, 4);
        assert_eq!(stats.total_bytes, 1000);
        assert_eq!(stats.uploads_today, 3);

        let groups: Vec<(&str, i64)> = stats
            .by_extension
            .iter()
            .map(|g| (g.extension.as_str(), g.count))
            .collect();
        assert_eq!(groups, vec![("png", 2), ("gif", 1), ("jpg", 1)]);
    }
}
