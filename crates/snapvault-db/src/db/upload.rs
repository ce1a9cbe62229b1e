use async_trait::async_trait;
use chrono::{DateTime, NaiveTime, Utc};
use snapvault_core::models::{ExtensionCount, NewUpload, UploadRecord, UploadStats};
use snapvault_core::AppError;
use sqlx::{PgPool, Postgres, Row};

/// Durable store of upload records.
///
/// Insert-only from the pipeline's point of view. Listings are ordered newest
/// first with the repository-assigned id as tie-break, so records sharing a
/// timestamp still come back in reverse insertion order.
#[async_trait]
pub trait UploadRepository: Send + Sync {
    /// Atomically insert one record; `id` and `created_at` are assigned here.
    async fn insert(&self, upload: NewUpload) -> Result<UploadRecord, AppError>;

    async fn get(&self, id: i64) -> Result<Option<UploadRecord>, AppError>;

    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<UploadRecord>, AppError>;

    async fn count(&self) -> Result<i64, AppError>;

    /// Aggregates over all records; `since` bounds the "today" count.
    async fn stats(&self, since: DateTime<Utc>) -> Result<UploadStats, AppError>;

    /// Connectivity probe
    async fn ping(&self) -> Result<(), AppError>;
}

/// Midnight UTC of the day containing `now`.
pub fn start_of_day_utc(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive().and_time(NaiveTime::MIN).and_utc()
}

const UPLOAD_COLUMNS: &str =
    "id, storage_key, original_name, location, byte_size, width, height, source_address, created_at";

#[derive(Clone)]
pub struct PostgresUploadRepository {
    pool: PgPool,
}

impl PostgresUploadRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UploadRepository for PostgresUploadRepository {
    #[tracing::instrument(skip(self, upload), fields(db.table = "uploads", db.operation = "insert", storage_key = %upload.storage_key))]
    async fn insert(&self, upload: NewUpload) -> Result<UploadRecord, AppError> {
        let record = sqlx::query_as::<Postgres, UploadRecord>(&format!(
            r#"
            INSERT INTO uploads (storage_key, original_name, location, byte_size, width, height, source_address)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            UPLOAD_COLUMNS
        ))
        .bind(&upload.storage_key)
        .bind(&upload.original_name)
        .bind(&upload.location)
        .bind(upload.byte_size)
        .bind(upload.width)
        .bind(upload.height)
        .bind(&upload.source_address)
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }

    #[tracing::instrument(skip(self), fields(db.table = "uploads", db.operation = "select", db.record_id = id))]
    async fn get(&self, id: i64) -> Result<Option<UploadRecord>, AppError> {
        let record = sqlx::query_as::<Postgres, UploadRecord>(&format!(
            "SELECT {} FROM uploads WHERE id = $1",
            UPLOAD_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    #[tracing::instrument(skip(self), fields(db.table = "uploads", db.operation = "select"))]
    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<UploadRecord>, AppError> {
        let records = sqlx::query_as::<Postgres, UploadRecord>(&format!(
            "SELECT {} FROM uploads ORDER BY created_at DESC, id DESC LIMIT $1 OFFSET $2",
            UPLOAD_COLUMNS
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    #[tracing::instrument(skip(self), fields(db.table = "uploads", db.operation = "count"))]
    async fn count(&self) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM uploads")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    #[tracing::instrument(skip(self), fields(db.table = "uploads", db.operation = "aggregate"))]
    async fn stats(&self, since: DateTime<Utc>) -> Result<UploadStats, AppError> {
        let totals = sqlx::query(
            r#"
            SELECT
                COUNT(*) AS total_uploads,
                COALESCE(SUM(byte_size), 0)::BIGINT AS total_bytes,
                COUNT(*) FILTER (WHERE created_at >= $1) AS uploads_today
            FROM uploads
            "#,
        )
        .bind(since)
        .fetch_one(&self.pool)
        .await?;

        // Suffix after the last dot, or '' when the name has none
        let by_extension = sqlx::query(
            r#"
            SELECT
                CASE WHEN strpos(original_name, '.') > 0
                     THEN lower(regexp_replace(original_name, '^.*\.', ''))
                     ELSE ''
                END AS extension,
                COUNT(*) AS count
            FROM uploads
            GROUP BY 1
            ORDER BY 2 DESC, 1 ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(|row| -> Result<ExtensionCount, sqlx::Error> {
            Ok(ExtensionCount {
                extension: row.try_get("extension")?,
                count: row.try_get("count")?,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

        Ok(UploadStats {
            total_uploads: totals.try_get("total_uploads")?,
            total_bytes: totals.try_get("total_bytes")?,
            uploads_today: totals.try_get("uploads_today")?,
            by_extension,
        })
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
