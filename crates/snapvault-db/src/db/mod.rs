//! Database repositories for data access layer

pub mod upload;

pub use upload::{start_of_day_utc, PostgresUploadRepository, UploadRepository};

/// Embedded migrations from the workspace `migrations/` directory.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("../../migrations");
