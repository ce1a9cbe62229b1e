//! Error types module
//!
//! `UploadError` is the classified outcome of a failed upload pipeline run; every
//! variant maps to exactly one stable `UploadFailureKind` code that automated clients
//! can branch on. `AppError` is the service-wide error that the HTTP layer renders.
//!
//! The `Database` variant and `From<sqlx::Error>` are gated behind the `sqlx` feature.

use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::Serialize;
use utoipa::ToSchema;

#[cfg(feature = "sqlx")]
use sqlx::Error as SqlxError;

/// Level an error is logged at when it reaches the HTTP layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Expected client mistakes
    Debug,
    /// Faults on our side
    Error,
}

/// Response characteristics an error carries with it, so the HTTP layer can
/// render every error the same way.
pub trait ErrorMetadata {
    fn http_status_code(&self) -> u16;

    /// Stable SCREAMING_SNAKE code clients branch on, e.g. `FILE_TOO_LARGE`.
    fn error_code(&self) -> &'static str;

    /// True when resending (possibly corrected) may succeed.
    fn is_recoverable(&self) -> bool;

    fn suggested_action(&self) -> Option<&'static str>;

    /// Message safe to show to clients.
    fn client_message(&self) -> String;

    /// Sensitive errors never expose their details.
    fn is_sensitive(&self) -> bool;

    fn log_level(&self) -> LogLevel;
}

/// Stable failure classification of an upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UploadFailureKind {
    NoFile,
    UnsupportedType,
    FileTooSmall,
    FileTooLarge,
    InvalidImage,
    ImageTooLarge,
    StorageError,
    PersistenceError,
}

impl UploadFailureKind {
    pub fn code(&self) -> &'static str {
        match self {
            UploadFailureKind::NoFile => "NO_FILE",
            UploadFailureKind::UnsupportedType => "UNSUPPORTED_TYPE",
            UploadFailureKind::FileTooSmall => "FILE_TOO_SMALL",
            UploadFailureKind::FileTooLarge => "FILE_TOO_LARGE",
            UploadFailureKind::InvalidImage => "INVALID_IMAGE",
            UploadFailureKind::ImageTooLarge => "IMAGE_TOO_LARGE",
            UploadFailureKind::StorageError => "STORAGE_ERROR",
            UploadFailureKind::PersistenceError => "PERSISTENCE_ERROR",
        }
    }

    /// Validation-stage failures happen before any side effect.
    pub fn is_validation(&self) -> bool {
        !matches!(
            self,
            UploadFailureKind::StorageError | UploadFailureKind::PersistenceError
        )
    }
}

impl Display for UploadFailureKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.code())
    }
}

/// Classified failure of one upload pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadError {
    #[error("No file provided: {0}")]
    NoFile(String),

    #[error("Unsupported file type '{extension}'. Allowed types: {}", allowed.join(", "))]
    UnsupportedType {
        extension: String,
        allowed: Vec<String>,
    },

    #[error("File too small: {size} bytes is below the minimum of {min} bytes")]
    FileTooSmall { size: usize, min: usize },

    #[error("File too large: exceeds the maximum of {max} bytes")]
    FileTooLarge { max: usize },

    #[error("Invalid image: {0}")]
    InvalidImage(String),

    #[error("Image too large: {width}x{height} exceeds the maximum dimension of {max} pixels")]
    ImageTooLarge { width: u32, height: u32, max: u32 },

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Persistence error: {0}")]
    Persistence(String),
}

impl UploadError {
    pub fn kind(&self) -> UploadFailureKind {
        match self {
            UploadError::NoFile(_) => UploadFailureKind::NoFile,
            UploadError::UnsupportedType { .. } => UploadFailureKind::UnsupportedType,
            UploadError::FileTooSmall { .. } => UploadFailureKind::FileTooSmall,
            UploadError::FileTooLarge { .. } => UploadFailureKind::FileTooLarge,
            UploadError::InvalidImage(_) => UploadFailureKind::InvalidImage,
            UploadError::ImageTooLarge { .. } => UploadFailureKind::ImageTooLarge,
            UploadError::Storage(_) => UploadFailureKind::StorageError,
            UploadError::Persistence(_) => UploadFailureKind::PersistenceError,
        }
    }
}

impl ErrorMetadata for UploadError {
    fn http_status_code(&self) -> u16 {
        match self.kind() {
            UploadFailureKind::FileTooLarge => 413,
            UploadFailureKind::StorageError | UploadFailureKind::PersistenceError => 500,
            _ => 400,
        }
    }

    fn error_code(&self) -> &'static str {
        self.kind().code()
    }

    fn is_recoverable(&self) -> bool {
        self.kind().is_validation()
    }

    fn suggested_action(&self) -> Option<&'static str> {
        match self.kind() {
            UploadFailureKind::NoFile => Some("Send the image in a multipart field named 'file'"),
            UploadFailureKind::UnsupportedType => Some("Upload a file with an allowed extension"),
            UploadFailureKind::FileTooSmall | UploadFailureKind::FileTooLarge => {
                Some("Upload a file within the allowed size range")
            }
            UploadFailureKind::InvalidImage => Some("Check image format and try a different file"),
            UploadFailureKind::ImageTooLarge => Some("Resize the image and try again"),
            UploadFailureKind::StorageError | UploadFailureKind::PersistenceError => {
                Some("Contact support if this error persists")
            }
        }
    }

    fn client_message(&self) -> String {
        match self {
            UploadError::Storage(_) => "Failed to store file".to_string(),
            UploadError::Persistence(_) => "Failed to record upload".to_string(),
            other => other.to_string(),
        }
    }

    fn is_sensitive(&self) -> bool {
        !self.kind().is_validation()
    }

    fn log_level(&self) -> LogLevel {
        if self.kind().is_validation() {
            LogLevel::Debug
        } else {
            LogLevel::Error
        }
    }
}

/// Service-wide error rendered by the HTTP layer.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[source] SqlxError),

    #[cfg(not(feature = "sqlx"))]
    #[error("Database error: {0}")]
    Database(String),

    #[error(transparent)]
    Upload(#[from] UploadError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

#[cfg(feature = "sqlx")]
impl From<SqlxError> for AppError {
    fn from(err: SqlxError) -> Self {
        AppError::Database(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

/// Rendering of one `AppError` variant.
struct Presentation {
    status: u16,
    code: &'static str,
    recoverable: bool,
    action: Option<&'static str>,
    sensitive: bool,
    level: LogLevel,
}

const RETRY_LATER: Option<&str> = Some("Retry after a short delay");

const SERVER_FAULT: Presentation = Presentation {
    status: 500,
    code: "INTERNAL_ERROR",
    recoverable: true,
    action: RETRY_LATER,
    sensitive: true,
    level: LogLevel::Error,
};

impl AppError {
    fn presentation(&self) -> Presentation {
        match self {
            AppError::Upload(e) => Presentation {
                status: e.http_status_code(),
                code: e.error_code(),
                recoverable: e.is_recoverable(),
                action: e.suggested_action(),
                sensitive: e.is_sensitive(),
                level: e.log_level(),
            },
            AppError::Database(_) => Presentation {
                code: "DATABASE_ERROR",
                ..SERVER_FAULT
            },
            AppError::InvalidInput(_) => Presentation {
                status: 400,
                code: "INVALID_INPUT",
                recoverable: false,
                action: Some("Check the query parameters and try again"),
                sensitive: false,
                level: LogLevel::Debug,
            },
            AppError::NotFound(_) => Presentation {
                status: 404,
                code: "NOT_FOUND",
                recoverable: false,
                action: Some("List uploads to find a valid id"),
                sensitive: false,
                level: LogLevel::Debug,
            },
            AppError::Internal(_) | AppError::InternalWithSource { .. } => SERVER_FAULT,
        }
    }

    /// Variant name shown next to the details outside production.
    pub fn error_type(&self) -> &'static str {
        match self {
            AppError::Database(_) => "Database",
            AppError::Upload(_) => "Upload",
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::NotFound(_) => "NotFound",
            AppError::Internal(_) | AppError::InternalWithSource { .. } => "Internal",
        }
    }

    /// Message followed by up to five levels of `Caused by:` lines.
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();
        let mut chain = self.source();
        for _ in 0..5 {
            let Some(cause) = chain else {
                return details;
            };
            details.push_str(&format!("\n  Caused by: {}", cause));
            chain = cause.source();
        }
        if chain.is_some() {
            details.push_str("\n  ... (truncated)");
        }
        details
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        self.presentation().status
    }

    fn error_code(&self) -> &'static str {
        self.presentation().code
    }

    fn is_recoverable(&self) -> bool {
        self.presentation().recoverable
    }

    fn suggested_action(&self) -> Option<&'static str> {
        self.presentation().action
    }

    fn client_message(&self) -> String {
        match self {
            AppError::Upload(e) => e.client_message(),
            AppError::Database(_) => "Failed to access database".to_string(),
            AppError::InvalidInput(msg) | AppError::NotFound(msg) => msg.clone(),
            AppError::Internal(_) | AppError::InternalWithSource { .. } => {
                "Internal server error".to_string()
            }
        }
    }

    fn is_sensitive(&self) -> bool {
        self.presentation().sensitive
    }

    fn log_level(&self) -> LogLevel {
        self.presentation().level
    }
}
