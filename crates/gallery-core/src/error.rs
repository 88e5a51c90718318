//! Error types module
//!
//! All pipeline failures are unified under `AppError`. Skip conditions (echo events,
//! unrecognised keys, absent objects, missing records) are not errors and never
//! reach this type.
//!
//! The `Database` variant wraps `sqlx::Error` when the `sqlx` feature is enabled.

use std::io;

#[cfg(feature = "sqlx")]
use sqlx::Error as SqlxError;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like bad input
    Debug,
    /// Warning level - for content the pipeline cannot handle
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Self-description of an error, used by the ingress when rendering and logging it.
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "DATABASE_ERROR")
    fn error_code(&self) -> &'static str;

    /// Whether redelivering the same event could succeed
    fn is_recoverable(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[source] SqlxError),

    #[cfg(not(feature = "sqlx"))]
    #[error("Database error: {0}")]
    Database(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Image processing error: {0}")]
    ImageProcessing(String),

    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

pub type AppResult<T> = Result<T, AppError>;

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

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidInput(format!("JSON parsing error: {}", err))
    }
}

/// Static metadata for each variant: (http_status, error_code, recoverable, log_level).
fn app_error_static_metadata(err: &AppError) -> (u16, &'static str, bool, LogLevel) {
    match err {
        AppError::Database(_) => (500, "DATABASE_ERROR", true, LogLevel::Error),
        AppError::Storage(_) => (502, "STORAGE_ERROR", true, LogLevel::Error),
        AppError::ImageProcessing(_) => (422, "IMAGE_PROCESSING_ERROR", false, LogLevel::Warn),
        AppError::UnsupportedMediaType(_) => {
            (415, "UNSUPPORTED_MEDIA_TYPE", false, LogLevel::Warn)
        }
        AppError::InvalidInput(_) => (400, "INVALID_INPUT", false, LogLevel::Debug),
        AppError::NotFound(_) => (404, "NOT_FOUND", false, LogLevel::Debug),
        AppError::Configuration(_) => (500, "CONFIGURATION_ERROR", false, LogLevel::Error),
        AppError::Internal(_) | AppError::InternalWithSource { .. } => {
            (500, "INTERNAL_ERROR", true, LogLevel::Error)
        }
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).3
    }
}

impl AppError {
    /// Short variant name for structured log fields.
    pub fn error_type(&self) -> &'static str {
        match self {
            AppError::Database(_) => "database",
            AppError::Storage(_) => "storage",
            AppError::ImageProcessing(_) => "image_processing",
            AppError::UnsupportedMediaType(_) => "unsupported_media_type",
            AppError::InvalidInput(_) => "invalid_input",
            AppError::NotFound(_) => "not_found",
            AppError::Configuration(_) => "configuration",
            AppError::Internal(_) | AppError::InternalWithSource { .. } => "internal",
        }
    }
}
