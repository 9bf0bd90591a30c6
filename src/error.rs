//! Error types for grab-panel
//!
//! This module provides error handling for the library, including:
//! - A single crate-wide [`Error`] enum covering validation, storage and job failures
//! - HTTP status code mapping for API integration
//! - Structured error responses with machine-readable error codes

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;
use utoipa::ToSchema;

/// Result type alias for grab-panel operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for grab-panel
///
/// Variants fall into three groups: request errors (`InvalidInput`, `NotFound`),
/// storage errors (`Storage`, `ClearIncomplete`, `Io`), and job errors
/// (`DownloadFailed`, `Timeout`, `ExternalTool`) which are recorded on the job
/// instead of being returned to an HTTP caller.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "jobs.timeout")
        key: Option<String>,
    },

    /// Caller supplied a missing or malformed value
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Unknown job id or missing file
    #[error("{0} not found")]
    NotFound(String),

    /// Filesystem failure while listing, deleting or clearing the download directory
    #[error("storage error at {path}: {reason}")]
    Storage {
        /// Path that could not be read or modified
        path: PathBuf,
        /// The underlying failure
        reason: String,
    },

    /// `clear()` removed some entries but not all of them
    #[error("clear incomplete: {} removed, {} failed", removed.len(), failed.len())]
    ClearIncomplete {
        /// Names of entries that were removed
        removed: Vec<String>,
        /// Names of entries that could not be removed, with the reason
        failed: Vec<(String, String)>,
    },

    /// The download tool reported a failure; the payload is its diagnostic text
    #[error("{0}")]
    DownloadFailed(String),

    /// The download tool did not finish within the configured bound
    #[error("download timed out after {seconds}s")]
    Timeout {
        /// The configured timeout in seconds
        seconds: u64,
    },

    /// External tool could not be executed at all
    #[error("external tool error: {0}")]
    ExternalTool(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Shutdown in progress - not accepting new jobs
    #[error("shutdown in progress: not accepting new downloads")]
    ShuttingDown,

    /// API server error
    #[error("API server error: {0}")]
    ApiServerError(String),
}

impl Error {
    /// Build a [`Error::Storage`] from an I/O error and the path involved
    pub fn storage(path: impl Into<PathBuf>, err: std::io::Error) -> Self {
        Error::Storage {
            path: path.into(),
            reason: err.to_string(),
        }
    }

    /// Text recorded in a failed job's `error` field
    ///
    /// Tool failures keep their diagnostic verbatim; everything else uses the
    /// display form.
    pub fn job_diagnostic(&self) -> String {
        match self {
            Error::DownloadFailed(diagnostic) => diagnostic.clone(),
            other => other.to_string(),
        }
    }
}

/// API error response format
///
/// Every failure path of the HTTP surface returns this body. The `error` key is
/// the discriminator clients check; success bodies never contain it.
///
/// # Example JSON Response
///
/// ```json
/// {
///   "error": "job dl-3-9f2c01ab not found",
///   "code": "not_found"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// Human-readable error message
    pub error: String,

    /// Machine-readable error code (e.g., "not_found", "invalid_input")
    pub code: String,

    /// Optional additional context about the error
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Create a new API error with code and message
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            code: code.into(),
            details: None,
        }
    }

    /// Create a "not found" error
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::new("not_found", format!("{} not found", resource.into()))
    }

    /// Create an "internal server error"
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new("internal_error", message)
    }
}

/// Convert errors to HTTP status codes for API responses
pub trait ToHttpStatus {
    /// Get the HTTP status code for this error
    fn status_code(&self) -> u16;

    /// Get the machine-readable error code
    fn error_code(&self) -> &str;
}

impl ToHttpStatus for Error {
    fn status_code(&self) -> u16 {
        match self {
            // 400 Bad Request
            Error::Config { .. } => 400,
            Error::InvalidInput(_) => 400,

            // 404 Not Found
            Error::NotFound(_) => 404,

            // 500 Internal Server Error
            Error::Storage { .. } => 500,
            Error::ClearIncomplete { .. } => 500,
            Error::Io(_) => 500,
            Error::ApiServerError(_) => 500,

            // Job errors only reach HTTP if a caller chooses to surface them
            Error::DownloadFailed(_) => 502,
            Error::ExternalTool(_) => 502,
            Error::Timeout { .. } => 504,

            // 503 Service Unavailable
            Error::ShuttingDown => 503,
        }
    }

    fn error_code(&self) -> &str {
        match self {
            Error::Config { .. } => "config_error",
            Error::InvalidInput(_) => "invalid_input",
            Error::NotFound(_) => "not_found",
            Error::Storage { .. } => "storage_error",
            Error::ClearIncomplete { .. } => "clear_incomplete",
            Error::DownloadFailed(_) => "download_failed",
            Error::Timeout { .. } => "timeout",
            Error::ExternalTool(_) => "external_tool_error",
            Error::Io(_) => "io_error",
            Error::ShuttingDown => "shutting_down",
            Error::ApiServerError(_) => "api_server_error",
        }
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        let code = error.error_code().to_string();
        let message = error.to_string();

        let details = match &error {
            Error::Config { key: Some(key), .. } => Some(serde_json::json!({
                "key": key,
            })),
            Error::ClearIncomplete { removed, failed } => Some(serde_json::json!({
                "removed": removed,
                "failed": failed
                    .iter()
                    .map(|(name, reason)| serde_json::json!({"name": name, "reason": reason}))
                    .collect::<Vec<_>>(),
            })),
            Error::Timeout { seconds } => Some(serde_json::json!({
                "timeout_seconds": seconds,
            })),
            _ => None,
        };

        ApiError {
            error: message,
            code,
            details,
        }
    }
}
