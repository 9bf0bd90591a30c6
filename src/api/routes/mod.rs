//! Route handlers for the REST API
//!
//! Handlers are organized by domain:
//! - [`jobs`] - Starting download jobs and polling their status
//! - [`files`] - Listing, fetching, deleting and clearing downloaded files
//! - [`system`] - Control page, health, events, OpenAPI

use serde::{Deserialize, Serialize};

mod files;
mod jobs;
mod system;

// Re-export all handlers so `routes::function_name` continues to work
pub use files::*;
pub use jobs::*;
pub use system::*;

// ============================================================================
// Request/Response Types (shared across handlers)
// ============================================================================

/// Request body for POST /api/download
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct StartDownloadRequest {
    /// Page or album URL handed to the download tool
    #[serde(default)]
    pub url: String,
}

/// Response for POST /api/download
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct StartDownloadResponse {
    /// Id to poll with GET /api/status/{id}
    pub download_id: crate::types::JobId,
    /// Always "started"
    pub status: String,
}

/// Response for GET /api/jobs
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct JobListResponse {
    /// Tracked jobs, newest first
    pub jobs: Vec<crate::types::Job>,
}

/// Response for GET /api/files
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct FileListResponse {
    /// Every regular file under the download directory
    pub files: Vec<crate::types::FileRecord>,
}

/// Response for DELETE /api/delete/{filename}
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct DeleteFileResponse {
    /// Always "deleted"
    pub status: String,
}

/// Response for POST /api/clear
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
pub struct ClearResponse {
    /// Always "cleared"
    pub status: String,
    /// Number of top-level entries removed from the download directory
    pub removed: usize,
}
