//! OpenAPI documentation and schema generation
//!
//! This module defines the OpenAPI specification for the grab-panel HTTP API
//! using utoipa for compile-time document generation.

use utoipa::OpenApi;

/// OpenAPI documentation for the grab-panel HTTP API
///
/// The document can be accessed via:
/// - `/openapi.json` - JSON format OpenAPI specification
/// - `/swagger-ui` - Interactive Swagger UI documentation (if enabled)
#[derive(OpenApi)]
#[openapi(
    info(
        title = "grab-panel HTTP API",
        version = "0.1.0",
        description = "Start bulk downloads, poll their progress and manage the downloaded files",
        license(
            name = "MIT OR Apache-2.0"
        )
    ),
    servers(
        (url = "http://localhost:5000", description = "Local development server")
    ),
    paths(
        // Jobs
        crate::api::routes::start_download,
        crate::api::routes::job_status,
        crate::api::routes::list_jobs,

        // Files
        crate::api::routes::list_files,
        crate::api::routes::download_file,
        crate::api::routes::delete_file,
        crate::api::routes::clear_downloads,

        // System
        crate::api::routes::health_check,
        crate::api::routes::openapi_spec,
        crate::api::routes::event_stream,
    ),
    components(schemas(
        crate::types::JobId,
        crate::types::JobStatus,
        crate::types::Job,
        crate::types::FileRecord,
        crate::types::ClearReport,
        crate::types::Event,

        crate::api::routes::StartDownloadRequest,
        crate::api::routes::StartDownloadResponse,
        crate::api::routes::JobListResponse,
        crate::api::routes::FileListResponse,
        crate::api::routes::DeleteFileResponse,
        crate::api::routes::ClearResponse,

        crate::error::ApiError,
    )),
    tags(
        (name = "jobs", description = "Start download jobs and poll their status"),
        (name = "files", description = "List, fetch, delete and clear downloaded files"),
        (name = "system", description = "Health, events and API documentation"),
    )
)]
pub struct ApiDoc;
