//! Job handlers: start a download, poll one job, list all jobs.

use super::{JobListResponse, StartDownloadRequest, StartDownloadResponse};
use crate::api::AppState;
use crate::error::Error;
use crate::types::{Job, JobId};
use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
};

/// POST /api/download - Start a download job
///
/// Returns as soon as the job is registered; the download itself runs in the
/// background.
#[utoipa::path(
    post,
    path = "/api/download",
    tag = "jobs",
    request_body = StartDownloadRequest,
    responses(
        (status = 200, description = "Job registered", body = StartDownloadResponse),
        (status = 400, description = "Missing, malformed or rejected URL", body = crate::error::ApiError),
        (status = 503, description = "Server is shutting down", body = crate::error::ApiError)
    )
)]
pub async fn start_download(
    State(state): State<AppState>,
    payload: Result<Json<StartDownloadRequest>, JsonRejection>,
) -> Result<Json<StartDownloadResponse>, Error> {
    let Json(request) = payload?;
    let download_id = state.tracker.start(&request.url).await?;

    Ok(Json(StartDownloadResponse {
        download_id,
        status: "started".to_string(),
    }))
}

/// GET /api/status/:id - Poll one job
#[utoipa::path(
    get,
    path = "/api/status/{id}",
    tag = "jobs",
    params(
        ("id" = String, Path, description = "Job id returned by POST /api/download")
    ),
    responses(
        (status = 200, description = "Job snapshot", body = Job),
        (status = 400, description = "Job id is not valid UTF-8", body = crate::error::ApiError),
        (status = 404, description = "Unknown job id", body = crate::error::ApiError)
    )
)]
pub async fn job_status(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
) -> Result<Json<Job>, Error> {
    let Path(id) = id?;
    let job = state.tracker.status(&JobId::from(id)).await?;
    Ok(Json(job))
}

/// GET /api/jobs - List all tracked jobs
#[utoipa::path(
    get,
    path = "/api/jobs",
    tag = "jobs",
    responses(
        (status = 200, description = "Tracked jobs, newest first", body = JobListResponse)
    )
)]
pub async fn list_jobs(State(state): State<AppState>) -> Json<JobListResponse> {
    Json(JobListResponse {
        jobs: state.tracker.jobs().await,
    })
}
