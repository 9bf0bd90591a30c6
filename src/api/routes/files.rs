//! File handlers: list, fetch, delete, clear.

use super::{ClearResponse, DeleteFileResponse, FileListResponse};
use crate::api::AppState;
use crate::error::Error;
use axum::{
    Json,
    body::Body,
    extract::{Path, State, rejection::PathRejection},
    http::{HeaderValue, header},
    response::{IntoResponse, Response},
};
use tokio_util::io::ReaderStream;

/// GET /api/files - List downloaded files
#[utoipa::path(
    get,
    path = "/api/files",
    tag = "files",
    responses(
        (status = 200, description = "Every regular file under the download directory", body = FileListResponse),
        (status = 500, description = "Download directory could not be read", body = crate::error::ApiError)
    )
)]
pub async fn list_files(State(state): State<AppState>) -> Result<Json<FileListResponse>, Error> {
    let files = state.tracker.store().list().await?;
    Ok(Json(FileListResponse { files }))
}

/// GET /download/:filename - Stream one file as an attachment
///
/// Only the final path component of `filename` is used; the file may live
/// in any subdirectory of the download directory.
#[utoipa::path(
    get,
    path = "/download/{filename}",
    tag = "files",
    params(
        ("filename" = String, Path, description = "File name as listed by GET /api/files")
    ),
    responses(
        (status = 200, description = "File contents", content_type = "application/octet-stream"),
        (status = 400, description = "File name is not valid UTF-8", body = crate::error::ApiError),
        (status = 404, description = "No such file", body = crate::error::ApiError)
    )
)]
pub async fn download_file(
    State(state): State<AppState>,
    filename: Result<Path<String>, PathRejection>,
) -> Result<Response, Error> {
    let Path(filename) = filename?;
    let stored = state.tracker.store().open(&filename).await?;

    tracing::debug!(name = %stored.name, size = stored.size, "serving file");

    let body = Body::from_stream(ReaderStream::new(stored.file));
    let headers = [
        (
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/octet-stream"),
        ),
        (header::CONTENT_LENGTH, HeaderValue::from(stored.size)),
        (
            header::CONTENT_DISPOSITION,
            content_disposition(&stored.name),
        ),
    ];

    Ok((headers, body).into_response())
}

/// DELETE /api/delete/:filename - Delete one file
#[utoipa::path(
    delete,
    path = "/api/delete/{filename}",
    tag = "files",
    params(
        ("filename" = String, Path, description = "File name as listed by GET /api/files")
    ),
    responses(
        (status = 200, description = "File deleted", body = DeleteFileResponse),
        (status = 400, description = "File name is not valid UTF-8", body = crate::error::ApiError),
        (status = 404, description = "No such file", body = crate::error::ApiError),
        (status = 500, description = "File could not be removed", body = crate::error::ApiError)
    )
)]
pub async fn delete_file(
    State(state): State<AppState>,
    filename: Result<Path<String>, PathRejection>,
) -> Result<Json<DeleteFileResponse>, Error> {
    let Path(filename) = filename?;
    state.tracker.store().delete(&filename).await?;

    Ok(Json(DeleteFileResponse {
        status: "deleted".to_string(),
    }))
}

/// POST /api/clear - Delete everything under the download directory and forget all jobs
#[utoipa::path(
    post,
    path = "/api/clear",
    tag = "files",
    responses(
        (status = 200, description = "Directory emptied and job records dropped", body = ClearResponse),
        (status = 500, description = "Some entries could not be removed; details lists them", body = crate::error::ApiError)
    )
)]
pub async fn clear_downloads(State(state): State<AppState>) -> Result<Json<ClearResponse>, Error> {
    let report = state.tracker.clear_all().await?;

    Ok(Json(ClearResponse {
        status: "cleared".to_string(),
        removed: report.removed.len(),
    }))
}

/// `attachment` disposition with an ASCII fallback name and the exact UTF-8 name
fn content_disposition(name: &str) -> HeaderValue {
    let fallback: String = name
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_ascii() && !c.is_ascii_control() => c,
            _ => '_',
        })
        .collect();

    let value = format!(
        "attachment; filename=\"{fallback}\"; filename*=UTF-8''{}",
        urlencoding::encode(name)
    );

    HeaderValue::from_str(&value).unwrap_or_else(|_| HeaderValue::from_static("attachment"))
}
