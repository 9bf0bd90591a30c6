//! HTTP API server module
//!
//! Serves the browser control page and a small JSON API for starting
//! download jobs, polling them, and managing the downloaded files.

use crate::error::ApiError;
use crate::{Config, JobTracker, Result};
use axum::{
    Json, Router,
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod error_response;
pub mod openapi;
pub mod routes;
pub mod state;

pub use openapi::ApiDoc;
pub use state::AppState;

/// Create the API router with all route definitions
///
/// # Routes
///
/// ## Jobs
/// - `POST /api/download` - Start a download job
/// - `GET /api/status/:id` - Poll one job
/// - `GET /api/jobs` - List all tracked jobs
///
/// ## Files
/// - `GET /api/files` - List downloaded files
/// - `GET /download/:filename` - Fetch one file as an attachment
/// - `DELETE /api/delete/:filename` - Delete one file
/// - `POST /api/clear` - Delete all files and forget all jobs
///
/// ## System
/// - `GET /` - Control page
/// - `GET /api/events` - Server-sent events stream
/// - `GET /health` - Health check
/// - `GET /openapi.json` - OpenAPI specification
/// - `GET /swagger-ui` - Interactive Swagger UI documentation (if enabled)
///
/// Unknown paths get a JSON 404, known paths with the wrong method a JSON 405,
/// and handler panics a JSON 500.
pub fn create_router(tracker: Arc<JobTracker>, config: Arc<Config>) -> Router {
    let state = AppState::new(tracker, config.clone());

    let router = Router::new()
        // Jobs
        .route("/api/download", post(routes::start_download))
        .route("/api/status/:id", get(routes::job_status))
        .route("/api/jobs", get(routes::list_jobs))
        // Files
        .route("/api/files", get(routes::list_files))
        .route("/download/:filename", get(routes::download_file))
        .route("/api/delete/:filename", delete(routes::delete_file))
        .route("/api/clear", post(routes::clear_downloads))
        // System
        .route("/", get(routes::index))
        .route("/api/events", get(routes::event_stream))
        .route("/health", get(routes::health_check))
        .route("/openapi.json", get(routes::openapi_spec))
        .fallback(not_found);

    // SwaggerUi serves its own copy of the document alongside /openapi.json
    let router = if config.server.api.swagger_ui {
        router.merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
    } else {
        router
    };

    let router = router
        .method_not_allowed_fallback(method_not_allowed)
        .with_state(state)
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(TraceLayer::new_for_http());

    if config.server.api.cors_enabled {
        let cors = build_cors_layer(&config.server.api.cors_origins);
        router.layer(cors)
    } else {
        router
    }
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(ApiError::not_found("route")))
}

async fn method_not_allowed() -> impl IntoResponse {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(ApiError::new("method_not_allowed", "method not allowed")),
    )
}

fn panic_response(panic: Box<dyn std::any::Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!(panic = detail, "request handler panicked");

    ApiError::internal("internal server error").into_response()
}

/// Build a CORS layer based on configured origins
///
/// `"*"` (or an empty list) allows any origin; otherwise only the listed
/// origins are allowed. All methods and headers are allowed either way.
fn build_cors_layer(origins: &[String]) -> CorsLayer {
    let allow_any = origins.iter().any(|o| o == "*");

    if allow_any || origins.is_empty() {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();

        CorsLayer::new()
            .allow_origin(AllowOrigin::list(allowed))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

/// Start the API server on the configured bind address.
///
/// Runs until the server fails; see [`start_api_server_with_shutdown`] for a
/// server that stops on a signal.
///
/// # Example
///
/// ```no_run
/// use grab_panel::{Config, JobTracker};
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = Arc::new(Config::default());
/// let tracker = Arc::new(JobTracker::from_config(&config).await?);
///
/// // Start API server (blocks until shutdown)
/// grab_panel::api::start_api_server(tracker, config).await?;
/// # Ok(())
/// # }
/// ```
pub async fn start_api_server(tracker: Arc<JobTracker>, config: Arc<Config>) -> Result<()> {
    start_api_server_with_shutdown(tracker, config, std::future::pending()).await
}

/// Start the API server and stop gracefully once `shutdown` resolves.
///
/// In-flight requests are allowed to finish; the tracker is shut down after
/// the listener closes.
pub async fn start_api_server_with_shutdown<F>(
    tracker: Arc<JobTracker>,
    config: Arc<Config>,
    shutdown: F,
) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let bind_address = config.server.api.bind_address;

    tracing::info!(address = %bind_address, "starting API server");

    let app = create_router(tracker.clone(), config);

    let listener = TcpListener::bind(bind_address)
        .await
        .map_err(crate::error::Error::Io)?;

    let local_addr = listener.local_addr().map_err(crate::error::Error::Io)?;
    tracing::info!(address = %local_addr, "API server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| crate::error::Error::ApiServerError(e.to_string()))?;

    tracker.shutdown().await;
    tracing::info!("API server stopped");
    Ok(())
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;
