use super::*;
use crate::config::JobConfig;
use crate::invoker::{DownloadInvoker, ScriptedInvoker};
use crate::tracker::test_helpers::{create_test_tracker, wait_for_terminal};
use crate::types::JobId;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tower::ServiceExt; // for oneshot()

mod system;

/// Router over a fresh tracker and download directory
async fn create_test_app(
    invoker: Arc<dyn DownloadInvoker>,
) -> (Router, Arc<JobTracker>, tempfile::TempDir) {
    let job_config = JobConfig {
        max_concurrent_jobs: 2,
        timeout: Duration::from_secs(5),
        source_marker: None,
    };
    let (tracker, temp_dir) = create_test_tracker(invoker, job_config).await;
    let tracker = Arc::new(tracker);

    let app = create_router(tracker.clone(), Arc::new(Config::default()));
    (app, tracker, temp_dir)
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, body.to_vec())
}

async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    let (status, body) = send(app, request).await;
    (status, serde_json::from_slice(&body).unwrap())
}

async fn send_json(app: &Router, method: &str, uri: &str, body: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let (status, body) = send(app, request).await;
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn test_api_server_spawns_and_stops_on_shutdown_signal() {
    let (_app, tracker, _temp_dir) = create_test_app(Arc::new(ScriptedInvoker::succeed())).await;

    let mut config = Config::default();
    // Port 0 = OS assigns a free port
    config.server.api.bind_address = "127.0.0.1:0".parse().unwrap();
    let config = Arc::new(config);

    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();
    let server = tokio::spawn(start_api_server_with_shutdown(
        tracker.clone(),
        config,
        async move {
            stop_rx.await.ok();
        },
    ));

    tokio::time::sleep(Duration::from_millis(100)).await;
    stop_tx.send(()).unwrap();

    let result = tokio::time::timeout(Duration::from_secs(5), server)
        .await
        .unwrap()
        .unwrap();
    assert!(result.is_ok());
    assert!(!tracker.is_accepting(), "tracker is shut down with the server");
}

#[tokio::test]
async fn test_cors_enabled() {
    let (_app, tracker, _temp_dir) = create_test_app(Arc::new(ScriptedInvoker::succeed())).await;

    let mut config = Config::default();
    config.server.api.cors_enabled = true;
    config.server.api.cors_origins = vec!["*".to_string()];
    let app = create_router(tracker, Arc::new(config));

    let request = Request::builder()
        .uri("/health")
        .header("Origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("access-control-allow-origin").unwrap(),
        "*"
    );
}

#[tokio::test]
async fn test_cors_specific_origin() {
    let (_app, tracker, _temp_dir) = create_test_app(Arc::new(ScriptedInvoker::succeed())).await;

    let mut config = Config::default();
    config.server.api.cors_origins = vec!["http://panel.local".to_string()];
    let app = create_router(tracker, Arc::new(config));

    let request = Request::builder()
        .uri("/health")
        .header("Origin", "http://panel.local")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(
        response.headers().get("access-control-allow-origin").unwrap(),
        "http://panel.local"
    );
}

#[tokio::test]
async fn test_cors_disabled() {
    let (_app, tracker, _temp_dir) = create_test_app(Arc::new(ScriptedInvoker::succeed())).await;

    let mut config = Config::default();
    config.server.api.cors_enabled = false;
    let app = create_router(tracker, Arc::new(config));

    let request = Request::builder()
        .uri("/health")
        .header("Origin", "http://localhost:3000")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert!(response.headers().get("access-control-allow-origin").is_none());
}

#[tokio::test]
async fn test_unknown_route_is_json_404() {
    let (app, _tracker, _temp_dir) = create_test_app(Arc::new(ScriptedInvoker::succeed())).await;

    let (status, body) = get_json(&app, "/api/nope").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_wrong_method_is_json_405() {
    let (app, _tracker, _temp_dir) = create_test_app(Arc::new(ScriptedInvoker::succeed())).await;

    for (method, uri) in [
        ("GET", "/api/download"),
        ("POST", "/api/files"),
        ("GET", "/api/delete/a.jpg"),
    ] {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(&app, request).await;
        let body: Value = serde_json::from_slice(&body).unwrap();

        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED, "{method} {uri}");
        assert_eq!(body["code"], "method_not_allowed", "{method} {uri}");
        assert!(body["error"].is_string(), "{method} {uri}");
    }
}

#[tokio::test]
async fn test_panic_response_is_json_500() {
    let response = panic_response(Box::new("boom"));
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["error"], "internal server error");
}

#[tokio::test]
async fn test_swagger_ui_enabled() {
    let (_app, tracker, _temp_dir) = create_test_app(Arc::new(ScriptedInvoker::succeed())).await;

    let mut config = Config::default();
    config.server.api.swagger_ui = true;
    let app = create_router(tracker, Arc::new(config));

    let request = Request::builder()
        .uri("/api-docs/openapi.json")
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
}
