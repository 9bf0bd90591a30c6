//! End-to-end HTTP flow through the public API with a scripted download tool.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use grab_panel::config::JobConfig;
use grab_panel::{Config, FileStore, JobTracker, ScriptedInvoker, api};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn poll_until_terminal(app: &Router, id: &str) -> Value {
    let uri = format!("/api/status/{id}");
    let mut last_rank = 0;

    for _ in 0..500 {
        let (status, job) = call(app, "GET", &uri, None).await;
        assert_eq!(status, StatusCode::OK);

        let rank = match job["status"].as_str().unwrap() {
            "pending" => 0,
            "running" => 1,
            "completed" | "failed" => 2,
            other => panic!("unexpected status {other}"),
        };
        assert!(rank >= last_rank, "status went backwards: {job}");
        last_rank = rank;

        if rank == 2 {
            return job;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("job {id} never finished");
}

async fn setup(invoker: ScriptedInvoker) -> (Router, tempfile::TempDir) {
    let temp_dir = tempfile::tempdir().unwrap();
    let store = FileStore::new(temp_dir.path().join("downloads"))
        .await
        .unwrap();
    let job_config = JobConfig {
        max_concurrent_jobs: 2,
        timeout: Duration::from_secs(5),
        source_marker: None,
    };
    let tracker = JobTracker::new(job_config, Arc::new(store), Arc::new(invoker));

    let app = api::create_router(Arc::new(tracker), Arc::new(Config::default()));
    (app, temp_dir)
}

#[tokio::test]
async fn download_list_fetch_delete_flow() {
    let (app, _temp_dir) =
        setup(ScriptedInvoker::succeed().with_file("a.jpg", vec![42u8; 10])).await;

    let (status, started) = call(
        &app,
        "POST",
        "/api/download",
        Some(serde_json::json!({"url": "https://example.test/album/123"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(started["status"], "started");
    let id = started["download_id"].as_str().unwrap().to_string();

    let job = poll_until_terminal(&app, &id).await;
    assert_eq!(job["status"], "completed");
    assert_eq!(job["files"][0]["name"], "a.jpg");
    assert_eq!(job["files"][0]["size"], 10);

    let (status, listing) = call(&app, "GET", "/api/files", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(
        listing["files"]
            .as_array()
            .unwrap()
            .iter()
            .any(|f| f["name"] == "a.jpg" && f["size"] == 10)
    );

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/download/a.jpg")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..], &[42u8; 10]);

    let (status, deleted) = call(&app, "DELETE", "/api/delete/a.jpg", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["status"], "deleted");

    let (status, again) = call(&app, "DELETE", "/api/delete/a.jpg", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(again["error"].is_string());
}

#[tokio::test]
async fn empty_url_is_rejected_without_creating_a_job() {
    let (app, _temp_dir) = setup(ScriptedInvoker::succeed()).await;

    let (status, body) = call(
        &app,
        "POST",
        "/api/download",
        Some(serde_json::json!({"url": ""})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (_, jobs) = call(&app, "GET", "/api/jobs", None).await;
    assert_eq!(jobs["jobs"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn failing_tool_reports_its_diagnostic() {
    let (app, _temp_dir) = setup(ScriptedInvoker::fail("bad link")).await;

    let (_, started) = call(
        &app,
        "POST",
        "/api/download",
        Some(serde_json::json!({"url": "https://example.test/album/123"})),
    )
    .await;
    let id = started["download_id"].as_str().unwrap().to_string();

    let job = poll_until_terminal(&app, &id).await;
    assert_eq!(job["status"], "failed");
    assert_eq!(job["error"], "bad link");
}

#[tokio::test]
async fn clear_forgets_jobs_and_files() {
    let (app, _temp_dir) =
        setup(ScriptedInvoker::succeed().with_file("set/b.png", vec![1u8; 3])).await;

    let (_, started) = call(
        &app,
        "POST",
        "/api/download",
        Some(serde_json::json!({"url": "https://example.test/album/9"})),
    )
    .await;
    let id = started["download_id"].as_str().unwrap().to_string();
    poll_until_terminal(&app, &id).await;

    let (status, cleared) = call(&app, "POST", "/api/clear", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cleared["status"], "cleared");

    let (_, listing) = call(&app, "GET", "/api/files", None).await;
    assert_eq!(listing["files"].as_array().unwrap().len(), 0);

    let (status, _) = call(&app, "GET", &format!("/api/status/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
