use super::*;

#[tokio::test]
async fn test_health_check() {
    let (app, _tracker, _temp_dir) = create_test_app(Arc::new(ScriptedInvoker::succeed())).await;

    let (status, body) = get_json(&app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(body["invoker"], "scripted");
    assert_eq!(body["invoker_available"], true);
}

#[tokio::test]
async fn test_index_page() {
    let (app, _tracker, _temp_dir) = create_test_app(Arc::new(ScriptedInvoker::succeed())).await;

    let request = Request::builder().uri("/").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response.headers()["content-type"]
            .to_str()
            .unwrap()
            .starts_with("text/html")
    );
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert!(String::from_utf8_lossy(&body).contains("/api/download"));
}

#[tokio::test]
async fn test_openapi_spec() {
    let (app, _tracker, _temp_dir) = create_test_app(Arc::new(ScriptedInvoker::succeed())).await;

    let (status, body) = get_json(&app, "/openapi.json").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["openapi"].as_str().unwrap().starts_with('3'));
    assert!(body["paths"]["/api/download"].is_object());
}

#[tokio::test]
async fn test_sse_event_stream() {
    let (app, tracker, _temp_dir) = create_test_app(Arc::new(ScriptedInvoker::succeed())).await;

    let request = Request::builder()
        .uri("/api/events")
        .header("Accept", "text/event-stream")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");
    assert!(content_type.contains("text/event-stream"), "got {content_type}");

    // The handler subscribed before returning, so this event reaches the body
    tracker.start("https://example.test/album/123").await.unwrap();

    let mut body = response.into_body().into_data_stream();
    let chunk = tokio::time::timeout(Duration::from_secs(5), futures::StreamExt::next(&mut body))
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    let text = String::from_utf8_lossy(&chunk);
    assert!(text.contains("event: queued"), "got {text}");
    assert!(text.contains("\"type\":\"queued\""), "got {text}");
}
