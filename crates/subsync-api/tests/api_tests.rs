//! API integration tests.
//!
//! These run against the real router with a filesystem-backed store in a
//! temp directory and a publisher that never connected, so every scenario
//! that does not need a live broker is covered end to end.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use tempfile::TempDir;
use tower::ServiceExt;

use subsync_api::{create_router, ApiConfig, AppState};
use subsync_bus::{BusConfig, EventPublisher};
use subsync_storage::{MediaStore, UploadPolicy};

fn test_app() -> (Router, TempDir) {
    let dir = tempfile::tempdir().unwrap();

    let policy = UploadPolicy::new(
        vec!["mp4".to_string(), "mov".to_string(), "avi".to_string()],
        1024 * 1024,
    );
    let store = MediaStore::local(dir.path(), policy);
    let bus = EventPublisher::new(BusConfig::default()).unwrap();

    let state = AppState::with_parts(ApiConfig::default(), Arc::new(store), Arc::new(bus));
    (create_router(state), dir)
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn multipart_request(uri: &str, filename: &str, content: &[u8]) -> Request<Body> {
    let boundary = "test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap()
}

fn stored_files(dir: &TempDir) -> Vec<String> {
    std::fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
        .collect()
}

#[tokio::test]
async fn test_index() {
    let (app, _dir) = test_app();

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], 200);
    assert_eq!(json["message"], "welcome to subsync api");
}

#[tokio::test]
async fn test_health() {
    let (app, _dir) = test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "200");
    assert_eq!(json["health"], "OK");
}

#[tokio::test]
async fn test_create_job_without_body_mints_fresh_ids() {
    let (app, _dir) = test_app();

    let mut ids = Vec::new();
    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/job")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["status"], 200);

        let id = json["job_id"].as_str().unwrap().to_string();
        assert!(uuid::Uuid::parse_str(&id).is_ok());
        ids.push(id);
    }

    assert_ne!(ids[0], ids[1]);
}

#[tokio::test]
async fn test_submit_with_empty_payload_is_rejected() {
    let (app, _dir) = test_app();

    for payload in ["{}", "null", "[]", "\"\""] {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/job")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(payload))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "payload: {payload}");
        let json = body_json(response).await;
        assert_eq!(json["error"], "No job data provided");
    }
}

#[tokio::test]
async fn test_submit_with_invalid_json_is_rejected() {
    let (app, _dir) = test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/job")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_submit_with_bus_down_returns_500_and_keeps_serving() {
    let (app, _dir) = test_app();

    // The test publisher never connected, so the publish must fail fast
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/job")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"note":"x"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert!(json["error"]
        .as_str()
        .unwrap()
        .starts_with("Failed to publish job"));

    // Process still serves health after the failed publish
    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_upload_stores_file_for_unknown_job_id() {
    let (app, dir) = test_app();

    // "abc123" was never created; upload accepts any non-empty id
    let response = app
        .oneshot(multipart_request(
            "/job/abc123/upload",
            "clip.avi",
            b"0123456789",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Video uploaded successfully");
    assert_eq!(json["job_id"], "abc123");
    assert_eq!(json["video_id"], "clip.avi");

    assert_eq!(stored_files(&dir), vec!["clip.avi".to_string()]);
}

#[tokio::test]
async fn test_upload_rejects_unsupported_type() {
    let (app, dir) = test_app();

    let response = app
        .oneshot(multipart_request("/job/abc123/upload", "notes.txt", b"hi"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "File type not supported");

    assert!(stored_files(&dir).is_empty());
}

#[tokio::test]
async fn test_upload_without_file_field_is_rejected() {
    let (app, dir) = test_app();

    let boundary = "test-boundary";
    let body = format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"other\"\r\n\r\nvalue\r\n--{boundary}--\r\n"
    );

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/job/abc123/upload")
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={boundary}"),
                )
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "No file provided");

    assert!(stored_files(&dir).is_empty());
}

#[tokio::test]
async fn test_upload_sanitizes_filename() {
    let (app, dir) = test_app();

    let response = app
        .oneshot(multipart_request(
            "/job/abc123/upload",
            "../../escape me.mp4",
            b"data",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["video_id"], "escape_me.mp4");

    assert_eq!(stored_files(&dir), vec!["escape_me.mp4".to_string()]);
}

/// Submit success path against a live broker: the 200 envelope comes back
/// and the notification stream holds exactly the published payload.
#[tokio::test]
#[ignore = "requires Redis"]
async fn test_submit_publishes_job_notification() {
    dotenvy::dotenv().ok();

    let dir = tempfile::tempdir().unwrap();
    let redis_url =
        std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string());
    // Per-run stream so parallel test runs do not see each other's events
    let stream_name = format!("job.notifications.test.{}", uuid::Uuid::new_v4().simple());

    let bus = EventPublisher::new(BusConfig {
        redis_url: redis_url.clone(),
        stream_name: stream_name.clone(),
    })
    .unwrap();
    bus.connect().await.expect("Failed to connect to Redis");

    let policy = UploadPolicy::new(
        vec!["mp4".to_string(), "mov".to_string(), "avi".to_string()],
        1024 * 1024,
    );
    let store = MediaStore::local(dir.path(), policy);
    let state = AppState::with_parts(ApiConfig::default(), Arc::new(store), Arc::new(bus));
    let app = create_router(state);

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/job")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"note":"x"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], 200);
    assert_eq!(json["message"], "Job submitted successfully!");
    let job_id = json["job"].as_str().unwrap().to_string();
    assert!(uuid::Uuid::parse_str(&job_id).is_ok());

    // Read the stream back and check the canonical envelope
    let client = redis::Client::open(redis_url.as_str()).unwrap();
    let mut conn = client.get_multiplexed_async_connection().await.unwrap();

    let reply: redis::streams::StreamRangeReply = redis::cmd("XRANGE")
        .arg(&stream_name)
        .arg("-")
        .arg("+")
        .query_async(&mut conn)
        .await
        .unwrap();

    assert_eq!(reply.ids.len(), 1);
    let payload = match reply.ids[0].map.get("event") {
        Some(redis::Value::BulkString(bytes)) => bytes.clone(),
        other => panic!("Unexpected stream entry: {:?}", other),
    };
    let event: serde_json::Value = serde_json::from_slice(&payload).unwrap();
    assert_eq!(event["status"], 200);
    assert_eq!(event["job_id"], job_id.as_str());

    redis::cmd("DEL")
        .arg(&stream_name)
        .query_async::<()>(&mut conn)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_ready_reports_degraded_bus() {
    let (app, _dir) = test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/ready")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let json = body_json(response).await;
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["checks"]["bus"]["status"], "error");
    assert_eq!(json["checks"]["storage"]["status"], "ok");
}
