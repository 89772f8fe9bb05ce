//! Common test utilities for pipeline integration tests
//!
//! Builds the full application router over in-memory state, with export
//! artifacts written to a per-test temporary directory, and provides
//! request builders plus polling helpers for watching background jobs.
//!
//! # Example
//!
//! ```no_run
//! mod common;
//! use common::TestApp;
//!
//! #[tokio::test]
//! async fn test_upload() {
//!     let app = TestApp::new();
//!     let response = common::send(&app, common::upload_request("students", "s.csv", b"...")).await;
//!     assert_eq!(response.status(), 201);
//! }
//! ```

use axum::body::{to_bytes, Body};
use axum::http::{header, Request};
use axum::response::Response;
use axum::Router;
use serde_json::Value;
use std::time::Duration;
use tower::ServiceExt;

use sis_server::store::{EntityStore, Record};
use sis_server::{AppState, Config};
use sis_common::types::ResourceType;

/// Multipart boundary used by [`upload_request`]
pub const BOUNDARY: &str = "sis-scenario-boundary";

/// Full application over in-memory state
///
/// Keeps the artifact temp directory alive for the duration of the test.
pub struct TestApp {
    pub state: AppState,
    _artifacts: tempfile::TempDir,
}

impl TestApp {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("artifact tempdir");
        let mut config = Config::default();
        config.pipeline.artifact_dir = dir.path().to_string_lossy().into_owned();
        Self {
            state: AppState::in_memory(config),
            _artifacts: dir,
        }
    }

    /// Fresh router over the shared state. `oneshot` consumes the router,
    /// so each request gets its own.
    pub fn router(&self) -> Router {
        sis_server::api::create_router(self.state.clone())
    }
}

/// Send one request through the full router.
pub async fn send(app: &TestApp, request: Request<Body>) -> Response {
    app.router().oneshot(request).await.expect("request failed")
}

/// Multipart upload request for `POST /api/v1/imports/{resource}`.
pub fn upload_request(resource: &str, filename: &str, content: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\n",
            filename
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method("POST")
        .uri(format!("/api/v1/imports/{}", resource))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .expect("upload request")
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).expect("get request")
}

pub fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("post request")
}

pub fn post_empty(uri: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .expect("post request")
}

pub async fn body_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body bytes");
    serde_json::from_slice(&bytes).expect("body json")
}

pub async fn body_bytes(response: Response) -> Vec<u8> {
    to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes")
        .to_vec()
}

/// Poll `GET /api/v1/imports/{id}` until the snapshot satisfies `pred`.
pub async fn poll_import_until(
    app: &TestApp,
    id: &str,
    pred: impl Fn(&Value) -> bool,
) -> Value {
    for _ in 0..400 {
        let response = send(app, get(&format!("/api/v1/imports/{}", id))).await;
        let json = body_json(response).await;
        if pred(&json["data"]) {
            return json["data"].clone();
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("import job {} never satisfied the predicate", id);
}

/// Poll `GET /api/v1/exports/{id}` until the snapshot satisfies `pred`.
pub async fn poll_export_until(
    app: &TestApp,
    id: &str,
    pred: impl Fn(&Value) -> bool,
) -> Value {
    for _ in 0..400 {
        let response = send(app, get(&format!("/api/v1/exports/{}", id))).await;
        let json = body_json(response).await;
        if pred(&json["data"]) {
            return json["data"].clone();
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("export job {} never satisfied the predicate", id);
}

pub fn status_is(status: &'static str) -> impl Fn(&Value) -> bool {
    move |snapshot| snapshot["status"] == status
}

pub fn is_terminal_import(snapshot: &Value) -> bool {
    matches!(
        snapshot["status"].as_str(),
        Some("completed") | Some("failed") | Some("cancelled")
    )
}

pub fn is_terminal_export(snapshot: &Value) -> bool {
    matches!(snapshot["status"].as_str(), Some("completed") | Some("failed"))
}

/// Seed one student directly into the entity store.
pub async fn seed_student(state: &AppState, code: &str, first: &str, email: &str) {
    let mut record = Record::new();
    record.insert("student_code".to_string(), code.to_string());
    record.insert("first_name".to_string(), first.to_string());
    record.insert("last_name".to_string(), "Seeded".to_string());
    record.insert("email".to_string(), email.to_string());
    state
        .entities
        .insert(ResourceType::Students, code, record)
        .await
        .expect("seed student");
}
