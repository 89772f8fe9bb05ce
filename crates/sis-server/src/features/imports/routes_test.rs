//! Integration tests for import routes
//!
//! These tests drive the import endpoints through the router with an
//! in-memory entity store.

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
        Router,
    };
    use serde_json::Value;
    use tower::ServiceExt;
    use uuid::Uuid;

    use crate::config::Config;
    use crate::features::imports::imports_routes;
    use crate::state::AppState;
    use sis_common::types::{ImportJob, ImportStatus, ResourceType, SourceFormat};

    const BOUNDARY: &str = "sis-test-boundary";

    /// Helper to create a test router
    fn create_test_router(state: AppState) -> Router {
        imports_routes().with_state(state)
    }

    fn multipart_body(filename: &str, content: &[u8]) -> Vec<u8> {
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
        body
    }

    fn upload_request(uri: &str, filename: &str, content: &[u8]) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(multipart_body(filename, content)))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    /// Insert a job and walk it to `ready` through the store.
    async fn seed_ready_job(state: &AppState, csv: &[u8]) -> Uuid {
        let job = ImportJob::new(ResourceType::Students, SourceFormat::Csv);
        let id = job.id;
        state.import_jobs.insert(job).await;
        state.uploads.put(id, csv.to_vec()).await;
        state
            .import_jobs
            .transition(id, ImportStatus::Validating)
            .await
            .unwrap();
        state.import_jobs.transition(id, ImportStatus::Ready).await.unwrap();
        id
    }

    #[tokio::test]
    async fn test_upload_returns_pending_snapshot() {
        let state = AppState::in_memory(Config::default());
        let app = create_test_router(state);

        let response = app
            .oneshot(upload_request(
                "/students",
                "students.csv",
                b"student_code,first_name,last_name,email\nS001,Ana,Silva,ana@example.edu\n",
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let json = body_json(response).await;
        assert_eq!(json["success"], true);
        assert_eq!(json["data"]["status"], "pending");
        assert_eq!(json["data"]["resource_type"], "students");
    }

    #[tokio::test]
    async fn test_upload_unknown_resource_type() {
        let state = AppState::in_memory(Config::default());
        let app = create_test_router(state);

        let response = app
            .oneshot(upload_request("/staff", "staff.csv", b"a,b\n1,2\n"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_upload_needs_format_when_extension_is_opaque() {
        let state = AppState::in_memory(Config::default());

        let response = create_test_router(state.clone())
            .oneshot(upload_request("/students", "export.bin", b"a,b\n1,2\n"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        // Same payload with an explicit override goes through.
        let response = create_test_router(state)
            .oneshot(upload_request("/students?format=csv", "export.bin", b"a,b\n1,2\n"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_get_job_not_found() {
        let state = AppState::in_memory(Config::default());
        let app = create_test_router(state);

        let response = app
            .oneshot(
                Request::builder()
                    .uri(&format!("/{}", Uuid::new_v4()))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_get_job_rejects_malformed_id() {
        let state = AppState::in_memory(Config::default());
        let app = create_test_router(state);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/not-a-job-id")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_list_jobs_carries_pagination_meta() {
        let state = AppState::in_memory(Config::default());
        for _ in 0..3 {
            state
                .import_jobs
                .insert(ImportJob::new(ResourceType::Courses, SourceFormat::Json))
                .await;
        }
        let app = create_test_router(state);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/?limit=2&offset=0")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["data"].as_array().unwrap().len(), 2);
        assert_eq!(json["meta"]["pagination"]["total"], 3);
        assert_eq!(json["meta"]["pagination"]["has_more"], true);
    }

    #[tokio::test]
    async fn test_list_jobs_rejects_unknown_status() {
        let state = AppState::in_memory(Config::default());
        let app = create_test_router(state);

        let response = app
            .oneshot(Request::builder().uri("/?status=done").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_cancel_ready_job() {
        let state = AppState::in_memory(Config::default());
        let id = seed_ready_job(&state, b"student_code\nS001\n").await;
        let app = create_test_router(state.clone());

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(&format!("/{}/cancel", id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["data"]["status"], "cancelled");
        assert!(state.uploads.get(id).await.is_none());
    }

    #[tokio::test]
    async fn test_cancel_pending_job_conflicts() {
        let state = AppState::in_memory(Config::default());
        let job = ImportJob::new(ResourceType::Students, SourceFormat::Csv);
        let id = job.id;
        state.import_jobs.insert(job).await;
        let app = create_test_router(state);

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(&format!("/{}/cancel", id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CONFLICT);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "INVALID_STATE_TRANSITION");
    }

    #[tokio::test]
    async fn test_commit_blocked_by_errors_conflicts() {
        let state = AppState::in_memory(Config::default());
        // Second row is missing the required email.
        let id = seed_ready_job(
            &state,
            b"student_code,first_name,last_name,email\nS001,Ana,Silva,ana@example.edu\nS002,Bo,Chen,\n",
        )
        .await;
        let app = create_test_router(state);

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri(&format!("/{}/commit", id))
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("{}"))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CONFLICT);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(json["error"]["details"]["rows_with_errors"], 1);
    }

    #[tokio::test]
    async fn test_preview_honors_option_flags() {
        let state = AppState::in_memory(Config::default());
        let id = seed_ready_job(
            &state,
            b"student_code,first_name,last_name,email\nS001,Ana,Silva,ana@example.edu\nS001,Ana,Silva,ana@example.edu\n",
        )
        .await;
        let app = create_test_router(state);

        let response = app
            .oneshot(
                Request::builder()
                    .uri(&format!("/{}/preview?skip_duplicates=true", id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["data"]["total_rows"], 2);
        assert_eq!(json["data"]["summary"]["skip"], 1);
        assert_eq!(json["data"]["can_proceed"], true);
    }
}
