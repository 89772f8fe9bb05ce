//! End-to-end import pipeline tests
//!
//! These tests drive the full router: upload, background validation,
//! preview, commit or cancel, and terminal polling.

use axum::http::StatusCode;
use serde_json::json;
use sis_common::types::ResourceType;
use sis_server::store::EntityStore;

mod common;
use common::{
    body_json, get, is_terminal_import, poll_import_until, post_empty, post_json, send,
    status_is, upload_request, TestApp,
};

const STUDENTS_CSV: &str = "\
student_code,first_name,last_name,email
S001,Ana,Silva,ana@example.edu
S002,Bo,Chen,bo@example.edu
S003,Caro,Diaz,caro@example.edu
";

async fn upload_and_wait_ready(app: &TestApp, csv: &str) -> String {
    let response = send(app, upload_request("students", "students.csv", csv.as_bytes())).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    let id = created["data"]["id"].as_str().expect("job id").to_string();

    poll_import_until(app, &id, status_is("ready")).await;
    id
}

#[tokio::test]
async fn clean_import_commits_every_row() {
    let app = TestApp::new();
    let id = upload_and_wait_ready(&app, STUDENTS_CSV).await;

    let response = send(
        &app,
        get(&format!(
            "/api/v1/imports/{}/preview?allow_updates=false&skip_duplicates=true",
            id
        )),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let preview = body_json(response).await;
    assert_eq!(preview["data"]["total_rows"], 3);
    assert_eq!(preview["data"]["summary"]["create"], 3);
    assert_eq!(preview["data"]["rows_with_errors"], 0);
    assert_eq!(preview["data"]["can_proceed"], true);

    let response = send(
        &app,
        post_json(
            &format!("/api/v1/imports/{}/commit", id),
            json!({"skip_duplicates": true}),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let done = poll_import_until(&app, &id, is_terminal_import).await;
    assert_eq!(done["status"], "completed");
    assert_eq!(done["successful_rows"], 3);
    assert_eq!(done["failed_rows"], 0);
    assert_eq!(done["total_rows"], 3);

    let record = app
        .state
        .entities
        .get(ResourceType::Students, "S002")
        .await
        .expect("store reachable")
        .expect("record written");
    assert_eq!(record.get("first_name").map(String::as_str), Some("Bo"));
}

#[tokio::test]
async fn duplicate_rows_become_skips_not_errors() {
    let app = TestApp::new();
    let csv = "\
student_code,first_name,last_name,email
S001,Ana,Silva,ana@example.edu
S001,Ana,Silva,ana@example.edu
";
    let id = upload_and_wait_ready(&app, csv).await;

    let response = send(
        &app,
        get(&format!("/api/v1/imports/{}/preview?skip_duplicates=true", id)),
    )
    .await;
    let preview = body_json(response).await;

    assert_eq!(preview["data"]["summary"]["create"], 1);
    assert_eq!(preview["data"]["summary"]["skip"], 1);
    assert_eq!(preview["data"]["can_proceed"], true);

    let second = &preview["data"]["rows"][1];
    assert_eq!(second["row_number"], 2);
    assert_eq!(second["action"], "skip");
    assert_eq!(second["validation_status"], "warning");
    assert_eq!(second["issues"][0]["kind"], "duplicate");
}

#[tokio::test]
async fn commit_is_blocked_by_error_rows_and_leaves_status_alone() {
    let app = TestApp::new();
    let csv = "\
student_code,first_name,last_name,email
S001,Ana,Silva,
";
    let id = upload_and_wait_ready(&app, csv).await;

    let response = send(&app, get(&format!("/api/v1/imports/{}/preview", id))).await;
    let preview = body_json(response).await;
    assert_eq!(preview["data"]["rows_with_errors"], 1);
    assert_eq!(preview["data"]["can_proceed"], false);

    let response = send(
        &app,
        post_json(&format!("/api/v1/imports/{}/commit", id), json!({})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let error = body_json(response).await;
    assert_eq!(error["error"]["details"]["rows_with_errors"], 1);

    // The refused commit must not have moved the job.
    let snapshot = body_json(send(&app, get(&format!("/api/v1/imports/{}", id))).await).await;
    assert_eq!(snapshot["data"]["status"], "ready");
}

#[tokio::test]
async fn skip_errors_commit_counts_failures_and_totals_balance() {
    let app = TestApp::new();
    let csv = "\
student_code,first_name,last_name,email
S001,Ana,Silva,ana@example.edu
S002,Bo,Chen,not-an-email
S003,Caro,Diaz,caro@example.edu
";
    let id = upload_and_wait_ready(&app, csv).await;

    let response = send(
        &app,
        post_json(
            &format!("/api/v1/imports/{}/commit", id),
            json!({"skip_errors": true}),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let done = poll_import_until(&app, &id, is_terminal_import).await;
    assert_eq!(done["status"], "completed");
    assert_eq!(done["successful_rows"], 2);
    assert_eq!(done["failed_rows"], 1);
    assert_eq!(
        done["successful_rows"].as_u64().unwrap() + done["failed_rows"].as_u64().unwrap(),
        done["total_rows"].as_u64().unwrap()
    );

    // The failing row kept its issue in the job record.
    assert_eq!(done["validation_issues"]["2"][0]["kind"], "invalid_value");

    // The invalid row was never written.
    let missing = app
        .state
        .entities
        .get(ResourceType::Students, "S002")
        .await
        .expect("store reachable");
    assert!(missing.is_none());
}

#[tokio::test]
async fn terminal_snapshots_are_byte_identical() {
    let app = TestApp::new();
    let id = upload_and_wait_ready(&app, STUDENTS_CSV).await;

    send(
        &app,
        post_json(&format!("/api/v1/imports/{}/commit", id), json!({})),
    )
    .await;
    poll_import_until(&app, &id, is_terminal_import).await;

    let first = common::body_bytes(send(&app, get(&format!("/api/v1/imports/{}", id))).await).await;
    let second = common::body_bytes(send(&app, get(&format!("/api/v1/imports/{}", id))).await).await;
    let third = common::body_bytes(send(&app, get(&format!("/api/v1/imports/{}", id))).await).await;
    assert_eq!(first, second);
    assert_eq!(second, third);
}

#[tokio::test]
async fn repeated_previews_report_identical_issue_rows() {
    let app = TestApp::new();
    let csv = "\
student_code,first_name,last_name,email
S001,Ana,Silva,ana@example.edu
S002,Bo,Chen,bad-address
S003,,Diaz,caro@example.edu
";
    let id = upload_and_wait_ready(&app, csv).await;
    let uri = format!("/api/v1/imports/{}/preview", id);

    let first = body_json(send(&app, get(&uri)).await).await;
    let second = body_json(send(&app, get(&uri)).await).await;

    assert_eq!(first, second);
    assert_eq!(first["data"]["rows_with_errors"], 2);
    assert_eq!(first["data"]["rows"][1]["row_number"], 2);
    assert_eq!(first["data"]["rows"][2]["row_number"], 3);
}

#[tokio::test]
async fn cancelled_job_refuses_commit_and_further_cancels() {
    let app = TestApp::new();
    let id = upload_and_wait_ready(&app, STUDENTS_CSV).await;

    let response = send(&app, post_empty(&format!("/api/v1/imports/{}/cancel", id))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let cancelled = body_json(response).await;
    assert_eq!(cancelled["data"]["status"], "cancelled");

    let response = send(
        &app,
        post_json(&format!("/api/v1/imports/{}/commit", id), json!({})),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = send(&app, post_empty(&format!("/api/v1/imports/{}/cancel", id))).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let snapshot = body_json(send(&app, get(&format!("/api/v1/imports/{}", id))).await).await;
    assert_eq!(snapshot["data"]["status"], "cancelled");
}

#[tokio::test]
async fn duplicate_header_fails_validation() {
    let app = TestApp::new();
    let csv = "\
student_code,email,email
S001,ana@example.edu,ana@example.edu
";
    let response = send(&app, upload_request("students", "students.csv", csv.as_bytes())).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    let id = created["data"]["id"].as_str().expect("job id").to_string();

    let failed = poll_import_until(&app, &id, is_terminal_import).await;
    assert_eq!(failed["status"], "failed");
    let message = failed["error_message"].as_str().expect("error message");
    assert!(message.contains("duplicate column"), "unexpected message: {message}");
}

#[tokio::test]
async fn updates_require_allow_updates_flag() {
    let app = TestApp::new();
    common::seed_student(&app.state, "S001", "Old", "old@example.edu").await;

    let csv = "\
student_code,first_name,last_name,email
S001,New,Name,new@example.edu
";
    let id = upload_and_wait_ready(&app, csv).await;

    // Without the flag the row is skipped with a duplicate warning.
    let preview =
        body_json(send(&app, get(&format!("/api/v1/imports/{}/preview", id))).await).await;
    assert_eq!(preview["data"]["summary"]["skip"], 1);
    assert_eq!(preview["data"]["rows"][0]["issues"][0]["kind"], "duplicate");

    // With the flag it becomes an update, and committing applies it.
    let preview = body_json(
        send(
            &app,
            get(&format!("/api/v1/imports/{}/preview?allow_updates=true", id)),
        )
        .await,
    )
    .await;
    assert_eq!(preview["data"]["summary"]["update"], 1);

    let response = send(
        &app,
        post_json(
            &format!("/api/v1/imports/{}/commit", id),
            json!({"allow_updates": true}),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let done = poll_import_until(&app, &id, is_terminal_import).await;
    assert_eq!(done["status"], "completed");
    assert_eq!(done["successful_rows"], 1);

    let record = app
        .state
        .entities
        .get(ResourceType::Students, "S001")
        .await
        .expect("store reachable")
        .expect("record present");
    assert_eq!(record.get("first_name").map(String::as_str), Some("New"));
}
