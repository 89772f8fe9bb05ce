//! API endpoint URL builders
//!
//! Helper functions to construct API endpoint URLs.

use uuid::Uuid;

/// Build health check URL
pub fn health_url(base_url: &str) -> String {
    format!("{}/health", base_url)
}

/// Build import upload URL, with an optional format override
pub fn import_upload_url(base_url: &str, resource_type: &str, format: Option<&str>) -> String {
    let mut url = format!("{}/api/v1/imports/{}", base_url, resource_type);
    if let Some(f) = format {
        url.push_str(&format!("?format={}", f));
    }
    url
}

/// Build import job snapshot URL
pub fn import_job_url(base_url: &str, job_id: Uuid) -> String {
    format!("{}/api/v1/imports/{}", base_url, job_id)
}

/// Build import preview URL
pub fn import_preview_url(
    base_url: &str,
    job_id: Uuid,
    allow_updates: bool,
    skip_duplicates: bool,
) -> String {
    format!(
        "{}/api/v1/imports/{}/preview?allow_updates={}&skip_duplicates={}",
        base_url, job_id, allow_updates, skip_duplicates
    )
}

/// Build import commit URL
pub fn import_commit_url(base_url: &str, job_id: Uuid) -> String {
    format!("{}/api/v1/imports/{}/commit", base_url, job_id)
}

/// Build import cancel URL
pub fn import_cancel_url(base_url: &str, job_id: Uuid) -> String {
    format!("{}/api/v1/imports/{}/cancel", base_url, job_id)
}

/// Build import job list URL
pub fn import_list_url(
    base_url: &str,
    status: Option<&str>,
    limit: Option<i64>,
    offset: Option<i64>,
) -> String {
    format!("{}/api/v1/imports{}", base_url, list_query(status, limit, offset))
}

/// Build export creation URL
pub fn export_create_url(base_url: &str) -> String {
    format!("{}/api/v1/exports", base_url)
}

/// Build export job snapshot URL
pub fn export_job_url(base_url: &str, job_id: Uuid) -> String {
    format!("{}/api/v1/exports/{}", base_url, job_id)
}

/// Build export cancel URL
pub fn export_cancel_url(base_url: &str, job_id: Uuid) -> String {
    format!("{}/api/v1/exports/{}/cancel", base_url, job_id)
}

/// Build export artifact download URL
pub fn export_download_url(base_url: &str, job_id: Uuid) -> String {
    format!("{}/api/v1/exports/{}/download", base_url, job_id)
}

/// Build export job list URL
pub fn export_list_url(
    base_url: &str,
    status: Option<&str>,
    limit: Option<i64>,
    offset: Option<i64>,
) -> String {
    format!("{}/api/v1/exports{}", base_url, list_query(status, limit, offset))
}

fn list_query(status: Option<&str>, limit: Option<i64>, offset: Option<i64>) -> String {
    let mut params = Vec::new();
    if let Some(s) = status {
        params.push(format!("status={}", s));
    }
    if let Some(l) = limit {
        params.push(format!("limit={}", l));
    }
    if let Some(o) = offset {
        params.push(format!("offset={}", o));
    }
    if params.is_empty() {
        String::new()
    } else {
        format!("?{}", params.join("&"))
    }
}
