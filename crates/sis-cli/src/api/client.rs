//! HTTP API client for the SIS server
//!
//! Provides methods to interact with the bulk import/export API.

use reqwest::multipart;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;
use uuid::Uuid;

use crate::api::types::{
    CommitRequest, CreateExportRequest, Envelope, PaginationMeta, PreviewResponse,
};
use crate::api::endpoints;
use crate::error::{CliError, Result};
use sis_common::types::{ExportJob, ImportJob};

// ============================================================================
// API Client Constants
// ============================================================================

/// Default timeout for API requests in seconds.
/// Can be overridden via SIS_API_TIMEOUT_SECS environment variable.
/// Set to 5 minutes to accommodate large uploads and artifact downloads.
pub const DEFAULT_API_TIMEOUT_SECS: u64 = 300;

/// Default SIS server URL when not specified via environment variable.
pub const DEFAULT_SERVER_URL: &str = "http://localhost:8000";

/// API client for the SIS server
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(base_url: String) -> Result<Self> {
        let timeout_secs = std::env::var("SIS_API_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_API_TIMEOUT_SECS);

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self { client, base_url })
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        let base_url =
            std::env::var("SIS_SERVER_URL").unwrap_or_else(|_| DEFAULT_SERVER_URL.to_string());

        Self::new(base_url)
    }

    /// Check server health
    pub async fn health_check(&self) -> Result<bool> {
        let url = endpoints::health_url(&self.base_url);

        match self.client.get(&url).send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    /// Upload a source file, creating an import job
    pub async fn upload_import(
        &self,
        resource_type: &str,
        filename: &str,
        bytes: Vec<u8>,
        format: Option<&str>,
    ) -> Result<ImportJob> {
        let url = endpoints::import_upload_url(&self.base_url, resource_type, format);

        let part = multipart::Part::bytes(bytes).file_name(filename.to_string());
        let form = multipart::Form::new().part("file", part);

        let response = self.client.post(&url).multipart(form).send().await?;
        self.expect_data(response).await
    }

    /// Get an import job snapshot
    pub async fn get_import_job(&self, job_id: Uuid) -> Result<ImportJob> {
        let url = endpoints::import_job_url(&self.base_url, job_id);
        let response = self.client.get(&url).send().await?;
        self.expect_data(response).await
    }

    /// Preview an import under the given options
    pub async fn preview_import(
        &self,
        job_id: Uuid,
        allow_updates: bool,
        skip_duplicates: bool,
    ) -> Result<PreviewResponse> {
        let url =
            endpoints::import_preview_url(&self.base_url, job_id, allow_updates, skip_duplicates);
        let response = self.client.get(&url).send().await?;
        self.expect_data(response).await
    }

    /// Commit a ready import job
    pub async fn commit_import(&self, job_id: Uuid, request: &CommitRequest) -> Result<ImportJob> {
        let url = endpoints::import_commit_url(&self.base_url, job_id);
        let response = self.client.post(&url).json(request).send().await?;
        self.expect_data(response).await
    }

    /// Cancel a ready import job
    pub async fn cancel_import(&self, job_id: Uuid) -> Result<ImportJob> {
        let url = endpoints::import_cancel_url(&self.base_url, job_id);
        let response = self.client.post(&url).send().await?;
        self.expect_data(response).await
    }

    /// List import jobs
    pub async fn list_import_jobs(
        &self,
        status: Option<&str>,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<(Vec<ImportJob>, Option<PaginationMeta>)> {
        let url = endpoints::import_list_url(&self.base_url, status, limit, offset);
        let response = self.client.get(&url).send().await?;
        self.expect_page(response).await
    }

    /// Create an export job
    pub async fn create_export(&self, request: &CreateExportRequest) -> Result<ExportJob> {
        let url = endpoints::export_create_url(&self.base_url);
        let response = self.client.post(&url).json(request).send().await?;
        self.expect_data(response).await
    }

    /// Get an export job snapshot
    pub async fn get_export_job(&self, job_id: Uuid) -> Result<ExportJob> {
        let url = endpoints::export_job_url(&self.base_url, job_id);
        let response = self.client.get(&url).send().await?;
        self.expect_data(response).await
    }

    /// Request cancellation of an export job
    pub async fn cancel_export(&self, job_id: Uuid) -> Result<ExportJob> {
        let url = endpoints::export_cancel_url(&self.base_url, job_id);
        let response = self.client.post(&url).send().await?;
        self.expect_data(response).await
    }

    /// List export jobs
    pub async fn list_export_jobs(
        &self,
        status: Option<&str>,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<(Vec<ExportJob>, Option<PaginationMeta>)> {
        let url = endpoints::export_list_url(&self.base_url, status, limit, offset);
        let response = self.client.get(&url).send().await?;
        self.expect_page(response).await
    }

    /// Download a completed export artifact
    ///
    /// Returns the server-suggested filename and the artifact bytes.
    pub async fn download_export(&self, job_id: Uuid) -> Result<(String, Vec<u8>)> {
        let url = endpoints::export_download_url(&self.base_url, job_id);
        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            let bytes = response.bytes().await?;
            let envelope: Envelope<serde_json::Value> = parse_envelope(status, &bytes)?;
            if let Some(error) = envelope.error {
                return Err(CliError::server(error.code, error.message));
            }
            return Err(CliError::api(format!("unexpected HTTP {}", status)));
        }

        let filename = response
            .headers()
            .get(reqwest::header::CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(filename_from_disposition)
            .unwrap_or_else(|| format!("export-{}", job_id));

        let bytes = response.bytes().await?.to_vec();
        Ok((filename, bytes))
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn expect_data<T: DeserializeOwned>(&self, response: reqwest::Response) -> Result<T> {
        let status = response.status();
        let bytes = response.bytes().await?;
        let envelope: Envelope<T> = parse_envelope(status, &bytes)?;

        if let Some(error) = envelope.error {
            return Err(CliError::server(error.code, error.message));
        }
        envelope
            .data
            .ok_or_else(|| CliError::api("response was missing its data payload".to_string()))
    }

    async fn expect_page<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<(Vec<T>, Option<PaginationMeta>)> {
        let status = response.status();
        let bytes = response.bytes().await?;
        let envelope: Envelope<Vec<T>> = parse_envelope(status, &bytes)?;

        if let Some(error) = envelope.error {
            return Err(CliError::server(error.code, error.message));
        }
        let jobs = envelope
            .data
            .ok_or_else(|| CliError::api("response was missing its data payload".to_string()))?;
        let pagination = envelope
            .meta
            .as_ref()
            .and_then(|meta| meta.get("pagination"))
            .and_then(|p| serde_json::from_value(p.clone()).ok());
        Ok((jobs, pagination))
    }
}

/// Parse an enveloped body; non-success statuses with unparseable bodies
/// become a generic API error instead of a JSON error.
fn parse_envelope<T: DeserializeOwned>(
    status: reqwest::StatusCode,
    bytes: &[u8],
) -> Result<Envelope<T>> {
    match serde_json::from_slice(bytes) {
        Ok(envelope) => Ok(envelope),
        Err(err) => {
            if status.is_success() {
                Err(err.into())
            } else {
                Err(CliError::api(format!("unexpected HTTP {}", status)))
            }
        },
    }
}

/// Extract the quoted filename from a Content-Disposition header value.
fn filename_from_disposition(value: &str) -> Option<String> {
    let start = value.find("filename=\"")? + "filename=\"".len();
    let rest = &value[start..];
    let end = rest.find('"')?;
    Some(rest[..end].to_string())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_api_client_creation() {
        let client = ApiClient::new("http://localhost:8000".to_string()).unwrap();
        assert_eq!(client.base_url(), "http://localhost:8000");
    }

    #[test]
    fn test_filename_from_disposition() {
        assert_eq!(
            filename_from_disposition("attachment; filename=\"students-abc.csv\""),
            Some("students-abc.csv".to_string())
        );
        assert_eq!(filename_from_disposition("inline"), None);
    }

    #[tokio::test]
    async fn test_health_check_unreachable() {
        let client = ApiClient::new("http://localhost:9999".to_string()).unwrap();
        let result = client.health_check().await.unwrap();
        assert!(!result);
    }

    #[tokio::test]
    async fn error_envelopes_become_server_errors() {
        let server = MockServer::start().await;
        let job_id = Uuid::new_v4();

        Mock::given(method("GET"))
            .and(path(format!("/api/v1/imports/{}", job_id)))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "success": false,
                "error": {"code": "NOT_FOUND", "message": "Import job not found"}
            })))
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri()).unwrap();
        let err = client.get_import_job(job_id).await.unwrap_err();
        match err {
            CliError::Server { code, message } => {
                assert_eq!(code, "NOT_FOUND");
                assert!(message.contains("not found"));
            },
            other => panic!("expected server error, got {other}"),
        }
    }

    #[tokio::test]
    async fn non_envelope_error_bodies_become_api_errors() {
        let server = MockServer::start().await;
        let job_id = Uuid::new_v4();

        Mock::given(method("GET"))
            .and(path(format!("/api/v1/exports/{}", job_id)))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri()).unwrap();
        let err = client.get_export_job(job_id).await.unwrap_err();
        assert!(matches!(err, CliError::Api(_)));
        assert!(err.to_string().contains("502"));
    }
}
