use crate::api::response::{ApiResponse, ErrorResponse, PaginationMeta};
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use sis_common::types::{ExportFormat, ExportStatus, Pagination, ResourceType};
use sis_common::SisError;
use std::collections::BTreeMap;
use uuid::Uuid;

use super::commands::{CancelExportCommand, CreateExportCommand, CreateExportError};
use super::queries::{DownloadExportError, DownloadExportQuery, GetExportJobQuery, ListExportJobsQuery};

pub fn exports_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_export).get(list_export_jobs))
        .route("/:job_id", get(get_export_job))
        .route("/:job_id/cancel", post(cancel_export))
        .route("/:job_id/download", get(download_export))
}

#[derive(Debug, Deserialize)]
struct CreateBody {
    resource_type: String,
    file_format: String,
    #[serde(default)]
    filters: BTreeMap<String, String>,
    limit: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct ListParams {
    status: Option<String>,
    limit: Option<i64>,
    offset: Option<i64>,
}

fn parse_job_id(key: &str) -> Result<Uuid, ExportsApiError> {
    Uuid::parse_str(key)
        .map_err(|_| ExportsApiError::BadRequest(format!("Invalid job id: {}", key)))
}

#[tracing::instrument(skip(state, body))]
async fn create_export(
    State(state): State<AppState>,
    Json(body): Json<CreateBody>,
) -> Result<Response, ExportsApiError> {
    let resource_type: ResourceType =
        body.resource_type.parse().map_err(ExportsApiError::BadRequest)?;
    let file_format: ExportFormat =
        body.file_format.parse().map_err(ExportsApiError::BadRequest)?;

    let command = CreateExportCommand {
        resource_type,
        file_format,
        filters: body.filters,
        limit: body.limit,
    };

    let job = super::commands::create::handle(state, command).await?;

    tracing::info!(job_id = %job.id, "Export job created via API");

    Ok((StatusCode::CREATED, Json(ApiResponse::success(job))).into_response())
}

async fn get_export_job(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Response, ExportsApiError> {
    let job_id = parse_job_id(&key)?;
    let job = super::queries::get_job::handle(state, GetExportJobQuery { job_id }).await?;

    Ok((StatusCode::OK, Json(ApiResponse::success(job))).into_response())
}

async fn cancel_export(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Response, ExportsApiError> {
    let job_id = parse_job_id(&key)?;
    let job = super::commands::cancel::handle(state, CancelExportCommand { job_id }).await?;

    Ok((StatusCode::OK, Json(ApiResponse::success(job))).into_response())
}

async fn download_export(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Response, ExportsApiError> {
    let job_id = parse_job_id(&key)?;
    let artifact = super::queries::download::handle(state, DownloadExportQuery { job_id }).await?;

    tracing::debug!(job_id = %job_id, size = artifact.bytes.len(), "Export artifact served");

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, artifact.content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", artifact.filename),
            ),
        ],
        artifact.bytes,
    )
        .into_response())
}

async fn list_export_jobs(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Response, ExportsApiError> {
    let status = match params.status.as_deref() {
        Some(raw) => Some(raw.parse::<ExportStatus>().map_err(ExportsApiError::BadRequest)?),
        None => None,
    };
    let pagination = Pagination::new(
        params.limit.unwrap_or(50).clamp(1, 500),
        params.offset.unwrap_or(0).max(0),
    );

    let response = super::queries::list_jobs::handle(
        state,
        ListExportJobsQuery { status, pagination },
    )
    .await?;

    let meta = json!({
        "pagination": PaginationMeta::new(pagination.limit, pagination.offset, response.total as i64),
    });

    Ok((StatusCode::OK, Json(ApiResponse::success_with_meta(response.jobs, meta))).into_response())
}

#[derive(Debug)]
enum ExportsApiError {
    BadRequest(String),
    Create(CreateExportError),
    Download(DownloadExportError),
    Job(SisError),
}

impl From<CreateExportError> for ExportsApiError {
    fn from(err: CreateExportError) -> Self {
        Self::Create(err)
    }
}

impl From<DownloadExportError> for ExportsApiError {
    fn from(err: DownloadExportError) -> Self {
        Self::Download(err)
    }
}

impl From<SisError> for ExportsApiError {
    fn from(err: SisError) -> Self {
        Self::Job(err)
    }
}

impl IntoResponse for ExportsApiError {
    fn into_response(self) -> Response {
        match self {
            ExportsApiError::BadRequest(_) | ExportsApiError::Create(_) => {
                let error = ErrorResponse::new("VALIDATION_ERROR", self.to_string());
                (StatusCode::BAD_REQUEST, Json(error)).into_response()
            },
            ExportsApiError::Download(DownloadExportError::NotCompleted(_)) => {
                let error = ErrorResponse::new("PRECONDITION_FAILED", self.to_string());
                (StatusCode::PRECONDITION_FAILED, Json(error)).into_response()
            },
            ExportsApiError::Download(DownloadExportError::MissingArtifact)
            | ExportsApiError::Download(DownloadExportError::Io(_)) => {
                tracing::error!("Artifact error during export download: {}", self);
                let error = ErrorResponse::new("INTERNAL_ERROR", "Artifact could not be read");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(error)).into_response()
            },
            ExportsApiError::Download(DownloadExportError::Job(e)) | ExportsApiError::Job(e) => {
                job_error_response(e)
            },
        }
    }
}

fn job_error_response(err: SisError) -> Response {
    match err {
        SisError::JobNotFound(_) => {
            let error = ErrorResponse::new("NOT_FOUND", err.to_string());
            (StatusCode::NOT_FOUND, Json(error)).into_response()
        },
        SisError::InvalidStateTransition { .. } => {
            let error = ErrorResponse::new("INVALID_STATE_TRANSITION", err.to_string());
            (StatusCode::CONFLICT, Json(error)).into_response()
        },
        _ => {
            tracing::error!("Job store error: {}", err);
            let error = ErrorResponse::new("INTERNAL_ERROR", "An internal error occurred");
            (StatusCode::INTERNAL_SERVER_ERROR, Json(error)).into_response()
        },
    }
}

impl std::fmt::Display for ExportsApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BadRequest(msg) => write!(f, "{}", msg),
            Self::Create(e) => write!(f, "{}", e),
            Self::Download(e) => write!(f, "{}", e),
            Self::Job(e) => write!(f, "{}", e),
        }
    }
}
