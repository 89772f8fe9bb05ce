use crate::api::response::{ApiResponse, ErrorResponse, PaginationMeta};
use crate::pipeline::CommitError;
use crate::state::AppState;
use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use sis_common::types::{ImportOptions, ImportStatus, Pagination, ResourceType, SourceFormat};
use sis_common::SisError;
use uuid::Uuid;

use super::commands::{
    CancelImportCommand, CommitImportCommand, UploadImportCommand, UploadImportError,
};
use super::queries::{GetImportJobQuery, ListImportJobsQuery, PreviewError, PreviewImportQuery};

pub fn imports_routes() -> Router<AppState> {
    // ":key" is a resource type on POST and a job id on GET. The router
    // rejects two parameter names at the same position, so both handlers
    // share the segment and parse it themselves.
    Router::new()
        .route("/", get(list_import_jobs))
        .route("/:key", post(upload_import).get(get_import_job))
        .route("/:key/preview", get(preview_import))
        .route("/:key/commit", post(commit_import))
        .route("/:key/cancel", post(cancel_import))
}

#[derive(Debug, Deserialize)]
struct UploadParams {
    /// Overrides the format guessed from the uploaded filename
    format: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PreviewParams {
    #[serde(default)]
    allow_updates: bool,
    #[serde(default)]
    skip_duplicates: bool,
}

#[derive(Debug, Default, Deserialize)]
struct CommitBody {
    #[serde(default)]
    allow_updates: bool,
    #[serde(default)]
    skip_duplicates: bool,
    #[serde(default)]
    skip_errors: bool,
}

#[derive(Debug, Deserialize)]
struct ListParams {
    status: Option<String>,
    limit: Option<i64>,
    offset: Option<i64>,
}

fn parse_job_id(key: &str) -> Result<Uuid, ImportsApiError> {
    Uuid::parse_str(key)
        .map_err(|_| ImportsApiError::BadRequest(format!("Invalid job id: {}", key)))
}

#[tracing::instrument(skip(state, multipart), fields(resource_type = %key))]
async fn upload_import(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Query(params): Query<UploadParams>,
    mut multipart: Multipart,
) -> Result<Response, ImportsApiError> {
    let resource_type: ResourceType = key.parse().map_err(ImportsApiError::BadRequest)?;

    let mut content: Option<Vec<u8>> = None;
    let mut filename: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        ImportsApiError::BadRequest(format!("Failed to read multipart field: {}", e))
    })? {
        let field_name = field.name().unwrap_or("").to_string();

        if field_name == "file" {
            filename = field.file_name().map(|s| s.to_string());
            let data = field.bytes().await.map_err(|e| {
                ImportsApiError::BadRequest(format!("Failed to read file bytes: {}", e))
            })?;
            content = Some(data.to_vec());
        }
    }

    let content = content.ok_or_else(|| {
        ImportsApiError::BadRequest("No file field found in multipart data".to_string())
    })?;
    let filename = filename.unwrap_or_else(|| "upload".to_string());

    let source_format = match params.format {
        Some(raw) => raw.parse::<SourceFormat>().map_err(ImportsApiError::BadRequest)?,
        None => SourceFormat::from_filename(&filename).ok_or_else(|| {
            ImportsApiError::BadRequest(format!(
                "Cannot determine source format from filename '{}'; pass ?format=csv|json|xlsx",
                filename
            ))
        })?,
    };

    let command = UploadImportCommand {
        resource_type,
        source_format,
        filename,
        content,
    };

    let job = super::commands::upload::handle(state, command).await?;

    tracing::info!(job_id = %job.id, "Import upload accepted via API");

    Ok((StatusCode::CREATED, Json(ApiResponse::success(job))).into_response())
}

async fn get_import_job(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Response, ImportsApiError> {
    let job_id = parse_job_id(&key)?;
    let job = super::queries::get_job::handle(state, GetImportJobQuery { job_id }).await?;

    Ok((StatusCode::OK, Json(ApiResponse::success(job))).into_response())
}

async fn preview_import(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Query(params): Query<PreviewParams>,
) -> Result<Response, ImportsApiError> {
    let job_id = parse_job_id(&key)?;
    let query = PreviewImportQuery {
        job_id,
        options: ImportOptions {
            allow_updates: params.allow_updates,
            skip_duplicates: params.skip_duplicates,
        },
    };

    let preview = super::queries::preview::handle(state, query).await?;

    Ok((StatusCode::OK, Json(ApiResponse::success(preview))).into_response())
}

#[tracing::instrument(skip(state, body), fields(job_id = %key))]
async fn commit_import(
    State(state): State<AppState>,
    Path(key): Path<String>,
    Json(body): Json<CommitBody>,
) -> Result<Response, ImportsApiError> {
    let job_id = parse_job_id(&key)?;
    let command = CommitImportCommand {
        job_id,
        allow_updates: body.allow_updates,
        skip_duplicates: body.skip_duplicates,
        skip_errors: body.skip_errors,
    };

    let job = super::commands::commit::handle(state, command).await?;

    tracing::info!(job_id = %job.id, "Import commit started via API");

    Ok((StatusCode::OK, Json(ApiResponse::success(job))).into_response())
}

async fn cancel_import(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Response, ImportsApiError> {
    let job_id = parse_job_id(&key)?;
    let job = super::commands::cancel::handle(state, CancelImportCommand { job_id }).await?;

    Ok((StatusCode::OK, Json(ApiResponse::success(job))).into_response())
}

async fn list_import_jobs(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Response, ImportsApiError> {
    let status = match params.status.as_deref() {
        Some(raw) => Some(raw.parse::<ImportStatus>().map_err(ImportsApiError::BadRequest)?),
        None => None,
    };
    let pagination = Pagination::new(
        params.limit.unwrap_or(50).clamp(1, 500),
        params.offset.unwrap_or(0).max(0),
    );

    let response = super::queries::list_jobs::handle(
        state,
        ListImportJobsQuery { status, pagination },
    )
    .await?;

    let meta = json!({
        "pagination": PaginationMeta::new(pagination.limit, pagination.offset, response.total as i64),
    });

    Ok((StatusCode::OK, Json(ApiResponse::success_with_meta(response.jobs, meta))).into_response())
}

#[derive(Debug)]
enum ImportsApiError {
    BadRequest(String),
    Upload(UploadImportError),
    Commit(CommitError),
    Preview(PreviewError),
    Job(SisError),
}

impl From<UploadImportError> for ImportsApiError {
    fn from(err: UploadImportError) -> Self {
        Self::Upload(err)
    }
}

impl From<CommitError> for ImportsApiError {
    fn from(err: CommitError) -> Self {
        Self::Commit(err)
    }
}

impl From<PreviewError> for ImportsApiError {
    fn from(err: PreviewError) -> Self {
        Self::Preview(err)
    }
}

impl From<SisError> for ImportsApiError {
    fn from(err: SisError) -> Self {
        Self::Job(err)
    }
}

impl IntoResponse for ImportsApiError {
    fn into_response(self) -> Response {
        match self {
            ImportsApiError::BadRequest(_) | ImportsApiError::Upload(_) => {
                let error = ErrorResponse::new("VALIDATION_ERROR", self.to_string());
                (StatusCode::BAD_REQUEST, Json(error)).into_response()
            },
            ImportsApiError::Commit(CommitError::BlockedByErrors { rows_with_errors }) => {
                let error = ErrorResponse::with_details(
                    "VALIDATION_ERROR",
                    format!(
                        "{} row(s) have validation errors; retry with skip_errors=true to exclude them",
                        rows_with_errors
                    ),
                    json!({ "rows_with_errors": rows_with_errors }),
                );
                (StatusCode::CONFLICT, Json(error)).into_response()
            },
            ImportsApiError::Commit(CommitError::Parse(_))
            | ImportsApiError::Preview(PreviewError::Parse(_)) => {
                let error = ErrorResponse::new("PARSE_ERROR", self.to_string());
                (StatusCode::UNPROCESSABLE_ENTITY, Json(error)).into_response()
            },
            ImportsApiError::Commit(CommitError::MissingUpload)
            | ImportsApiError::Preview(PreviewError::MissingUpload) => {
                tracing::error!("Upload bytes missing for a live job: {}", self);
                let error = ErrorResponse::new("INTERNAL_ERROR", self.to_string());
                (StatusCode::INTERNAL_SERVER_ERROR, Json(error)).into_response()
            },
            ImportsApiError::Commit(CommitError::Store(_))
            | ImportsApiError::Preview(PreviewError::Store(_)) => {
                tracing::error!("Entity store error during import: {}", self);
                let error = ErrorResponse::new("INTERNAL_ERROR", "Entity store unavailable");
                (StatusCode::SERVICE_UNAVAILABLE, Json(error)).into_response()
            },
            ImportsApiError::Preview(PreviewError::Unavailable(_)) => {
                let error = ErrorResponse::new("INVALID_STATE_TRANSITION", self.to_string());
                (StatusCode::CONFLICT, Json(error)).into_response()
            },
            ImportsApiError::Commit(CommitError::Job(e))
            | ImportsApiError::Preview(PreviewError::Job(e))
            | ImportsApiError::Job(e) => job_error_response(e),
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

impl std::fmt::Display for ImportsApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BadRequest(msg) => write!(f, "{}", msg),
            Self::Upload(e) => write!(f, "{}", e),
            Self::Commit(e) => write!(f, "{}", e),
            Self::Preview(e) => write!(f, "{}", e),
            Self::Job(e) => write!(f, "{}", e),
        }
    }
}
