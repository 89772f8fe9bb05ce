use mediator::Request;
use serde::{Deserialize, Serialize};
use sis_common::types::ExportStatus;
use sis_common::SisError;
use uuid::Uuid;

use crate::state::AppState;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DownloadExportQuery {
    pub job_id: Uuid,
}

/// Artifact bytes plus what a client needs to save them sensibly.
#[derive(Debug)]
pub struct DownloadExportResponse {
    pub filename: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

#[derive(Debug, thiserror::Error)]
pub enum DownloadExportError {
    #[error(transparent)]
    Job(#[from] SisError),
    #[error("job is {0}; the artifact becomes available once the job is completed")]
    NotCompleted(ExportStatus),
    #[error("artifact is missing for a completed job")]
    MissingArtifact,
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Request<Result<DownloadExportResponse, DownloadExportError>> for DownloadExportQuery {}

impl crate::cqrs::middleware::Query for DownloadExportQuery {}

/// Serve the finished artifact. Anything short of `completed` is a
/// precondition failure, never an empty or partial file.
#[tracing::instrument(skip(state), fields(job_id = %query.job_id))]
pub async fn handle(
    state: AppState,
    query: DownloadExportQuery,
) -> Result<DownloadExportResponse, DownloadExportError> {
    let job = state.export_jobs.get(query.job_id).await?;
    if job.status != ExportStatus::Completed {
        return Err(DownloadExportError::NotCompleted(job.status));
    }

    let path = job.file_path.as_ref().ok_or(DownloadExportError::MissingArtifact)?;
    let bytes = state.artifacts.read(path).await?;

    let filename = format!(
        "{}-{}.{}",
        job.resource_type,
        job.id,
        job.file_format.extension()
    );

    Ok(DownloadExportResponse {
        filename,
        content_type: job.file_format.content_type(),
        bytes,
    })
}
