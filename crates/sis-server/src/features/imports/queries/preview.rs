use mediator::Request;
use serde::{Deserialize, Serialize};
use sis_common::types::{ImportOptions, ImportStatus};
use sis_common::SisError;
use uuid::Uuid;

use crate::pipeline::parser::{self, ParseError};
use crate::pipeline::schema::ResourceSchema;
use crate::pipeline::validate::{validate_rows, ValidationContext};
use crate::pipeline::{build_preview, ImportPreview};
use crate::state::AppState;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PreviewImportQuery {
    pub job_id: Uuid,
    pub options: ImportOptions,
}

#[derive(Debug, thiserror::Error)]
pub enum PreviewError {
    #[error(transparent)]
    Job(#[from] SisError),
    #[error("job is {0}; preview is only available while a job is validating or ready")]
    Unavailable(ImportStatus),
    #[error("upload content is no longer available")]
    MissingUpload,
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("entity store unavailable: {0}")]
    Store(String),
}

impl Request<Result<ImportPreview, PreviewError>> for PreviewImportQuery {}

impl crate::cqrs::middleware::Query for PreviewImportQuery {}

/// Recompute the preview from the retained upload under the given options.
/// Touches nothing, so calling it any number of times with any options is
/// safe.
#[tracing::instrument(skip(state), fields(job_id = %query.job_id))]
pub async fn handle(
    state: AppState,
    query: PreviewImportQuery,
) -> Result<ImportPreview, PreviewError> {
    let job = state.import_jobs.get(query.job_id).await?;
    if !matches!(job.status, ImportStatus::Validating | ImportStatus::Ready) {
        return Err(PreviewError::Unavailable(job.status));
    }

    let bytes = state.uploads.get(query.job_id).await.ok_or(PreviewError::MissingUpload)?;
    let upload = parser::parse(&bytes, job.source_format)?;

    let schema = ResourceSchema::for_resource(job.resource_type);
    let ctx = ValidationContext::load(state.entities.as_ref(), job.resource_type)
        .await
        .map_err(|e| PreviewError::Store(e.to_string()))?;
    let rows = validate_rows(schema, &upload.rows, query.options, &ctx);

    Ok(build_preview(&rows, state.config.pipeline.preview_display_cap))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use sis_common::types::{ImportJob, ResourceType, RowAction, SourceFormat};

    const CSV: &[u8] =
        b"student_code,first_name,last_name,email\nS001,Ana,Silva,ana@example.edu\nS001,Ana,Silva,ana@example.edu\n";

    async fn ready_job(state: &AppState, csv: &[u8]) -> Uuid {
        let job = ImportJob::new(ResourceType::Students, SourceFormat::Csv);
        let id = job.id;
        state.import_jobs.insert(job).await;
        state.uploads.put(id, csv.to_vec()).await;
        state.import_jobs.transition(id, ImportStatus::Validating).await.unwrap();
        state.import_jobs.transition(id, ImportStatus::Ready).await.unwrap();
        id
    }

    #[tokio::test]
    async fn preview_reflects_requested_options() {
        let state = AppState::in_memory(Config::default());
        let id = ready_job(&state, CSV).await;

        let without = handle(
            state.clone(),
            PreviewImportQuery { job_id: id, options: ImportOptions::default() },
        )
        .await
        .unwrap();
        assert_eq!(without.summary.create, 2);
        assert_eq!(without.summary.skip, 0);

        let with = handle(
            state.clone(),
            PreviewImportQuery {
                job_id: id,
                options: ImportOptions { allow_updates: false, skip_duplicates: true },
            },
        )
        .await
        .unwrap();
        assert_eq!(with.summary.create, 1);
        assert_eq!(with.summary.skip, 1);
        assert_eq!(with.rows[1].action, RowAction::Skip);

        // The job itself is untouched.
        let job = state.import_jobs.get(id).await.unwrap();
        assert_eq!(job.status, ImportStatus::Ready);
    }

    #[tokio::test]
    async fn preview_unavailable_after_terminal() {
        let state = AppState::in_memory(Config::default());
        let id = ready_job(&state, CSV).await;
        state.import_jobs.transition(id, ImportStatus::Cancelled).await.unwrap();

        let err = handle(
            state,
            PreviewImportQuery { job_id: id, options: ImportOptions::default() },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, PreviewError::Unavailable(ImportStatus::Cancelled)));
    }
}
