//! Commit execution.
//!
//! [`begin`] runs in the request path: it re-validates the retained upload
//! under the submitted options, enforces the error guard, and claims the job
//! with an atomic ready-to-importing swap before spawning the writer task.
//! Whoever loses the swap gets an invalid-transition error and no second
//! commit can start.
//!
//! The writer applies rows strictly in row order. Row failures are recorded
//! and do not stop the run; only a store outage aborts the job. Counters are
//! flushed to the job at batch boundaries, and `successful + failed` equals
//! the row total exactly when the job completes.

use sis_common::types::{ImportJob, ImportOptions, ImportStatus, IssueKind, RowAction, ValidationIssue};
use uuid::Uuid;

use crate::pipeline::import::issue_map;
use crate::pipeline::parser::{self, ParseError};
use crate::pipeline::schema::ResourceSchema;
use crate::pipeline::validate::{validate_rows, ValidatedRow, ValidationContext};
use crate::state::AppState;
use crate::store::{EntityStore, EntityStoreError};

/// What the operator submitted with the commit request.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommitRequest {
    pub options: ImportOptions,
    pub skip_errors: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum CommitError {
    #[error(transparent)]
    Job(#[from] sis_common::SisError),
    #[error("{rows_with_errors} row(s) have validation errors")]
    BlockedByErrors { rows_with_errors: u64 },
    #[error("upload content is no longer available")]
    MissingUpload,
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("entity store unavailable: {0}")]
    Store(String),
}

/// Validate, guard, claim, and spawn the writer. Returns the job snapshot
/// with the commit already underway.
pub async fn begin(
    state: &AppState,
    job_id: Uuid,
    request: CommitRequest,
) -> Result<ImportJob, CommitError> {
    let job = state.import_jobs.get(job_id).await?;
    // Racy by design; the compare-and-swap below is the real gate. This just
    // keeps the common non-ready case from reporting a missing upload.
    if job.status != ImportStatus::Ready {
        return Err(
            sis_common::SisError::invalid_transition(job.status, ImportStatus::Importing).into()
        );
    }
    let bytes = state.uploads.get(job_id).await.ok_or(CommitError::MissingUpload)?;

    let upload = parser::parse(&bytes, job.source_format)?;
    let schema = ResourceSchema::for_resource(job.resource_type);
    let ctx = ValidationContext::load(state.entities.as_ref(), job.resource_type)
        .await
        .map_err(|e| CommitError::Store(e.to_string()))?;
    let rows = validate_rows(schema, &upload.rows, request.options, &ctx);

    let rows_with_errors = rows.iter().filter(|r| r.has_errors()).count() as u64;
    if rows_with_errors > 0 && !request.skip_errors {
        return Err(CommitError::BlockedByErrors { rows_with_errors });
    }

    state
        .import_jobs
        .compare_and_swap_status(job_id, ImportStatus::Ready, ImportStatus::Importing)
        .await?;
    // The job now reports the issues of the run being committed, not the
    // upload-time defaults.
    state
        .import_jobs
        .set_validation_results(job_id, rows.len() as u64, issue_map(&rows))
        .await?;

    tracing::info!(
        %job_id,
        total_rows = rows.len(),
        rows_with_errors,
        skip_errors = request.skip_errors,
        "commit started"
    );

    let worker_state = state.clone();
    let resource_type = job.resource_type;
    tokio::spawn(async move {
        if let Err(error) = run(&worker_state, job_id, resource_type, rows).await {
            tracing::error!(%job_id, %error, "commit worker aborted");
        }
    });

    Ok(state.import_jobs.get(job_id).await?)
}

async fn run(
    state: &AppState,
    job_id: Uuid,
    resource_type: sis_common::types::ResourceType,
    rows: Vec<ValidatedRow>,
) -> sis_common::Result<()> {
    let schema = ResourceSchema::for_resource(resource_type);
    let batch_size = state.config.pipeline.commit_batch_size.max(1);

    let mut successful = 0u64;
    let mut failed = 0u64;

    for (index, row) in rows.iter().enumerate() {
        match apply_row(state, job_id, schema, row).await {
            RowOutcome::Written | RowOutcome::Skipped => successful += 1,
            RowOutcome::Failed => failed += 1,
            RowOutcome::StoreGone(message) => {
                // Fatal: flush what we know and fail the job. Rows written so
                // far stay written.
                state.import_jobs.record_progress(job_id, successful, failed).await?;
                state.import_jobs.fail(job_id, message).await?;
                state.uploads.remove(job_id).await;
                return Ok(());
            },
        }

        if (index + 1) % batch_size == 0 {
            state.import_jobs.record_progress(job_id, successful, failed).await?;
            tokio::task::yield_now().await;
        }
    }

    state.import_jobs.record_progress(job_id, successful, failed).await?;
    state.import_jobs.transition(job_id, ImportStatus::Completed).await?;
    state.uploads.remove(job_id).await;

    tracing::info!(%job_id, successful, failed, "commit completed");
    Ok(())
}

enum RowOutcome {
    Written,
    Skipped,
    Failed,
    StoreGone(String),
}

async fn apply_row(
    state: &AppState,
    job_id: Uuid,
    schema: &ResourceSchema,
    row: &ValidatedRow,
) -> RowOutcome {
    // Error rows only reach the writer under skip_errors; they count as
    // failed without touching the store.
    if row.has_errors() {
        return RowOutcome::Failed;
    }
    if row.action == RowAction::Skip {
        return RowOutcome::Skipped;
    }

    let Some(key) = row.natural_key.as_deref() else {
        record_row_failure(state, job_id, row.row_number, "row has no natural key").await;
        return RowOutcome::Failed;
    };

    let record = schema.project(&row.data);
    let result = match row.action {
        RowAction::Create => state.entities.insert(schema.resource_type, key, record).await,
        RowAction::Update => state.entities.update(schema.resource_type, key, record).await,
        RowAction::Skip => unreachable!("handled above"),
    };

    match result {
        Ok(()) => RowOutcome::Written,
        Err(EntityStoreError::Rejected(message)) => {
            record_row_failure(state, job_id, row.row_number, &message).await;
            RowOutcome::Failed
        },
        Err(EntityStoreError::Unavailable(message)) => RowOutcome::StoreGone(message),
    }
}

async fn record_row_failure(state: &AppState, job_id: Uuid, row_number: u32, message: &str) {
    tracing::warn!(%job_id, row_number, message, "row write failed");
    let issue = ValidationIssue::error(IssueKind::WriteFailed, message);
    if let Err(error) = state.import_jobs.append_issue(job_id, row_number, issue).await {
        tracing::error!(%job_id, %error, "failed to record row failure");
    }
}
