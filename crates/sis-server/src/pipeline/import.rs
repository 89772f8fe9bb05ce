//! Background validation worker.
//!
//! Spawned once per upload. Parses the retained bytes, validates every row
//! with default options against the current entity store, stores the issue
//! map on the job, and moves it to ready. Any file-level problem fails the
//! job with the parse error as its message.

use std::collections::BTreeMap;

use sis_common::types::{ImportOptions, ImportStatus, ValidationIssue};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::pipeline::parser;
use crate::pipeline::schema::ResourceSchema;
use crate::pipeline::validate::{validate_rows, ValidatedRow, ValidationContext};
use crate::state::AppState;

pub fn start(state: AppState, job_id: Uuid) -> JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(error) = run(&state, job_id).await {
            tracing::error!(%job_id, %error, "validation worker aborted");
        }
    })
}

#[tracing::instrument(skip(state))]
async fn run(state: &AppState, job_id: Uuid) -> sis_common::Result<()> {
    let job = state.import_jobs.transition(job_id, ImportStatus::Validating).await?;

    let Some(bytes) = state.uploads.get(job_id).await else {
        state.import_jobs.fail(job_id, "upload content is no longer available").await?;
        return Ok(());
    };

    let upload = match parser::parse(&bytes, job.source_format) {
        Ok(upload) => upload,
        Err(error) => {
            tracing::warn!(%job_id, %error, "upload failed to parse");
            state.import_jobs.fail(job_id, error.to_string()).await?;
            state.uploads.remove(job_id).await;
            return Ok(());
        },
    };

    let schema = ResourceSchema::for_resource(job.resource_type);
    let ctx = match ValidationContext::load(state.entities.as_ref(), job.resource_type).await {
        Ok(ctx) => ctx,
        Err(error) => {
            state.import_jobs.fail(job_id, error.to_string()).await?;
            state.uploads.remove(job_id).await;
            return Ok(());
        },
    };

    let rows = validate_rows(schema, &upload.rows, ImportOptions::default(), &ctx);
    state
        .import_jobs
        .set_validation_results(job_id, rows.len() as u64, issue_map(&rows))
        .await?;
    state.import_jobs.transition(job_id, ImportStatus::Ready).await?;

    tracing::info!(%job_id, total_rows = rows.len(), "validation finished");
    Ok(())
}

/// Issues grouped by row number; rows without issues are absent.
pub(crate) fn issue_map(rows: &[ValidatedRow]) -> BTreeMap<u32, Vec<ValidationIssue>> {
    rows.iter()
        .filter(|row| !row.issues.is_empty())
        .map(|row| (row.row_number, row.issues.clone()))
        .collect()
}
