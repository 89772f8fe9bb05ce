use mediator::Request;
use serde::{Deserialize, Serialize};
use sis_common::types::{ImportJob, ImportOptions};
use uuid::Uuid;

use crate::pipeline::{CommitError, CommitRequest};
use crate::state::AppState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitImportCommand {
    pub job_id: Uuid,
    pub allow_updates: bool,
    pub skip_duplicates: bool,
    pub skip_errors: bool,
}

impl Request<Result<ImportJob, CommitError>> for CommitImportCommand {}

impl crate::cqrs::middleware::Command for CommitImportCommand {}

/// Start committing a ready job with the submitted options. Succeeds at most
/// once per job.
#[tracing::instrument(skip(state), fields(job_id = %command.job_id))]
pub async fn handle(
    state: AppState,
    command: CommitImportCommand,
) -> Result<ImportJob, CommitError> {
    let request = CommitRequest {
        options: ImportOptions {
            allow_updates: command.allow_updates,
            skip_duplicates: command.skip_duplicates,
        },
        skip_errors: command.skip_errors,
    };
    crate::pipeline::commit::begin(&state, command.job_id, request).await
}
