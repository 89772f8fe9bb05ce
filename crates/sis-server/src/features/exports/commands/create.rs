use mediator::Request;
use serde::{Deserialize, Serialize};
use sis_common::types::{ExportFormat, ExportJob, ResourceType};
use std::collections::BTreeMap;

use crate::state::AppState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateExportCommand {
    pub resource_type: ResourceType,
    pub file_format: ExportFormat,
    /// Equality filters applied at the entity store, column name to value
    #[serde(default)]
    pub filters: BTreeMap<String, String>,
    pub limit: Option<u64>,
}

#[derive(Debug, thiserror::Error)]
pub enum CreateExportError {
    #[error("Limit must be at least 1")]
    ZeroLimit,
    #[error("Filter column names cannot be empty")]
    BlankFilterColumn,
}

impl Request<Result<ExportJob, CreateExportError>> for CreateExportCommand {}

impl crate::cqrs::middleware::Command for CreateExportCommand {}

impl CreateExportCommand {
    pub fn validate(&self) -> Result<(), CreateExportError> {
        if self.limit == Some(0) {
            return Err(CreateExportError::ZeroLimit);
        }
        if self.filters.keys().any(|k| k.trim().is_empty()) {
            return Err(CreateExportError::BlankFilterColumn);
        }
        Ok(())
    }
}

/// Create the job and hand it to the export worker. The cancellation token
/// is registered before the worker starts so a cancel request can never miss
/// a job that exists.
#[tracing::instrument(
    skip(state),
    fields(
        resource_type = %command.resource_type,
        file_format = %command.file_format,
    )
)]
pub async fn handle(
    state: AppState,
    command: CreateExportCommand,
) -> Result<ExportJob, CreateExportError> {
    command.validate()?;

    let job = ExportJob::new(
        command.resource_type,
        command.file_format,
        command.filters,
        command.limit,
    );
    tracing::info!(job_id = %job.id, "export job created");

    state.export_jobs.insert(job.clone()).await;
    let token = state.export_jobs.register_cancel_token(job.id).await;
    crate::pipeline::export::start(state.clone(), job.id, token);

    Ok(job)
}
