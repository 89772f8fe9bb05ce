use mediator::Request;
use serde::{Deserialize, Serialize};
use sis_common::types::ImportJob;
use sis_common::SisError;
use uuid::Uuid;

use crate::state::AppState;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GetImportJobQuery {
    pub job_id: Uuid,
}

impl Request<Result<ImportJob, SisError>> for GetImportJobQuery {}

impl crate::cqrs::middleware::Query for GetImportJobQuery {}

#[tracing::instrument(skip(state), fields(job_id = %query.job_id))]
pub async fn handle(state: AppState, query: GetImportJobQuery) -> Result<ImportJob, SisError> {
    state.import_jobs.get(query.job_id).await
}
