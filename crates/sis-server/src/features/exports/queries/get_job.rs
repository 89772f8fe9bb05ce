use mediator::Request;
use serde::{Deserialize, Serialize};
use sis_common::types::ExportJob;
use sis_common::SisError;
use uuid::Uuid;

use crate::state::AppState;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GetExportJobQuery {
    pub job_id: Uuid,
}

impl Request<Result<ExportJob, SisError>> for GetExportJobQuery {}

impl crate::cqrs::middleware::Query for GetExportJobQuery {}

#[tracing::instrument(skip(state), fields(job_id = %query.job_id))]
pub async fn handle(state: AppState, query: GetExportJobQuery) -> Result<ExportJob, SisError> {
    state.export_jobs.get(query.job_id).await
}
