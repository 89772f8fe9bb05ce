use mediator::Request;
use serde::{Deserialize, Serialize};
use sis_common::types::{ImportJob, ImportStatus, Pagination};
use sis_common::SisError;

use crate::state::AppState;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ListImportJobsQuery {
    pub status: Option<ImportStatus>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListImportJobsResponse {
    pub jobs: Vec<ImportJob>,
    pub total: u64,
}

impl Request<Result<ListImportJobsResponse, SisError>> for ListImportJobsQuery {}

impl crate::cqrs::middleware::Query for ListImportJobsQuery {}

#[tracing::instrument(skip(state))]
pub async fn handle(
    state: AppState,
    query: ListImportJobsQuery,
) -> Result<ListImportJobsResponse, SisError> {
    let (jobs, total) = state.import_jobs.list(query.status, query.pagination).await;
    Ok(ListImportJobsResponse { jobs, total })
}
