use mediator::Request;
use serde::{Deserialize, Serialize};
use sis_common::types::{ExportJob, ExportStatus, Pagination};
use sis_common::SisError;

use crate::state::AppState;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ListExportJobsQuery {
    pub status: Option<ExportStatus>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListExportJobsResponse {
    pub jobs: Vec<ExportJob>,
    pub total: u64,
}

impl Request<Result<ListExportJobsResponse, SisError>> for ListExportJobsQuery {}

impl crate::cqrs::middleware::Query for ListExportJobsQuery {}

#[tracing::instrument(skip(state))]
pub async fn handle(
    state: AppState,
    query: ListExportJobsQuery,
) -> Result<ListExportJobsResponse, SisError> {
    let (jobs, total) = state.export_jobs.list(query.status, query.pagination).await;
    Ok(ListExportJobsResponse { jobs, total })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use sis_common::types::{ExportFormat, ResourceType};
    use std::collections::BTreeMap;

    #[tokio::test]
    async fn filters_by_status() {
        let state = AppState::in_memory(Config::default());
        for _ in 0..2 {
            state
                .export_jobs
                .insert(ExportJob::new(
                    ResourceType::Courses,
                    ExportFormat::Xlsx,
                    BTreeMap::new(),
                    None,
                ))
                .await;
        }

        let all = handle(state.clone(), ListExportJobsQuery::default()).await.unwrap();
        assert_eq!(all.total, 2);

        let completed = handle(
            state,
            ListExportJobsQuery {
                status: Some(ExportStatus::Completed),
                pagination: Pagination::default(),
            },
        )
        .await
        .unwrap();
        assert_eq!(completed.total, 0);
    }
}
