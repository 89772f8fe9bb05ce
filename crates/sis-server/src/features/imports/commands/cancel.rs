use mediator::Request;
use serde::{Deserialize, Serialize};
use sis_common::types::{ImportJob, ImportStatus};
use sis_common::SisError;
use uuid::Uuid;

use crate::state::AppState;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CancelImportCommand {
    pub job_id: Uuid,
}

impl Request<Result<ImportJob, SisError>> for CancelImportCommand {}

impl crate::cqrs::middleware::Command for CancelImportCommand {}

/// Cancel a ready job. Only ready jobs can be cancelled; once a commit has
/// claimed the job the swap fails and the caller gets an invalid-transition
/// error.
#[tracing::instrument(skip(state), fields(job_id = %command.job_id))]
pub async fn handle(state: AppState, command: CancelImportCommand) -> Result<ImportJob, SisError> {
    let job = state
        .import_jobs
        .compare_and_swap_status(command.job_id, ImportStatus::Ready, ImportStatus::Cancelled)
        .await?;
    state.uploads.remove(command.job_id).await;

    tracing::info!(job_id = %command.job_id, "import cancelled");
    Ok(job)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use sis_common::types::{ResourceType, SourceFormat};

    async fn job_in(state: &AppState, status: ImportStatus) -> Uuid {
        let job = ImportJob::new(ResourceType::Students, SourceFormat::Csv);
        let id = job.id;
        state.import_jobs.insert(job).await;
        let path: &[ImportStatus] = match status {
            ImportStatus::Pending => &[],
            ImportStatus::Validating => &[ImportStatus::Validating],
            ImportStatus::Ready => &[ImportStatus::Validating, ImportStatus::Ready],
            _ => panic!("unsupported fixture status"),
        };
        for next in path {
            state.import_jobs.transition(id, *next).await.unwrap();
        }
        id
    }

    #[tokio::test]
    async fn cancels_a_ready_job() {
        let state = AppState::in_memory(Config::default());
        let id = job_in(&state, ImportStatus::Ready).await;
        state.uploads.put(id, b"x".to_vec()).await;

        let job = handle(state.clone(), CancelImportCommand { job_id: id }).await.unwrap();
        assert_eq!(job.status, ImportStatus::Cancelled);
        assert!(job.completed_at.is_some());
        assert!(state.uploads.get(id).await.is_none());
    }

    #[tokio::test]
    async fn rejects_jobs_that_are_not_ready() {
        let state = AppState::in_memory(Config::default());
        for status in [ImportStatus::Pending, ImportStatus::Validating] {
            let id = job_in(&state, status).await;
            let err = handle(state.clone(), CancelImportCommand { job_id: id })
                .await
                .unwrap_err();
            assert!(matches!(err, SisError::InvalidStateTransition { .. }));
        }
    }

    #[tokio::test]
    async fn rejects_unknown_job() {
        let state = AppState::in_memory(Config::default());
        let err = handle(state, CancelImportCommand { job_id: Uuid::new_v4() })
            .await
            .unwrap_err();
        assert!(matches!(err, SisError::JobNotFound(_)));
    }
}
