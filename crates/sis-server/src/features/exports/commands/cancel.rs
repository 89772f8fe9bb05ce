use mediator::Request;
use serde::{Deserialize, Serialize};
use sis_common::types::ExportJob;
use sis_common::SisError;
use uuid::Uuid;

use crate::state::AppState;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CancelExportCommand {
    pub job_id: Uuid,
}

impl Request<Result<ExportJob, SisError>> for CancelExportCommand {}

impl crate::cqrs::middleware::Command for CancelExportCommand {}

/// Best-effort cancellation. Sets the worker's cancellation signal and
/// returns the latest snapshot; the worker decides at its next checkpoint
/// whether the job still stops. A job that already reached a terminal
/// status is returned unchanged.
#[tracing::instrument(skip(state), fields(job_id = %command.job_id))]
pub async fn handle(state: AppState, command: CancelExportCommand) -> Result<ExportJob, SisError> {
    let job = state.export_jobs.get(command.job_id).await?;
    if job.status.is_terminal() {
        return Ok(job);
    }

    let requested = state.export_jobs.request_cancel(command.job_id).await;
    tracing::info!(job_id = %command.job_id, requested, "export cancellation requested");

    state.export_jobs.get(command.job_id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use sis_common::types::{ExportFormat, ExportStatus, ResourceType};
    use std::collections::BTreeMap;

    fn job() -> ExportJob {
        ExportJob::new(ResourceType::Grades, ExportFormat::Csv, BTreeMap::new(), None)
    }

    #[tokio::test]
    async fn test_cancel_sets_signal_for_live_job() {
        let state = AppState::in_memory(Config::default());
        let job = job();
        let id = job.id;
        state.export_jobs.insert(job).await;
        let token = state.export_jobs.register_cancel_token(id).await;

        let snapshot = handle(state, CancelExportCommand { job_id: id }).await.unwrap();

        // No worker is running, so the status has not moved yet; the signal
        // is what matters.
        assert_eq!(snapshot.status, ExportStatus::Pending);
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn test_cancel_terminal_job_is_a_no_op() {
        let state = AppState::in_memory(Config::default());
        let job = job();
        let id = job.id;
        state.export_jobs.insert(job).await;
        state.export_jobs.transition(id, ExportStatus::Processing).await.unwrap();
        state
            .export_jobs
            .complete(id, 10, std::path::PathBuf::from("/tmp/out.csv"))
            .await
            .unwrap();

        let snapshot = handle(state, CancelExportCommand { job_id: id }).await.unwrap();
        assert_eq!(snapshot.status, ExportStatus::Completed);
        assert_eq!(snapshot.total_records, Some(10));
    }

    #[tokio::test]
    async fn test_cancel_unknown_job() {
        let state = AppState::in_memory(Config::default());
        let err = handle(state, CancelExportCommand { job_id: Uuid::new_v4() })
            .await
            .unwrap_err();
        assert!(matches!(err, SisError::JobNotFound(_)));
    }
}
