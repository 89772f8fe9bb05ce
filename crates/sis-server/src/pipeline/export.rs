//! Background export worker.
//!
//! One task per export job. The worker snapshots matching records, assembles
//! the output table batch by batch with a cancellation check between batches,
//! serializes once, and publishes the artifact with an atomic rename. A
//! cancelled job is a failed job with a cancelled reason and no artifact.

use sis_common::types::{ExportFailureReason, ExportFormat, ExportStatus};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::pipeline::schema::ResourceSchema;
use crate::pipeline::serialize;
use crate::state::AppState;
use crate::store::EntityStore;

pub fn start(state: AppState, job_id: Uuid, cancel: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        if let Err(error) = run(&state, job_id, &cancel).await {
            tracing::error!(%job_id, %error, "export worker aborted");
        }
        state.export_jobs.clear_cancel_token(job_id).await;
    })
}

#[tracing::instrument(skip(state, cancel))]
async fn run(
    state: &AppState,
    job_id: Uuid,
    cancel: &CancellationToken,
) -> sis_common::Result<()> {
    if cancel.is_cancelled() {
        state
            .export_jobs
            .fail(job_id, ExportFailureReason::Cancelled, "cancelled before processing began")
            .await?;
        return Ok(());
    }

    let job = state.export_jobs.transition(job_id, ExportStatus::Processing).await?;
    tracing::info!(
        %job_id,
        resource_type = %job.resource_type,
        format = %job.file_format,
        "export started"
    );

    let records = match state.entities.query(job.resource_type, &job.filters, job.limit).await {
        Ok(records) => records,
        Err(error) => {
            state
                .export_jobs
                .fail(job_id, ExportFailureReason::Error, error.to_string())
                .await?;
            return Ok(());
        },
    };

    let schema = ResourceSchema::for_resource(job.resource_type);
    let headers = schema.headers();
    let batch_size = state.config.pipeline.export_batch_size.max(1);

    let mut table: Vec<Vec<String>> = Vec::with_capacity(records.len());
    for batch in records.chunks(batch_size) {
        if cancel.is_cancelled() {
            state
                .export_jobs
                .fail(job_id, ExportFailureReason::Cancelled, "cancelled while processing")
                .await?;
            return Ok(());
        }
        for record in batch {
            table.push(
                headers
                    .iter()
                    .map(|h| record.get(h).cloned().unwrap_or_default())
                    .collect(),
            );
        }
        tokio::task::yield_now().await;
    }

    if cancel.is_cancelled() {
        state
            .export_jobs
            .fail(job_id, ExportFailureReason::Cancelled, "cancelled while processing")
            .await?;
        return Ok(());
    }

    let title = format!("{} export", job.resource_type.as_str());
    let serialized = match job.file_format {
        ExportFormat::Csv => serialize::to_csv(&headers, &table),
        ExportFormat::Xlsx => serialize::to_xlsx(job.resource_type.as_str(), &headers, &table),
        ExportFormat::Pdf => serialize::to_pdf(&title, &headers, &table),
    };
    let bytes = match serialized {
        Ok(bytes) => bytes,
        Err(error) => {
            state
                .export_jobs
                .fail(job_id, ExportFailureReason::Error, error.to_string())
                .await?;
            return Ok(());
        },
    };

    let path = match state
        .artifacts
        .write_atomic(job_id, job.file_format.extension(), &bytes)
        .await
    {
        Ok(path) => path,
        Err(error) => {
            state
                .export_jobs
                .fail(
                    job_id,
                    ExportFailureReason::Error,
                    format!("failed to write artifact: {error}"),
                )
                .await?;
            return Ok(());
        },
    };

    state.export_jobs.complete(job_id, table.len() as u64, path).await?;
    tracing::info!(%job_id, total_records = table.len(), "export completed");
    Ok(())
}
