use mediator::Request;
use serde::{Deserialize, Serialize};
use sis_common::checksum::sha256_hex;
use sis_common::types::{ImportJob, ResourceType, SourceFormat};

use crate::state::AppState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadImportCommand {
    pub resource_type: ResourceType,
    pub source_format: SourceFormat,
    pub filename: String,
    #[serde(skip)]
    pub content: Vec<u8>,
}

#[derive(Debug, thiserror::Error)]
pub enum UploadImportError {
    #[error("Uploaded file is empty")]
    ContentRequired,
    #[error("Filename is required and cannot be empty")]
    FilenameRequired,
    #[error("Filename must not exceed 255 characters")]
    FilenameLength,
    #[error("Uploaded file is {size} bytes; the limit is {limit} bytes")]
    ContentTooLarge { size: u64, limit: u64 },
}

impl Request<Result<ImportJob, UploadImportError>> for UploadImportCommand {}

impl crate::cqrs::middleware::Command for UploadImportCommand {}

impl UploadImportCommand {
    pub fn validate(&self) -> Result<(), UploadImportError> {
        if self.filename.trim().is_empty() {
            return Err(UploadImportError::FilenameRequired);
        }
        if self.filename.len() > 255 {
            return Err(UploadImportError::FilenameLength);
        }
        if self.content.is_empty() {
            return Err(UploadImportError::ContentRequired);
        }
        Ok(())
    }
}

/// Accept an upload: create the job, retain the bytes, and hand off to the
/// background validation worker. Returns the job still in pending.
#[tracing::instrument(
    skip(state, command),
    fields(
        resource_type = %command.resource_type,
        source_format = %command.source_format,
        filename = %command.filename,
        size = command.content.len(),
    )
)]
pub async fn handle(
    state: AppState,
    command: UploadImportCommand,
) -> Result<ImportJob, UploadImportError> {
    command.validate()?;

    let limit = state.config.pipeline.max_upload_bytes;
    let size = command.content.len() as u64;
    if size > limit {
        return Err(UploadImportError::ContentTooLarge { size, limit });
    }

    let job = ImportJob::new(command.resource_type, command.source_format);
    let checksum = sha256_hex(&command.content);
    tracing::info!(job_id = %job.id, %checksum, "import upload accepted");

    state.uploads.put(job.id, command.content).await;
    state.import_jobs.insert(job.clone()).await;
    crate::pipeline::import::start(state.clone(), job.id);

    Ok(job)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use sis_common::types::ImportStatus;

    fn command(content: Vec<u8>) -> UploadImportCommand {
        UploadImportCommand {
            resource_type: ResourceType::Students,
            source_format: SourceFormat::Csv,
            filename: "students.csv".to_string(),
            content,
        }
    }

    #[test]
    fn test_validation_success() {
        assert!(command(b"a,b\n1,2\n".to_vec()).validate().is_ok());
    }

    #[test]
    fn test_validation_empty_content() {
        assert!(matches!(
            command(Vec::new()).validate(),
            Err(UploadImportError::ContentRequired)
        ));
    }

    #[test]
    fn test_validation_filename_too_long() {
        let mut cmd = command(b"a".to_vec());
        cmd.filename = "x".repeat(256);
        assert!(matches!(cmd.validate(), Err(UploadImportError::FilenameLength)));
    }

    #[tokio::test]
    async fn test_upload_creates_pending_job_and_retains_bytes() {
        let state = AppState::in_memory(Config::default());
        let job = handle(state.clone(), command(b"student_code\nS001\n".to_vec()))
            .await
            .unwrap();

        assert_eq!(job.status, ImportStatus::Pending);
        assert!(state.uploads.get(job.id).await.is_some());
        assert!(state.import_jobs.get(job.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_upload_rejects_oversized_content() {
        let mut config = Config::default();
        config.pipeline.max_upload_bytes = 8;
        let state = AppState::in_memory(config);

        let err = handle(state, command(b"123456789".to_vec())).await.unwrap_err();
        assert!(matches!(err, UploadImportError::ContentTooLarge { size: 9, limit: 8 }));
    }
}
