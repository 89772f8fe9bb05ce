//! Job stores for import and export pipelines.
//!
//! Both stores guard a single map behind a [`tokio::sync::RwLock`]. All
//! mutation goes through methods that enforce the legal status transitions,
//! so a job can never be observed in a state the transition tables forbid.
//! Reads hand out clones; callers never hold the lock.

use std::collections::{BTreeMap, HashMap};

use chrono::Utc;
use sis_common::types::{
    ExportFailureReason, ExportJob, ExportStatus, ImportJob, ImportStatus, Pagination,
    ValidationIssue,
};
use sis_common::{Result, SisError};
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Store for import jobs.
#[derive(Default)]
pub struct ImportJobStore {
    jobs: RwLock<HashMap<Uuid, ImportJob>>,
}

impl ImportJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, job: ImportJob) {
        self.jobs.write().await.insert(job.id, job);
    }

    /// Snapshot of a single job.
    pub async fn get(&self, id: Uuid) -> Result<ImportJob> {
        self.jobs
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| SisError::JobNotFound(id.to_string()))
    }

    /// Snapshots of jobs sorted newest first, optionally filtered by status.
    /// Returns the page and the total count before paging.
    pub async fn list(
        &self,
        status: Option<ImportStatus>,
        pagination: Pagination,
    ) -> (Vec<ImportJob>, u64) {
        let jobs = self.jobs.read().await;
        let mut matched: Vec<ImportJob> = jobs
            .values()
            .filter(|job| status.map_or(true, |s| job.status == s))
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));

        let total = matched.len() as u64;
        let offset = usize::try_from(pagination.offset).unwrap_or(0);
        let limit = usize::try_from(pagination.limit).unwrap_or(0);
        let page = matched.into_iter().skip(offset).take(limit).collect();
        (page, total)
    }

    /// Move a job to `next`, enforcing the transition table. Terminal
    /// transitions stamp `completed_at`.
    pub async fn transition(&self, id: Uuid, next: ImportStatus) -> Result<ImportJob> {
        let mut jobs = self.jobs.write().await;
        let job = jobs
            .get_mut(&id)
            .ok_or_else(|| SisError::JobNotFound(id.to_string()))?;
        if !job.status.can_transition_to(next) {
            return Err(SisError::invalid_transition(job.status, next));
        }
        job.status = next;
        if next.is_terminal() {
            job.completed_at = Some(Utc::now());
        }
        Ok(job.clone())
    }

    /// Move a job to `next` only if it is currently in `expected`. The check
    /// and the write happen under one lock, so two concurrent callers cannot
    /// both win.
    pub async fn compare_and_swap_status(
        &self,
        id: Uuid,
        expected: ImportStatus,
        next: ImportStatus,
    ) -> Result<ImportJob> {
        let mut jobs = self.jobs.write().await;
        let job = jobs
            .get_mut(&id)
            .ok_or_else(|| SisError::JobNotFound(id.to_string()))?;
        if job.status != expected {
            return Err(SisError::invalid_transition(job.status, next));
        }
        if !job.status.can_transition_to(next) {
            return Err(SisError::invalid_transition(job.status, next));
        }
        job.status = next;
        if next.is_terminal() {
            job.completed_at = Some(Utc::now());
        }
        Ok(job.clone())
    }

    /// Fail a job with an operator-facing message.
    pub async fn fail(&self, id: Uuid, message: impl Into<String>) -> Result<ImportJob> {
        let mut jobs = self.jobs.write().await;
        let job = jobs
            .get_mut(&id)
            .ok_or_else(|| SisError::JobNotFound(id.to_string()))?;
        if !job.status.can_transition_to(ImportStatus::Failed) {
            return Err(SisError::invalid_transition(job.status, ImportStatus::Failed));
        }
        job.status = ImportStatus::Failed;
        job.error_message = Some(message.into());
        job.completed_at = Some(Utc::now());
        Ok(job.clone())
    }

    /// Record the outcome of a validation pass.
    pub async fn set_validation_results(
        &self,
        id: Uuid,
        total_rows: u64,
        issues: BTreeMap<u32, Vec<ValidationIssue>>,
    ) -> Result<()> {
        let mut jobs = self.jobs.write().await;
        let job = jobs
            .get_mut(&id)
            .ok_or_else(|| SisError::JobNotFound(id.to_string()))?;
        job.total_rows = total_rows;
        job.validation_issues = issues;
        Ok(())
    }

    /// Attach an issue discovered during commit to a specific row.
    pub async fn append_issue(&self, id: Uuid, row_number: u32, issue: ValidationIssue) -> Result<()> {
        let mut jobs = self.jobs.write().await;
        let job = jobs
            .get_mut(&id)
            .ok_or_else(|| SisError::JobNotFound(id.to_string()))?;
        job.validation_issues.entry(row_number).or_default().push(issue);
        Ok(())
    }

    /// Flush progress counters. Values are absolute, not deltas.
    pub async fn record_progress(&self, id: Uuid, successful: u64, failed: u64) -> Result<()> {
        let mut jobs = self.jobs.write().await;
        let job = jobs
            .get_mut(&id)
            .ok_or_else(|| SisError::JobNotFound(id.to_string()))?;
        job.successful_rows = successful;
        job.failed_rows = failed;
        Ok(())
    }
}

/// Store for export jobs plus the cancellation tokens of in-flight workers.
#[derive(Default)]
pub struct ExportJobStore {
    jobs: RwLock<HashMap<Uuid, ExportJob>>,
    cancellations: RwLock<HashMap<Uuid, CancellationToken>>,
}

impl ExportJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, job: ExportJob) {
        self.jobs.write().await.insert(job.id, job);
    }

    pub async fn get(&self, id: Uuid) -> Result<ExportJob> {
        self.jobs
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| SisError::JobNotFound(id.to_string()))
    }

    pub async fn list(
        &self,
        status: Option<ExportStatus>,
        pagination: Pagination,
    ) -> (Vec<ExportJob>, u64) {
        let jobs = self.jobs.read().await;
        let mut matched: Vec<ExportJob> = jobs
            .values()
            .filter(|job| status.map_or(true, |s| job.status == s))
            .cloned()
            .collect();
        matched.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));

        let total = matched.len() as u64;
        let offset = usize::try_from(pagination.offset).unwrap_or(0);
        let limit = usize::try_from(pagination.limit).unwrap_or(0);
        let page = matched.into_iter().skip(offset).take(limit).collect();
        (page, total)
    }

    pub async fn transition(&self, id: Uuid, next: ExportStatus) -> Result<ExportJob> {
        let mut jobs = self.jobs.write().await;
        let job = jobs
            .get_mut(&id)
            .ok_or_else(|| SisError::JobNotFound(id.to_string()))?;
        if !job.status.can_transition_to(next) {
            return Err(SisError::invalid_transition(job.status, next));
        }
        job.status = next;
        if next.is_terminal() {
            job.completed_at = Some(Utc::now());
        }
        Ok(job.clone())
    }

    /// Mark an export finished, recording what was written and where.
    pub async fn complete(
        &self,
        id: Uuid,
        total_records: u64,
        file_path: std::path::PathBuf,
    ) -> Result<ExportJob> {
        let mut jobs = self.jobs.write().await;
        let job = jobs
            .get_mut(&id)
            .ok_or_else(|| SisError::JobNotFound(id.to_string()))?;
        if !job.status.can_transition_to(ExportStatus::Completed) {
            return Err(SisError::invalid_transition(job.status, ExportStatus::Completed));
        }
        job.status = ExportStatus::Completed;
        job.total_records = Some(total_records);
        job.file_path = Some(file_path);
        job.completed_at = Some(Utc::now());
        Ok(job.clone())
    }

    /// Fail an export. Cancellation is a failure with
    /// [`ExportFailureReason::Cancelled`]; no partial artifact is recorded.
    pub async fn fail(
        &self,
        id: Uuid,
        reason: ExportFailureReason,
        message: impl Into<String>,
    ) -> Result<ExportJob> {
        let mut jobs = self.jobs.write().await;
        let job = jobs
            .get_mut(&id)
            .ok_or_else(|| SisError::JobNotFound(id.to_string()))?;
        if !job.status.can_transition_to(ExportStatus::Failed) {
            return Err(SisError::invalid_transition(job.status, ExportStatus::Failed));
        }
        job.status = ExportStatus::Failed;
        job.failure_reason = Some(reason);
        job.error_message = Some(message.into());
        job.completed_at = Some(Utc::now());
        Ok(job.clone())
    }

    /// Create and retain the cancellation token for a job's worker.
    pub async fn register_cancel_token(&self, id: Uuid) -> CancellationToken {
        let token = CancellationToken::new();
        self.cancellations.write().await.insert(id, token.clone());
        token
    }

    /// Trigger a job's cancellation token if one is registered. Returns
    /// whether a token was found; triggering an already-cancelled token is
    /// harmless.
    pub async fn request_cancel(&self, id: Uuid) -> bool {
        match self.cancellations.read().await.get(&id) {
            Some(token) => {
                token.cancel();
                true
            },
            None => false,
        }
    }

    /// Drop the token once a worker reaches a terminal status.
    pub async fn clear_cancel_token(&self, id: Uuid) {
        self.cancellations.write().await.remove(&id);
    }
}
