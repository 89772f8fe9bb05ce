//! API request and response types
//!
//! Matches the backend API structure. Job snapshots deserialize into the
//! shared `sis_common` types; everything envelope-shaped is mirrored here.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use sis_common::types::{RowAction, ValidationIssue};

/// Standard API response wrapper
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(default = "Option::default")]
    pub data: Option<T>,
    #[serde(default)]
    pub meta: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<ErrorDetail>,
}

/// Error payload inside a failed envelope
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(default)]
    pub details: Option<serde_json::Value>,
}

/// Pagination metadata under `meta.pagination` on list responses
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PaginationMeta {
    pub limit: i64,
    pub offset: i64,
    pub total: i64,
    pub has_more: bool,
}

/// Body for `POST /imports/{job_id}/commit`
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct CommitRequest {
    pub allow_updates: bool,
    pub skip_duplicates: bool,
    pub skip_errors: bool,
}

/// Body for `POST /exports`
#[derive(Debug, Clone, Serialize)]
pub struct CreateExportRequest {
    pub resource_type: String,
    pub file_format: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub filters: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
}

/// Overall validation verdict of one previewed row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowValidationStatus {
    Valid,
    Warning,
    Error,
}

impl RowValidationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RowValidationStatus::Valid => "valid",
            RowValidationStatus::Warning => "warning",
            RowValidationStatus::Error => "error",
        }
    }
}

/// One row of a preview response
#[derive(Debug, Clone, Deserialize)]
pub struct PreviewRow {
    pub row_number: u32,
    pub action: RowAction,
    pub validation_status: RowValidationStatus,
    pub data: BTreeMap<String, String>,
    #[serde(default)]
    pub issues: Vec<ValidationIssue>,
}

/// Per-action row counts over the whole upload
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ActionSummary {
    pub create: u64,
    pub update: u64,
    pub skip: u64,
}

/// Response from `GET /imports/{job_id}/preview`
#[derive(Debug, Clone, Deserialize)]
pub struct PreviewResponse {
    pub total_rows: u64,
    pub valid_rows: u64,
    pub rows_with_warnings: u64,
    pub rows_with_errors: u64,
    pub can_proceed: bool,
    pub summary: ActionSummary,
    pub rows: Vec<PreviewRow>,
}
