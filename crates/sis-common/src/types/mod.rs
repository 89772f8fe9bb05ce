//! Domain types shared across the SIS bulk data service
//!
//! The import and export job models live here together with their status
//! machines. Status transitions are validated through
//! [`ImportStatus::can_transition_to`] and [`ExportStatus::can_transition_to`];
//! the stores in the server crate refuse anything the tables below do not
//! allow.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use uuid::Uuid;

/// Kind of entity a bulk job reads or writes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    Students,
    Courses,
    Grades,
}

impl ResourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Students => "students",
            ResourceType::Courses => "courses",
            ResourceType::Grades => "grades",
        }
    }
}

impl std::str::FromStr for ResourceType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "students" | "student" => Ok(ResourceType::Students),
            "courses" | "course" => Ok(ResourceType::Courses),
            "grades" | "grade" => Ok(ResourceType::Grades),
            _ => Err(format!("Invalid resource type: {}", s)),
        }
    }
}

impl std::fmt::Display for ResourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Upload file format accepted by the import pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceFormat {
    Csv,
    Json,
    Xlsx,
}

impl SourceFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceFormat::Csv => "csv",
            SourceFormat::Json => "json",
            SourceFormat::Xlsx => "xlsx",
        }
    }

    /// Guess the format from an uploaded file name, by extension.
    pub fn from_filename(name: &str) -> Option<Self> {
        let ext = name.rsplit_once('.').map(|(_, ext)| ext.to_lowercase())?;
        match ext.as_str() {
            "csv" => Some(SourceFormat::Csv),
            "json" => Some(SourceFormat::Json),
            "xlsx" => Some(SourceFormat::Xlsx),
            _ => None,
        }
    }
}

impl std::str::FromStr for SourceFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(SourceFormat::Csv),
            "json" => Ok(SourceFormat::Json),
            "xlsx" => Ok(SourceFormat::Xlsx),
            _ => Err(format!("Invalid source format: {}", s)),
        }
    }
}

impl std::fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Artifact format produced by the export pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    Csv,
    Xlsx,
    Pdf,
}

impl ExportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Pdf => "pdf",
        }
    }

    /// File extension for artifacts of this format.
    pub fn extension(&self) -> &'static str {
        self.as_str()
    }

    /// Content type served on artifact download.
    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv",
            ExportFormat::Xlsx => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            },
            ExportFormat::Pdf => "application/pdf",
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "xlsx" => Ok(ExportFormat::Xlsx),
            "pdf" => Ok(ExportFormat::Pdf),
            _ => Err(format!("Invalid export format: {}", s)),
        }
    }
}

impl std::fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Import job status
///
/// ```text
/// pending -> validating -> ready -> importing -> completed
///                |           |          |
///                v           v          v
///              failed    cancelled  failed | cancelled
/// ```
///
/// `completed`, `failed` and `cancelled` are terminal; nothing leaves them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportStatus {
    Pending,
    Validating,
    Ready,
    Importing,
    Completed,
    Failed,
    Cancelled,
}

impl ImportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportStatus::Pending => "pending",
            ImportStatus::Validating => "validating",
            ImportStatus::Ready => "ready",
            ImportStatus::Importing => "importing",
            ImportStatus::Completed => "completed",
            ImportStatus::Failed => "failed",
            ImportStatus::Cancelled => "cancelled",
        }
    }

    /// Terminal statuses accept no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ImportStatus::Completed | ImportStatus::Failed | ImportStatus::Cancelled
        )
    }

    /// Whether `next` is a legal successor of this status.
    pub fn can_transition_to(&self, next: ImportStatus) -> bool {
        use ImportStatus::*;
        matches!(
            (self, next),
            (Pending, Validating)
                | (Validating, Ready)
                | (Validating, Failed)
                | (Ready, Importing)
                | (Ready, Cancelled)
                | (Importing, Completed)
                | (Importing, Failed)
                | (Importing, Cancelled)
        )
    }
}

impl std::str::FromStr for ImportStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(ImportStatus::Pending),
            "validating" => Ok(ImportStatus::Validating),
            "ready" => Ok(ImportStatus::Ready),
            "importing" => Ok(ImportStatus::Importing),
            "completed" => Ok(ImportStatus::Completed),
            "failed" => Ok(ImportStatus::Failed),
            "cancelled" => Ok(ImportStatus::Cancelled),
            _ => Err(format!("Invalid import status: {}", s)),
        }
    }
}

impl std::fmt::Display for ImportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Export job status
///
/// Cancellation is folded into `failed`: a cancelled export finishes as
/// `failed` with [`ExportFailureReason::Cancelled`], so pollers only ever
/// see the four statuses below.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl ExportStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportStatus::Pending => "pending",
            ExportStatus::Processing => "processing",
            ExportStatus::Completed => "completed",
            ExportStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ExportStatus::Completed | ExportStatus::Failed)
    }

    /// Whether `next` is a legal successor of this status.
    ///
    /// `pending -> failed` covers a cancellation that lands before the
    /// worker ever picks the job up.
    pub fn can_transition_to(&self, next: ExportStatus) -> bool {
        use ExportStatus::*;
        matches!(
            (self, next),
            (Pending, Processing) | (Pending, Failed) | (Processing, Completed) | (Processing, Failed)
        )
    }
}

impl std::str::FromStr for ExportStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(ExportStatus::Pending),
            "processing" => Ok(ExportStatus::Processing),
            "completed" => Ok(ExportStatus::Completed),
            "failed" => Ok(ExportStatus::Failed),
            _ => Err(format!("Invalid export status: {}", s)),
        }
    }
}

impl std::fmt::Display for ExportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Why a `failed` export job failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFailureReason {
    /// Cancelled cooperatively before the artifact was produced
    Cancelled,
    /// Generation error (store query, serialization or artifact write)
    Error,
}

impl ExportFailureReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFailureReason::Cancelled => "cancelled",
            ExportFailureReason::Error => "error",
        }
    }
}

/// Severity of a validation issue
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueSeverity {
    Warning,
    Error,
}

/// What a validation issue is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// Required column missing or blank
    MissingField,
    /// Value present but not coercible or out of range
    InvalidValue,
    /// Natural key already exists, or repeats within the upload
    Duplicate,
    /// Row references an entity that does not exist
    UnknownReference,
    /// Entity store rejected the row during commit
    WriteFailed,
}

impl IssueKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueKind::MissingField => "missing_field",
            IssueKind::InvalidValue => "invalid_value",
            IssueKind::Duplicate => "duplicate",
            IssueKind::UnknownReference => "unknown_reference",
            IssueKind::WriteFailed => "write_failed",
        }
    }
}

/// One finding about one row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub kind: IssueKind,
    pub severity: IssueSeverity,
    pub message: String,
}

impl ValidationIssue {
    pub fn error(kind: IssueKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity: IssueSeverity::Error,
            message: message.into(),
        }
    }

    pub fn warning(kind: IssueKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity: IssueSeverity::Warning,
            message: message.into(),
        }
    }
}

/// Action the commit executor will take for a row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowAction {
    Create,
    Update,
    Skip,
}

impl RowAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            RowAction::Create => "create",
            RowAction::Update => "update",
            RowAction::Skip => "skip",
        }
    }
}

/// Caller-tunable knobs for validation and commit
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ImportOptions {
    /// Rows matching an existing entity become `update` instead of `skip`
    #[serde(default)]
    pub allow_updates: bool,
    /// Second and later occurrences of a natural key within the upload
    /// are forced to `skip`
    #[serde(default)]
    pub skip_duplicates: bool,
}

/// Import job record
///
/// Created on upload, mutated only by the pipeline workers through the job
/// store, immutable once a terminal status is reached. The counter
/// invariant `successful_rows + failed_rows <= total_rows` holds at every
/// snapshot, with equality at `completed`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportJob {
    pub id: Uuid,
    pub resource_type: ResourceType,
    pub source_format: SourceFormat,
    pub status: ImportStatus,
    pub total_rows: u64,
    pub successful_rows: u64,
    pub failed_rows: u64,
    /// Per-row findings from upload-time validation, keyed by 1-based row
    /// number. Commit appends write failures here.
    pub validation_issues: BTreeMap<u32, Vec<ValidationIssue>>,
    /// Fatal error detail when `status` is `failed`
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl ImportJob {
    pub fn new(resource_type: ResourceType, source_format: SourceFormat) -> Self {
        Self {
            id: Uuid::new_v4(),
            resource_type,
            source_format,
            status: ImportStatus::Pending,
            total_rows: 0,
            successful_rows: 0,
            failed_rows: 0,
            validation_issues: BTreeMap::new(),
            error_message: None,
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    /// Rows that carry at least one error-severity issue.
    pub fn rows_with_errors(&self) -> u64 {
        self.validation_issues
            .values()
            .filter(|issues| {
                issues
                    .iter()
                    .any(|i| i.severity == IssueSeverity::Error)
            })
            .count() as u64
    }
}

/// Export job record
///
/// Mutated only by the export worker; everyone else gets snapshots.
/// `file_path` is populated exactly when `status` is `completed`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportJob {
    pub id: Uuid,
    pub resource_type: ResourceType,
    pub file_format: ExportFormat,
    /// Opaque equality filters passed through to the entity store
    pub filters: BTreeMap<String, String>,
    /// Upper bound on exported records
    pub limit: Option<u64>,
    pub status: ExportStatus,
    pub failure_reason: Option<ExportFailureReason>,
    pub error_message: Option<String>,
    pub total_records: Option<u64>,
    pub file_path: Option<PathBuf>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl ExportJob {
    pub fn new(
        resource_type: ResourceType,
        file_format: ExportFormat,
        filters: BTreeMap<String, String>,
        limit: Option<u64>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            resource_type,
            file_format,
            filters,
            limit,
            status: ExportStatus::Pending,
            failure_reason: None,
            error_message: None,
            total_records: None,
            file_path: None,
            created_at: Utc::now(),
            completed_at: None,
        }
    }
}

/// Pagination parameters for list queries
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Pagination {
    /// Maximum number of items to return
    pub limit: i64,

    /// Number of items to skip
    pub offset: i64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            limit: 50,
            offset: 0,
        }
    }
}

impl Pagination {
    pub fn new(limit: i64, offset: i64) -> Self {
        Self { limit, offset }
    }
}
