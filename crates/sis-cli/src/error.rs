//! Error types for the SIS CLI
//!
//! This module provides user-friendly error types with clear, actionable
//! messages that help operators understand what went wrong and how to fix it.

use thiserror::Error;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Comprehensive error type for CLI operations
///
/// All errors are designed to be user-facing with clear messages and suggestions.
#[derive(Error, Debug)]
pub enum CliError {
    /// API server communication failed
    #[error("Server error: {0}. Ensure the SIS server is running and reachable at the configured URL.")]
    Api(String),

    /// The server rejected the request with a structured error
    #[error("{message} (server code: {code})")]
    Server { code: String, message: String },

    /// Required file is missing
    #[error("File not found: '{0}'. Verify the file path exists and you have read permissions.")]
    FileNotFound(String),

    /// Job id is not a UUID
    #[error("Invalid job id: '{0}'. Job ids are UUIDs printed when a job is created; run 'sis jobs' to list them.")]
    InvalidJobId(String),

    /// Resource type is not one the server knows
    #[error("Invalid resource type: '{0}'. Valid resource types are: students, courses, grades.")]
    InvalidResourceType(String),

    /// Export format is not supported
    #[error("Invalid file format: '{0}'. Valid export formats are: csv, xlsx, pdf.")]
    InvalidFileFormat(String),

    /// Filter argument is not key=value
    #[error("Invalid filter: '{0}'. Filters take the form column=value, e.g. --filter major=CS.")]
    InvalidFilter(String),

    /// Preview found rows that block the commit
    #[error("{rows_with_errors} row(s) have validation errors; the import cannot proceed. Fix the source file, or re-run with --skip-errors to import the valid rows and count the rest as failed.")]
    ValidationBlocked { rows_with_errors: u64 },

    /// Status filter matches neither job kind
    #[error("Invalid status filter: '{0}'. Import statuses: pending, validating, ready, importing, completed, failed, cancelled. Export statuses: pending, processing, completed, failed.")]
    InvalidStatusFilter(String),

    /// The job finished in a failed state
    #[error("The {kind} job failed: {message}. Run 'sis status {job_id}' for the full snapshot.")]
    JobFailed {
        kind: &'static str,
        job_id: String,
        message: String,
    },

    /// Polling gave up before the job reached a terminal status
    #[error("Gave up waiting after {attempts} poll(s). The job is still running on the server; check it later with 'sis status {job_id}'.")]
    PollTimeout { attempts: u32, job_id: String },

    /// File system operation failed
    #[error("File operation failed: {0}. Check file permissions and disk space.")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("Network request failed: {0}. Check your connection and the server URL (--server-url or SIS_SERVER_URL).")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed
    #[error("Failed to parse server response: {0}. The server may be running an incompatible version.")]
    JsonParse(#[from] serde_json::Error),

    /// Configuration is missing or invalid
    #[error("Configuration error: {0}. Check your environment variables and command-line flags.")]
    Config(String),

    /// Generic anyhow error wrapper
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CliError {
    /// Create an API error
    pub fn api(msg: impl Into<String>) -> Self {
        Self::Api(msg.into())
    }

    /// Create a structured server error from an error envelope
    pub fn server(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Server {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an invalid job id error
    pub fn invalid_job_id(id: impl Into<String>) -> Self {
        Self::InvalidJobId(id.into())
    }
}
