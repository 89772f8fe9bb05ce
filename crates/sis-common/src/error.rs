//! Error types shared across the SIS workspace

use thiserror::Error;

/// Result type alias for SIS operations
pub type Result<T> = std::result::Result<T, SisError>;

/// Main error type for SIS operations
#[derive(Error, Debug)]
pub enum SisError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Job not found: {0}")]
    JobNotFound(String),

    #[error("Invalid state transition: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl SisError {
    /// Build an invalid-transition error from any pair of status-like values.
    pub fn invalid_transition(from: impl ToString, to: impl ToString) -> Self {
        SisError::InvalidStateTransition {
            from: from.to_string(),
            to: to.to_string(),
        }
    }
}
