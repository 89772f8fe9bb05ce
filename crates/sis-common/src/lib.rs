//! SIS Common Library
#![deny(clippy::unwrap_used, clippy::expect_used)]
//!
//! Shared types, utilities, and error handling for the SIS bulk data service.
//!
//! # Overview
//!
//! This crate provides common functionality used across all workspace members:
//!
//! - **Error Handling**: Custom error types and result types
//! - **Types**: Import/export job models and their status machines
//! - **Checksums**: Upload and artifact integrity utilities
//! - **Logging**: Tracing bootstrap shared by the server and the CLI
//!
//! # Example
//!
//! ```no_run
//! use sis_common::types::{ImportStatus, ResourceType};
//!
//! let status = ImportStatus::Pending;
//! assert!(status.can_transition_to(ImportStatus::Validating));
//! assert_eq!(ResourceType::Students.as_str(), "students");
//! ```

pub mod checksum;
pub mod error;
pub mod logging;
pub mod types;

// Re-export commonly used types
pub use error::{Result, SisError};
