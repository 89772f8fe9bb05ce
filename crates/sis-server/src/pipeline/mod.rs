//! The import/export pipeline.
//!
//! Parsing, validation, preview, commit, and export generation. Feature
//! handlers call into this module; nothing here knows about HTTP.

pub mod commit;
pub mod export;
pub mod import;
pub mod parser;
pub mod preview;
pub mod schema;
pub mod serialize;
pub mod validate;

pub use commit::{CommitError, CommitRequest};
pub use parser::{ParseError, ParsedRow, ParsedUpload};
pub use preview::{build_preview, ImportPreview};
pub use schema::ResourceSchema;
pub use validate::{validate_rows, ValidatedRow, ValidationContext};
