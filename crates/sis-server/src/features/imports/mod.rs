//! Import feature module
//!
//! Upload a tabular file, watch validation finish, preview the outcome,
//! then commit or cancel. Uploads are parsed and validated off the request
//! path; the commit endpoint is the only one that writes entities.

pub mod commands;
pub mod queries;
pub mod routes;

#[cfg(test)]
mod routes_test;

pub use commands::{
    CancelImportCommand, CommitImportCommand, UploadImportCommand, UploadImportError,
};

pub use queries::{
    GetImportJobQuery, ListImportJobsQuery, ListImportJobsResponse, PreviewError,
    PreviewImportQuery,
};

pub use routes::imports_routes;
