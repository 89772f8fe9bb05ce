//! Export feature module
//!
//! Request a bulk extract, poll it to completion, then download the
//! artifact. Generation runs on a background worker; cancellation is a
//! cooperative signal the worker checks between row batches.

pub mod commands;
pub mod queries;
pub mod routes;


pub use commands::{CancelExportCommand, CreateExportCommand, CreateExportError};

pub use queries::{
    DownloadExportError, DownloadExportQuery, DownloadExportResponse, GetExportJobQuery,
    ListExportJobsQuery, ListExportJobsResponse,
};

pub use routes::exports_routes;
