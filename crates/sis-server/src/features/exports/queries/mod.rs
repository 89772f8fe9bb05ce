pub mod download;
pub mod get_job;
pub mod list_jobs;

pub use download::{DownloadExportError, DownloadExportQuery, DownloadExportResponse};
pub use get_job::GetExportJobQuery;
pub use list_jobs::{ListExportJobsQuery, ListExportJobsResponse};
