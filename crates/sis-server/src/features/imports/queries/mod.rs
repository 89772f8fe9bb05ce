pub mod get_job;
pub mod list_jobs;
pub mod preview;

pub use get_job::GetImportJobQuery;
pub use list_jobs::{ListImportJobsQuery, ListImportJobsResponse};
pub use preview::{PreviewError, PreviewImportQuery};
