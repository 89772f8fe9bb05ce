//! CLI command implementations
//!
//! Each subcommand has its own module with a `run` function (or one function
//! per subcommand for grouped commands).

pub mod export;
pub mod import;
pub mod jobs;
pub mod status;

use colored::{ColoredString, Colorize};
use uuid::Uuid;

use crate::error::{CliError, Result};
use sis_common::types::{ExportJob, ImportJob};

/// Parse a job id argument, rejecting non-UUIDs before any network call.
pub(crate) fn parse_job_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|_| CliError::invalid_job_id(raw))
}

/// Color a status word the way every command renders it.
pub(crate) fn colored_status(status: &str) -> ColoredString {
    match status {
        "completed" => status.green(),
        "ready" => status.cyan(),
        "failed" => status.red(),
        "cancelled" => status.yellow(),
        other => other.normal(),
    }
}

/// Print an import job snapshot as a key/value block.
pub(crate) fn print_import_job(job: &ImportJob) {
    println!("{}", "Import job:".cyan().bold());
    println!("  Id:        {}", job.id);
    println!("  Resource:  {}", job.resource_type);
    println!("  Source:    {}", job.source_format);
    println!("  Status:    {}", colored_status(job.status.as_str()));
    println!("  Rows:      {} total, {} succeeded, {} failed", job.total_rows, job.successful_rows, job.failed_rows);
    if job.rows_with_errors() > 0 {
        println!("  Issues:    {} row(s) with errors", job.rows_with_errors());
    }
    if let Some(ref message) = job.error_message {
        println!("  Error:     {}", message.red());
    }
    println!("  Created:   {}", job.created_at.format("%Y-%m-%d %H:%M:%S UTC"));
    if let Some(completed_at) = job.completed_at {
        println!("  Finished:  {}", completed_at.format("%Y-%m-%d %H:%M:%S UTC"));
    }
}

/// Print an export job snapshot as a key/value block.
pub(crate) fn print_export_job(job: &ExportJob) {
    println!("{}", "Export job:".cyan().bold());
    println!("  Id:        {}", job.id);
    println!("  Resource:  {}", job.resource_type);
    println!("  Format:    {}", job.file_format);
    println!("  Status:    {}", colored_status(job.status.as_str()));
    if !job.filters.is_empty() {
        let filters: Vec<String> =
            job.filters.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
        println!("  Filters:   {}", filters.join(", "));
    }
    if let Some(limit) = job.limit {
        println!("  Limit:     {}", limit);
    }
    if let Some(total) = job.total_records {
        println!("  Records:   {}", total);
    }
    if let Some(reason) = job.failure_reason {
        println!("  Reason:    {}", reason.as_str().yellow());
    }
    if let Some(ref message) = job.error_message {
        println!("  Error:     {}", message.red());
    }
    if job.file_path.is_some() {
        println!("  Artifact:  ready (download with 'sis export download {}')", job.id);
    }
    println!("  Created:   {}", job.created_at.format("%Y-%m-%d %H:%M:%S UTC"));
    if let Some(completed_at) = job.completed_at {
        println!("  Finished:  {}", completed_at.format("%Y-%m-%d %H:%M:%S UTC"));
    }
}
