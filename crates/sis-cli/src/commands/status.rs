//! `sis status` command implementation
//!
//! Resolves the id against import jobs first and falls back to export jobs,
//! so callers do not have to remember which kind they created.

use colored::Colorize;

use crate::api::ApiClient;
use crate::error::{CliError, Result};
use sis_common::types::{ImportJob, IssueSeverity};

/// Issue rows shown before the listing is elided.
const MAX_ISSUE_ROWS: usize = 20;

/// Show one job by id
pub async fn run(server_url: &str, job_id: &str) -> Result<()> {
    let id = super::parse_job_id(job_id)?;
    let client = ApiClient::new(server_url.to_string())?;

    match client.get_import_job(id).await {
        Ok(job) => {
            super::print_import_job(&job);
            print_issues(&job);
            return Ok(());
        },
        Err(CliError::Server { ref code, .. }) if code == "NOT_FOUND" => {},
        Err(other) => return Err(other),
    }

    match client.get_export_job(id).await {
        Ok(job) => {
            super::print_export_job(&job);
            Ok(())
        },
        Err(CliError::Server { ref code, .. }) if code == "NOT_FOUND" => Err(CliError::server(
            "NOT_FOUND",
            format!("No import or export job with id {id}; run 'sis jobs' to list known jobs"),
        )),
        Err(other) => Err(other),
    }
}

/// Print per-row validation findings, newest jobs carry them keyed by row.
fn print_issues(job: &ImportJob) {
    if job.validation_issues.is_empty() {
        return;
    }

    println!("\n{}", "Validation issues".cyan().bold());
    let mut shown = 0usize;
    for (row, issues) in &job.validation_issues {
        if shown == MAX_ISSUE_ROWS {
            let remaining = job.validation_issues.len() - shown;
            println!("  ... and {} more row(s)", remaining);
            break;
        }
        for issue in issues {
            let severity = match issue.severity {
                IssueSeverity::Error => "error".red(),
                IssueSeverity::Warning => "warning".yellow(),
            };
            println!("  row {}: [{}] {}", row, severity, issue.message);
        }
        shown += 1;
    }
}
