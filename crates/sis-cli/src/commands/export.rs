//! `sis export` command implementation
//!
//! Create, inspect, cancel, and download export jobs.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use colored::Colorize;

use crate::api::{ApiClient, CreateExportRequest};
use crate::error::{CliError, Result};
use crate::poll::{poll_until, PollConfig};
use crate::progress;
use crate::{ExportCommand, ExportCreateArgs};
use sis_common::types::{ExportFailureReason, ExportFormat, ExportJob, ExportStatus, ResourceType};

/// Dispatch an export subcommand
pub async fn run(server_url: &str, command: &ExportCommand) -> Result<()> {
    match command {
        ExportCommand::Create(args) => create(server_url, args).await,
        ExportCommand::Status { job_id } => status(server_url, job_id).await,
        ExportCommand::Cancel { job_id } => cancel(server_url, job_id).await,
        ExportCommand::Download { job_id, output } => {
            download(server_url, job_id, output.as_deref()).await
        },
    }
}

async fn create(server_url: &str, args: &ExportCreateArgs) -> Result<()> {
    let resource: ResourceType = args
        .resource_type
        .parse()
        .map_err(|_| CliError::InvalidResourceType(args.resource_type.clone()))?;
    let format: ExportFormat = args
        .file_format
        .parse()
        .map_err(|_| CliError::InvalidFileFormat(args.file_format.clone()))?;
    let filters = parse_filters(&args.filters)?;

    let client = ApiClient::new(server_url.to_string())?;
    let request = CreateExportRequest {
        resource_type: resource.as_str().to_string(),
        file_format: format.as_str().to_string(),
        filters,
        limit: args.limit,
    };
    let job = client.create_export(&request).await?;
    println!(
        "{} Export job created: {} ({})",
        "✓".green(),
        job.id,
        super::colored_status(job.status.as_str())
    );

    // --output implies waiting for the artifact.
    if !args.wait && args.output.is_none() {
        println!("The export runs in the background; check it with 'sis export status {}'.", job.id);
        return Ok(());
    }

    let job = wait_for_terminal(&client, &job, args.poll_interval_ms).await?;
    if job.status != ExportStatus::Completed {
        let message = describe_failure(&job);
        return Err(CliError::JobFailed {
            kind: "export",
            job_id: job.id.to_string(),
            message,
        });
    }

    println!(
        "{} Export completed: {} record(s)",
        "✓".green().bold(),
        job.total_records.unwrap_or(0)
    );
    if let Some(output) = &args.output {
        save_artifact(&client, &job, Some(output)).await?;
    } else {
        println!("Download it with 'sis export download {}'.", job.id);
    }
    Ok(())
}

async fn status(server_url: &str, job_id: &str) -> Result<()> {
    let id = super::parse_job_id(job_id)?;
    let client = ApiClient::new(server_url.to_string())?;
    let job = client.get_export_job(id).await?;
    super::print_export_job(&job);
    Ok(())
}

async fn cancel(server_url: &str, job_id: &str) -> Result<()> {
    let id = super::parse_job_id(job_id)?;
    let client = ApiClient::new(server_url.to_string())?;
    let job = client.cancel_export(id).await?;
    println!("{} Cancellation requested", "✓".green());
    super::print_export_job(&job);
    Ok(())
}

async fn download(server_url: &str, job_id: &str, output: Option<&Path>) -> Result<()> {
    let id = super::parse_job_id(job_id)?;
    let client = ApiClient::new(server_url.to_string())?;
    let job = client.get_export_job(id).await?;
    save_artifact(&client, &job, output).await
}

/// Poll the job until it reaches a terminal status.
async fn wait_for_terminal(
    client: &ApiClient,
    job: &ExportJob,
    poll_interval_ms: u64,
) -> Result<ExportJob> {
    let job_id = job.id;
    let spinner = progress::create_spinner("Exporting...");
    let result = poll_until(
        PollConfig::with_interval_ms(poll_interval_ms),
        &job_id.to_string(),
        || client.get_export_job(job_id),
        |j: &ExportJob| j.status.is_terminal(),
    )
    .await;
    spinner.finish_and_clear();
    result
}

async fn save_artifact(client: &ApiClient, job: &ExportJob, output: Option<&Path>) -> Result<()> {
    let (filename, bytes) = client.download_export(job.id).await?;
    let target: PathBuf = match output {
        Some(path) => path.to_path_buf(),
        None => PathBuf::from(&filename),
    };
    std::fs::write(&target, &bytes)?;
    println!(
        "{} Saved {} ({})",
        "✓".green(),
        target.display(),
        progress::format_bytes(bytes.len() as u64)
    );
    Ok(())
}

/// Parse repeated `--filter column=value` flags into a map.
fn parse_filters(raw: &[String]) -> Result<BTreeMap<String, String>> {
    let mut filters = BTreeMap::new();
    for entry in raw {
        let (column, value) = entry
            .split_once('=')
            .ok_or_else(|| CliError::InvalidFilter(entry.clone()))?;
        if column.trim().is_empty() {
            return Err(CliError::InvalidFilter(entry.clone()));
        }
        filters.insert(column.trim().to_string(), value.trim().to_string());
    }
    Ok(filters)
}

fn describe_failure(job: &ExportJob) -> String {
    match (job.failure_reason, job.error_message.as_deref()) {
        (Some(ExportFailureReason::Cancelled), _) => {
            "cancelled before the artifact was produced".to_string()
        },
        (_, Some(message)) => message.to_string(),
        (Some(reason), None) => reason.as_str().to_string(),
        (None, None) => "job did not complete".to_string(),
    }
}
