//! `sis import` command implementation
//!
//! The guided import flow: upload the file, wait for validation, show the
//! preview table, then commit and wait for the final counts.

use colored::Colorize;

use crate::api::{ApiClient, CommitRequest, PreviewResponse, PreviewRow};
use crate::error::{CliError, Result};
use crate::poll::{poll_until, PollConfig};
use crate::progress;
use crate::ImportArgs;
use sis_common::types::{ImportJob, ImportStatus};

/// Run the import flow
pub async fn run(server_url: &str, args: &ImportArgs) -> Result<()> {
    let bytes = std::fs::read(&args.file)
        .map_err(|_| CliError::FileNotFound(args.file.display().to_string()))?;
    let filename = args
        .file
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload")
        .to_string();

    let client = ApiClient::new(server_url.to_string())?;
    if !client.health_check().await? {
        return Err(CliError::api("Cannot connect to the SIS server"));
    }

    println!(
        "{} Uploading {} ({})...",
        "→".cyan(),
        filename,
        progress::format_bytes(bytes.len() as u64)
    );
    let job = client
        .upload_import(&args.resource_type, &filename, bytes, args.format.as_deref())
        .await?;
    let job_id = job.id;
    println!(
        "{} Import job created: {} ({})",
        "✓".green(),
        job_id,
        super::colored_status(job.status.as_str())
    );

    if args.no_wait {
        println!("Validation runs in the background; check it with 'sis status {}'.", job_id);
        return Ok(());
    }

    let schedule = PollConfig::with_interval_ms(args.poll_interval_ms);

    let spinner = progress::create_spinner("Validating...");
    let job = poll_until(
        schedule,
        &job_id.to_string(),
        || client.get_import_job(job_id),
        |j: &ImportJob| j.status == ImportStatus::Ready || j.status.is_terminal(),
    )
    .await;
    spinner.finish_and_clear();
    let job = job?;

    if job.status != ImportStatus::Ready {
        let message = job
            .error_message
            .clone()
            .unwrap_or_else(|| format!("job is {}", job.status));
        return Err(CliError::JobFailed {
            kind: "import",
            job_id: job_id.to_string(),
            message,
        });
    }
    println!("{} Validation finished: {} row(s)", "✓".green(), job.total_rows);

    let preview = client
        .preview_import(job_id, args.allow_updates, args.skip_duplicates)
        .await?;
    print!("{}", render_preview_table(&preview));
    println!(
        "Summary: {} create, {} update, {} skip; {} warning row(s), {} error row(s)",
        preview.summary.create,
        preview.summary.update,
        preview.summary.skip,
        preview.rows_with_warnings,
        preview.rows_with_errors
    );
    if (preview.rows.len() as u64) < preview.total_rows {
        println!("(showing the first {} of {} rows)", preview.rows.len(), preview.total_rows);
    }

    if args.dry_run {
        println!("Dry run; the job stays ready. Re-run without --dry-run to commit.");
        return Ok(());
    }

    if !preview.can_proceed && !args.skip_errors {
        return Err(CliError::ValidationBlocked {
            rows_with_errors: preview.rows_with_errors,
        });
    }

    println!("{} Committing...", "→".cyan());
    let request = CommitRequest {
        allow_updates: args.allow_updates,
        skip_duplicates: args.skip_duplicates,
        skip_errors: args.skip_errors,
    };
    client.commit_import(job_id, &request).await?;

    let spinner = progress::create_spinner("Importing...");
    let job = poll_until(
        schedule,
        &job_id.to_string(),
        || client.get_import_job(job_id),
        |j: &ImportJob| j.status.is_terminal(),
    )
    .await;
    spinner.finish_and_clear();
    let job = job?;

    match job.status {
        ImportStatus::Completed => {
            println!(
                "{} Import completed: {} succeeded, {} failed ({} rows)",
                "✓".green().bold(),
                job.successful_rows,
                job.failed_rows,
                job.total_rows
            );
            if job.rows_with_errors() > 0 {
                println!(
                    "  {} row(s) carried errors; run 'sis status {}' for details.",
                    job.rows_with_errors(),
                    job_id
                );
            }
            Ok(())
        },
        _ => {
            let message = job
                .error_message
                .clone()
                .unwrap_or_else(|| format!("job is {}", job.status));
            Err(CliError::JobFailed {
                kind: "import",
                job_id: job_id.to_string(),
                message,
            })
        },
    }
}

/// Format the preview as a table
fn render_preview_table(preview: &PreviewResponse) -> String {
    use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Table};

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec!["Row", "Action", "Status", "Details"]);

    for row in &preview.rows {
        table.add_row(vec![
            row.row_number.to_string(),
            row.action.as_str().to_string(),
            row.validation_status.as_str().to_string(),
            row_details(row),
        ]);
    }

    format!("{}\n", table)
}

/// Issue messages when the row has any, otherwise its leading field values.
fn row_details(row: &PreviewRow) -> String {
    if row.issues.is_empty() {
        row.data
            .iter()
            .take(3)
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(" ")
    } else {
        row.issues
            .iter()
            .map(|issue| issue.message.clone())
            .collect::<Vec<_>>()
            .join("; ")
    }
}
