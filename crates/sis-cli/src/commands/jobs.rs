//! `sis jobs` command implementation
//!
//! Tabular listing of import and export jobs, newest first as the server
//! returns them.

use colored::Colorize;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Table};

use crate::api::{ApiClient, PaginationMeta};
use crate::error::{CliError, Result};
use sis_common::types::{ExportJob, ExportStatus, ImportJob, ImportStatus};

/// List jobs, optionally narrowed by kind and status
pub async fn run(
    server_url: &str,
    kind: &str,
    status: Option<&str>,
    limit: i64,
    offset: i64,
) -> Result<()> {
    let (list_imports, list_exports) = sides_to_list(kind, status)?;
    let client = ApiClient::new(server_url.to_string())?;

    if list_imports {
        let (jobs, meta) = client
            .list_import_jobs(status, Some(limit), Some(offset))
            .await?;
        println!("{}", "Import jobs".cyan().bold());
        if jobs.is_empty() {
            println!("  (none)");
        } else {
            println!("{}", render_import_table(&jobs));
        }
        print_page_note(jobs.len(), meta);
    }

    if list_exports {
        if list_imports {
            println!();
        }
        let (jobs, meta) = client
            .list_export_jobs(status, Some(limit), Some(offset))
            .await?;
        println!("{}", "Export jobs".cyan().bold());
        if jobs.is_empty() {
            println!("  (none)");
        } else {
            println!("{}", render_export_table(&jobs));
        }
        print_page_note(jobs.len(), meta);
    }

    Ok(())
}

/// Decide which listings to fetch.
///
/// A status filter narrows the kinds: `ready` only ever matches import jobs,
/// so `--kind all --status ready` lists imports alone. A status that matches
/// neither kind is an input error.
fn sides_to_list(kind: &str, status: Option<&str>) -> Result<(bool, bool)> {
    let imports = kind == "imports" || kind == "all";
    let exports = kind == "exports" || kind == "all";

    let Some(raw) = status else {
        return Ok((imports, exports));
    };

    let matches_imports = raw.parse::<ImportStatus>().is_ok();
    let matches_exports = raw.parse::<ExportStatus>().is_ok();
    let list_imports = imports && matches_imports;
    let list_exports = exports && matches_exports;
    if !list_imports && !list_exports {
        return Err(CliError::InvalidStatusFilter(raw.to_string()));
    }
    Ok((list_imports, list_exports))
}

fn render_import_table(jobs: &[ImportJob]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec!["ID", "Resource", "Status", "Rows", "OK", "Failed", "Created"]);

    for job in jobs {
        table.add_row(vec![
            job.id.to_string(),
            job.resource_type.to_string(),
            job.status.to_string(),
            job.total_rows.to_string(),
            job.successful_rows.to_string(),
            job.failed_rows.to_string(),
            job.created_at.format("%Y-%m-%d %H:%M").to_string(),
        ]);
    }
    table
}

fn render_export_table(jobs: &[ExportJob]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec!["ID", "Resource", "Format", "Status", "Records", "Created"]);

    for job in jobs {
        let records = job
            .total_records
            .map(|n| n.to_string())
            .unwrap_or_else(|| "-".to_string());
        table.add_row(vec![
            job.id.to_string(),
            job.resource_type.to_string(),
            job.file_format.to_string(),
            job.status.to_string(),
            records,
            job.created_at.format("%Y-%m-%d %H:%M").to_string(),
        ]);
    }
    table
}

fn print_page_note(shown: usize, meta: Option<PaginationMeta>) {
    if let Some(meta) = meta {
        if meta.has_more || meta.offset > 0 {
            println!(
                "  showing {} of {} (use --limit/--offset to page)",
                shown, meta.total
            );
        }
    }
}
