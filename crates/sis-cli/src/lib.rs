//! SIS CLI Library
//!
//! Command-line interface for the SIS bulk import/export service.
//!
//! # Overview
//!
//! The SIS CLI wraps the server's job pipeline in a guided workflow:
//!
//! - **Imports**: Upload a file, review the validation preview, commit (`sis import`)
//! - **Exports**: Create, watch, cancel, and download export jobs (`sis export`)
//! - **Status Checking**: Inspect one job by id (`sis status`)
//! - **Job Listing**: Tabular listing of recent jobs (`sis jobs`)

pub mod api;
pub mod commands;
pub mod error;
pub mod poll;
pub mod progress;

// Re-export commonly used types
pub use api::ApiClient;
pub use error::{CliError, Result};

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// SIS - Student Information System bulk data tool
#[derive(Parser, Debug)]
#[command(name = "sis")]
#[command(author, version, about, long_about = None)]
#[command(arg_required_else_help = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Server URL
    #[arg(long, env = "SIS_SERVER_URL", default_value = "http://localhost:8000", global = true)]
    pub server_url: String,

    /// Print the CLI reference as markdown and exit
    #[arg(long, hide = true)]
    pub markdown_help: bool,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Import a file: upload, preview, commit, and wait for the result
    Import(ImportArgs),

    /// Manage export jobs
    Export {
        #[command(subcommand)]
        command: ExportCommand,
    },

    /// Show one job by id
    Status {
        /// Job id (import or export)
        job_id: String,
    },

    /// List recent jobs
    Jobs {
        /// Which listings to show
        #[arg(long, default_value = "all", value_parser = ["imports", "exports", "all"])]
        kind: String,

        /// Only jobs with this status
        #[arg(short, long)]
        status: Option<String>,

        /// Maximum jobs per listing
        #[arg(short, long, default_value_t = 20)]
        limit: i64,

        /// Jobs to skip per listing
        #[arg(short, long, default_value_t = 0)]
        offset: i64,
    },
}

/// Arguments for `sis import`
#[derive(Args, Debug)]
pub struct ImportArgs {
    /// Resource to import (students, courses, grades)
    pub resource_type: String,

    /// Path to the source file (csv, json or xlsx)
    pub file: PathBuf,

    /// Override format detection (csv, json, xlsx)
    #[arg(short, long)]
    pub format: Option<String>,

    /// Let rows matching existing records become updates
    #[arg(long)]
    pub allow_updates: bool,

    /// Skip repeated natural keys within the upload
    #[arg(long)]
    pub skip_duplicates: bool,

    /// Commit even when rows have validation errors (they count as failed)
    #[arg(long)]
    pub skip_errors: bool,

    /// Stop after the preview without committing
    #[arg(long)]
    pub dry_run: bool,

    /// Create the job and exit without waiting for validation
    #[arg(long)]
    pub no_wait: bool,

    /// Base interval between job polls, in milliseconds
    #[arg(long, default_value_t = 500)]
    pub poll_interval_ms: u64,
}

/// Export subcommands
#[derive(Subcommand, Debug)]
pub enum ExportCommand {
    /// Create an export job
    Create(ExportCreateArgs),

    /// Show an export job by id
    Status {
        /// Export job id
        job_id: String,
    },

    /// Cancel a running export job
    Cancel {
        /// Export job id
        job_id: String,
    },

    /// Download the artifact of a completed export job
    Download {
        /// Export job id
        job_id: String,

        /// Destination path (defaults to the server-suggested filename)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Arguments for `sis export create`
#[derive(Args, Debug)]
pub struct ExportCreateArgs {
    /// Resource to export (students, courses, grades)
    pub resource_type: String,

    /// Artifact format (csv, xlsx, pdf)
    pub file_format: String,

    /// Equality filter, repeatable
    #[arg(long = "filter", value_name = "COLUMN=VALUE")]
    pub filters: Vec<String>,

    /// Upper bound on exported records
    #[arg(long)]
    pub limit: Option<u64>,

    /// Wait for the job to finish
    #[arg(short, long)]
    pub wait: bool,

    /// Wait and download the artifact to this path
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Base interval between job polls, in milliseconds
    #[arg(long, default_value_t = 500)]
    pub poll_interval_ms: u64,
}
