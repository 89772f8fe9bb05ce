//! Build automation tasks for SIS
//!
//! This tool provides various automation tasks for the SIS project, including:
//! - Generating CLI documentation from source code
//! - Future build-related tasks

use clap::Parser;
use std::fs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "Build automation tasks for SIS", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Generate CLI documentation in markdown format
    GenerateCliDocs {
        /// Output directory for generated documentation
        #[arg(short, long, default_value = "docs")]
        output_dir: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::GenerateCliDocs { output_dir } => generate_cli_docs(&output_dir)?,
    }

    Ok(())
}

fn generate_cli_docs(output_dir: &str) -> anyhow::Result<()> {
    println!("Generating CLI documentation...");

    // Generate markdown from clap definitions
    let markdown = clap_markdown::help_markdown::<sis_cli::Cli>();

    let content = format!(
        r#"# SIS CLI Reference

This documentation is auto-generated from the CLI source code. Last updated: {}.

## Overview

The SIS CLI drives the student information system's bulk import/export
service: upload CSV or JSON files, review validation previews, commit
imports, and create and download exports.

## Installation

```bash
cargo install --path crates/sis-cli
```

## Quick Start

```bash
# Import students from a CSV file (upload, preview, commit, wait)
sis import students students.csv

# Review without committing
sis import students students.csv --dry-run

# Export computer science students as CSV and download the artifact
sis export create students csv --filter major=CS --output cs-students.csv

# Inspect a job by id
sis status 5f3a1c2e-8b4d-4e6f-9a0b-1c2d3e4f5a6b

# List recent jobs
sis jobs
```

## Commands

{}

## Environment Variables

- `SIS_SERVER_URL` - Backend server URL (default: `http://localhost:8000`)
- `SIS_API_TIMEOUT_SECS` - HTTP request timeout in seconds (default: `300`)
- `LOG_LEVEL` - Logging level (e.g., `debug`, `info`, `warn`, `error`)

---

*This documentation is automatically generated from the CLI source code. To update, run `cargo xtask generate-cli-docs`.*
"#,
        chrono::Utc::now().format("%Y-%m-%d"),
        markdown
    );

    // Create output directory if it doesn't exist
    let output_path = PathBuf::from(output_dir);
    fs::create_dir_all(&output_path)?;

    let file_path = output_path.join("cli-reference.md");
    fs::write(&file_path, content)?;

    println!("✅ Generated CLI documentation at: {}", file_path.display());
    println!();
    println!("Next steps:");
    println!("  1. Review the generated documentation");
    println!("  2. Commit it to version control");

    Ok(())
}
