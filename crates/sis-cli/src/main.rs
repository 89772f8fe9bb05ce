//! SIS CLI - Main entry point

use clap::Parser;
use sis_cli::{Cli, Commands};
use sis_common::logging::{init_logging, LogConfig, LogLevel, LogOutput};
use std::process;
use tracing::error;

#[tokio::main]
async fn main() {
    // Parse command-line arguments
    let cli = Cli::parse();

    // Handle markdown help generation
    if cli.markdown_help {
        println!("{}", clap_markdown::help_markdown::<Cli>());
        return;
    }

    // Ensure a command is provided
    if cli.command.is_none() {
        eprintln!("Error: A subcommand is required");
        eprintln!();
        eprintln!("For more information, try '--help'.");
        process::exit(2);
    }

    // Initialize logging based on verbose flag and environment
    let log_config = if cli.verbose {
        // Verbose mode: log to console with debug level
        LogConfig::builder()
            .level(LogLevel::Debug)
            .output(LogOutput::Console)
            .file_prefix("sis-cli")
            .build()
    } else {
        // Normal mode: only warnings and errors on the console
        LogConfig::builder()
            .level(LogLevel::Warn)
            .output(LogOutput::Console)
            .file_prefix("sis-cli")
            .build()
    };

    // Merge with environment variables (they take precedence)
    let log_config = LogConfig::from_env().unwrap_or(log_config);

    // Initialize logging (ignore errors as CLI should work without logging)
    let _ = init_logging(&log_config);

    // Execute command
    let result = execute_command(&cli).await;

    // Handle result
    if let Err(e) = result {
        error!(error = %e, "Command failed");
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Execute the CLI command
async fn execute_command(cli: &Cli) -> sis_cli::Result<()> {
    // Command is guaranteed to exist at this point (checked in main)
    let Some(ref command) = cli.command else {
        unreachable!("Command should have been validated in main");
    };

    match command {
        Commands::Import(args) => {
            sis_cli::commands::import::run(&cli.server_url, args).await
        }

        Commands::Export { command } => {
            sis_cli::commands::export::run(&cli.server_url, command).await
        }

        Commands::Status { job_id } => {
            sis_cli::commands::status::run(&cli.server_url, job_id).await
        }

        Commands::Jobs {
            kind,
            status,
            limit,
            offset,
        } => {
            sis_cli::commands::jobs::run(
                &cli.server_url,
                kind,
                status.as_deref(),
                *limit,
                *offset,
            )
            .await
        }
    }
}
