//! Configuration management

use serde::{Deserialize, Serialize};

// ============================================================================
// Server Configuration Constants
// ============================================================================

/// Default server host binding.
pub const DEFAULT_SERVER_HOST: &str = "127.0.0.1";

/// Default server port.
pub const DEFAULT_SERVER_PORT: u16 = 8000;

/// Default shutdown timeout in seconds.
pub const DEFAULT_SHUTDOWN_TIMEOUT_SECS: u64 = 30;

/// Default maximum upload size in bytes (10 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// Default maximum number of row previews returned per preview request.
pub const DEFAULT_PREVIEW_DISPLAY_CAP: usize = 100;

/// Default number of rows written between progress counter flushes.
pub const DEFAULT_COMMIT_BATCH_SIZE: usize = 100;

/// Default number of records per export batch between cancellation checks.
pub const DEFAULT_EXPORT_BATCH_SIZE: usize = 500;

/// Default directory for generated export artifacts.
pub const DEFAULT_ARTIFACT_DIR: &str = "./artifacts";

/// Default CORS allowed origin for local development.
pub const DEFAULT_CORS_ALLOWED_ORIGIN: &str = "http://localhost:3000";

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub pipeline: PipelineConfig,
    pub cors: CorsConfig,
}

/// Server-specific configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub shutdown_timeout_secs: u64,
}

/// Import/export pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub max_upload_bytes: u64,
    pub preview_display_cap: usize,
    pub commit_batch_size: usize,
    pub export_batch_size: usize,
    pub artifact_dir: String,
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub allow_credentials: bool,
}

impl Config {
    /// Load configuration from environment and defaults
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Config {
            server: ServerConfig {
                host: std::env::var("SIS_HOST").unwrap_or_else(|_| DEFAULT_SERVER_HOST.to_string()),
                port: std::env::var("SIS_PORT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_SERVER_PORT),
                shutdown_timeout_secs: std::env::var("SIS_SHUTDOWN_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_SHUTDOWN_TIMEOUT_SECS),
            },
            pipeline: PipelineConfig {
                max_upload_bytes: std::env::var("SIS_MAX_UPLOAD_BYTES")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
                preview_display_cap: std::env::var("SIS_PREVIEW_DISPLAY_CAP")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_PREVIEW_DISPLAY_CAP),
                commit_batch_size: std::env::var("SIS_COMMIT_BATCH_SIZE")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_COMMIT_BATCH_SIZE),
                export_batch_size: std::env::var("SIS_EXPORT_BATCH_SIZE")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_EXPORT_BATCH_SIZE),
                artifact_dir: std::env::var("SIS_ARTIFACT_DIR")
                    .unwrap_or_else(|_| DEFAULT_ARTIFACT_DIR.to_string()),
            },
            cors: CorsConfig {
                allowed_origins: std::env::var("CORS_ALLOWED_ORIGINS")
                    .unwrap_or_else(|_| DEFAULT_CORS_ALLOWED_ORIGIN.to_string())
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .collect(),
                allow_credentials: std::env::var("CORS_ALLOW_CREDENTIALS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(true),
            },
        };

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        // Validate port
        if self.server.port == 0 {
            anyhow::bail!("Server port must be greater than 0");
        }

        // Validate pipeline limits
        if self.pipeline.max_upload_bytes == 0 {
            anyhow::bail!("Maximum upload size must be greater than 0");
        }

        if self.pipeline.preview_display_cap == 0 {
            anyhow::bail!("Preview display cap must be greater than 0");
        }

        if self.pipeline.commit_batch_size == 0 {
            anyhow::bail!("Commit batch size must be greater than 0");
        }

        if self.pipeline.export_batch_size == 0 {
            anyhow::bail!("Export batch size must be greater than 0");
        }

        if self.pipeline.artifact_dir.is_empty() {
            anyhow::bail!("Artifact directory cannot be empty");
        }

        // Validate CORS origins
        if self.cors.allowed_origins.is_empty() {
            tracing::warn!("No CORS origins configured - all origins will be allowed");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: DEFAULT_SERVER_HOST.to_string(),
                port: DEFAULT_SERVER_PORT,
                shutdown_timeout_secs: DEFAULT_SHUTDOWN_TIMEOUT_SECS,
            },
            pipeline: PipelineConfig {
                max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
                preview_display_cap: DEFAULT_PREVIEW_DISPLAY_CAP,
                commit_batch_size: DEFAULT_COMMIT_BATCH_SIZE,
                export_batch_size: DEFAULT_EXPORT_BATCH_SIZE,
                artifact_dir: DEFAULT_ARTIFACT_DIR.to_string(),
            },
            cors: CorsConfig {
                allowed_origins: vec![DEFAULT_CORS_ALLOWED_ORIGIN.to_string()],
                allow_credentials: true,
            },
        }
    }
}
