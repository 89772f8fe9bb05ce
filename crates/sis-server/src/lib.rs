//! SIS Bulk Data Server Library
#![recursion_limit = "256"]
//!
//! HTTP service for bulk imports and exports of student information data.
//!
//! # Overview
//!
//! The server turns uploaded tabular files (CSV, JSON, XLSX) into committed
//! entity writes, and turns extract requests into downloadable artifacts
//! (CSV, XLSX, PDF). Both pipelines run as background jobs the caller polls:
//!
//! - **Imports**: upload -> parse -> validate -> preview -> commit, with a
//!   state machine that refuses to write through validation errors unless
//!   the operator explicitly skips them.
//! - **Exports**: create -> process -> download, with cooperative
//!   cancellation between row batches.
//!
//! # Architecture
//!
//! The feature layer follows a **CQRS (Command Query Responsibility
//! Segregation)** layout:
//!
//! - **Commands** (Write Operations): upload, commit, cancel, create export
//! - **Queries** (Read Operations): job snapshots, listings, previews,
//!   artifact download
//!
//! Job records live in in-process stores behind a single-writer/multi-reader
//! discipline: only pipeline workers mutate a job, and pollers always read a
//! fully-applied snapshot.
//!
//! ## Framework Stack
//!
//! - **Axum**: Modern, ergonomic web framework
//! - **Tokio**: Async runtime driving the pipeline workers
//! - **Tower**: Middleware and service abstractions
//!
//! # Example
//!
//! ```no_run
//! use sis_server::{api, config::Config, state::AppState};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     let state = AppState::in_memory(config);
//!     let app = api::create_router(state);
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:8000").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod cqrs;
pub mod features;
pub mod middleware;
pub mod pipeline;
pub mod state;
pub mod store;

// Re-export commonly used types
pub use config::Config;
pub use state::AppState;
