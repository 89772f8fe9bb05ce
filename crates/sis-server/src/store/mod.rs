//! In-memory storage for jobs, retained uploads, entity records, and
//! generated export artifacts.
//!
//! Job state lives in process memory for the lifetime of the server. Export
//! artifacts are the only state that touches disk.

pub mod artifacts;
pub mod entities;
pub mod jobs;
pub mod uploads;

pub use artifacts::ArtifactStore;
pub use entities::{EntityStore, EntityStoreError, MemoryEntityStore, Record};
pub use jobs::{ExportJobStore, ImportJobStore};
pub use uploads::UploadStore;
