//! Shared application state.

use std::sync::Arc;

use crate::config::Config;
use crate::store::{
    ArtifactStore, EntityStore, ExportJobStore, ImportJobStore, MemoryEntityStore, UploadStore,
};

/// Everything a handler or worker needs. Cheap to clone; all fields are
/// shared behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub import_jobs: Arc<ImportJobStore>,
    pub export_jobs: Arc<ExportJobStore>,
    pub uploads: Arc<UploadStore>,
    pub artifacts: Arc<ArtifactStore>,
    pub entities: Arc<dyn EntityStore>,
}

impl AppState {
    pub fn new(config: Config, entities: Arc<dyn EntityStore>) -> Self {
        let artifacts = ArtifactStore::new(&config.pipeline.artifact_dir);
        Self {
            config: Arc::new(config),
            import_jobs: Arc::new(ImportJobStore::new()),
            export_jobs: Arc::new(ExportJobStore::new()),
            uploads: Arc::new(UploadStore::new()),
            artifacts: Arc::new(artifacts),
            entities,
        }
    }

    /// State backed entirely by process memory.
    pub fn in_memory(config: Config) -> Self {
        Self::new(config, Arc::new(MemoryEntityStore::new()))
    }
}
