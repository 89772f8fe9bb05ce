//! Retained upload bytes.
//!
//! The raw upload is kept for the life of the import job so preview and
//! commit can re-parse it instead of trusting stale derived state. Bytes are
//! shared out as `Arc<[u8]>`; nothing copies the file after ingestion.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
pub struct UploadStore {
    files: RwLock<HashMap<Uuid, Arc<[u8]>>>,
}

impl UploadStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn put(&self, job_id: Uuid, content: Vec<u8>) {
        self.files.write().await.insert(job_id, Arc::from(content));
    }

    pub async fn get(&self, job_id: Uuid) -> Option<Arc<[u8]>> {
        self.files.read().await.get(&job_id).cloned()
    }

    /// Drop the retained bytes once a job reaches a terminal status.
    pub async fn remove(&self, job_id: Uuid) {
        self.files.write().await.remove(&job_id);
    }
}
