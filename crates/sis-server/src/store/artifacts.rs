//! Export artifact storage on the local filesystem.
//!
//! Artifacts are written to a temporary path and renamed into place, so a
//! download can never observe a half-written file.

use std::path::{Path, PathBuf};

use uuid::Uuid;

pub struct ArtifactStore {
    root: PathBuf,
}

impl ArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Final on-disk location for a job's artifact.
    pub fn path_for(&self, job_id: Uuid, extension: &str) -> PathBuf {
        self.root.join(format!("{job_id}.{extension}"))
    }

    /// Write an artifact atomically and return its final path.
    pub async fn write_atomic(
        &self,
        job_id: Uuid,
        extension: &str,
        bytes: &[u8],
    ) -> std::io::Result<PathBuf> {
        tokio::fs::create_dir_all(&self.root).await?;

        let final_path = self.path_for(job_id, extension);
        let tmp_path = self.root.join(format!("{job_id}.{extension}.tmp"));

        tokio::fs::write(&tmp_path, bytes).await?;
        tokio::fs::rename(&tmp_path, &final_path).await?;

        Ok(final_path)
    }

    pub async fn read(&self, path: &Path) -> std::io::Result<Vec<u8>> {
        tokio::fs::read(path).await
    }
}
