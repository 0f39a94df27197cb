use crate::{IndexerError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use solr_sync_protocol::Selection;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

const CHECKPOINT_FILE_NAME: &str = "checkpoint.json";

/// Next batch to process for an interrupted run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub next_batch: u64,
    pub batch_size: usize,
    #[serde(default)]
    pub selection: Selection,
    #[serde(default)]
    pub updated_at_unix_ms: u64,
}

impl Checkpoint {
    #[must_use]
    pub fn new(next_batch: u64, batch_size: usize, selection: Selection) -> Self {
        Self {
            next_batch,
            batch_size,
            selection,
            updated_at_unix_ms: unix_now_ms(),
        }
    }

    /// Batch to resume from; batch offsets only line up for the same selection and batch size.
    #[must_use]
    pub fn resume_batch_for(&self, selection: &Selection, batch_size: usize) -> Option<u64> {
        (self.selection == *selection && self.batch_size == batch_size).then_some(self.next_batch)
    }
}

/// Persists the resume point between runs.
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    async fn load(&self) -> Result<Option<Checkpoint>>;

    async fn save(&self, checkpoint: &Checkpoint) -> Result<()>;

    async fn clear(&self) -> Result<()>;
}

/// JSON file checkpoint, written through a temporary file and renamed into place.
#[derive(Debug, Clone)]
pub struct FileCheckpointStore {
    path: PathBuf,
}

impl FileCheckpointStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `<state_dir>/checkpoint.json`.
    pub fn in_dir(state_dir: &Path) -> Self {
        Self::new(state_dir.join(CHECKPOINT_FILE_NAME))
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl CheckpointStore for FileCheckpointStore {
    async fn load(&self) -> Result<Option<Checkpoint>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let bytes = tokio::fs::read(&self.path).await?;
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    async fn save(&self, checkpoint: &Checkpoint) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let bytes = serde_json::to_vec_pretty(checkpoint)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(IndexerError::IoError(err)),
        }
    }
}

fn unix_now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[tokio::test]
    async fn save_load_clear_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = FileCheckpointStore::in_dir(&dir.path().join("state"));

        assert_eq!(store.load().await.unwrap(), None);

        let checkpoint = Checkpoint::new(4, 50, Selection::post_type("page"));
        store.save(&checkpoint).await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some(checkpoint));
        assert!(!store.path().with_extension("json.tmp").exists());

        store.clear().await.unwrap();
        assert_eq!(store.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn clear_without_file_is_ok() {
        let dir = TempDir::new().unwrap();
        let store = FileCheckpointStore::in_dir(dir.path());
        store.clear().await.unwrap();
    }

    #[tokio::test]
    async fn corrupt_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let store = FileCheckpointStore::in_dir(dir.path());
        tokio::fs::write(store.path(), b"{not json").await.unwrap();
        assert!(matches!(
            store.load().await,
            Err(IndexerError::JsonError(_))
        ));
    }

    #[test]
    fn resume_requires_same_selection_and_batch_size() {
        let checkpoint = Checkpoint::new(7, 100, Selection::post_type("post"));
        assert_eq!(
            checkpoint.resume_batch_for(&Selection::post_type("post"), 100),
            Some(7)
        );
        assert_eq!(
            checkpoint.resume_batch_for(&Selection::post_type("page"), 100),
            None
        );
        assert_eq!(
            checkpoint.resume_batch_for(&Selection::post_type("post"), 50),
            None
        );
    }
}
