//! Durable score history

use std::future::Future;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::error::StoreError;
use crate::types::ScoreEntry;

/// Loads and saves the score history list (newest first).
pub trait HistoryStore: Send + Sync + 'static {
    /// Absent or unreadable data yields an empty list.
    fn load(&self) -> impl Future<Output = Vec<ScoreEntry>> + Send;

    fn save(&self, entries: &[ScoreEntry]) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// `<data_dir>/phrase-master/history.json`
pub fn default_history_path() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join("phrase-master").join("history.json"))
}

/// JSON array of entries in a single file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at [`default_history_path`].
    pub fn at_default_path() -> Result<Self, StoreError> {
        default_history_path()
            .map(Self::new)
            .ok_or(StoreError::NoDataDir)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HistoryStore for JsonFileStore {
    async fn load(&self) -> Vec<ScoreEntry> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no history file yet");
                return Vec::new();
            }
            Err(err) => {
                tracing::warn!("Failed to read history at {:?}: {}", self.path, err);
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<ScoreEntry>>(&content) {
            Ok(entries) => entries,
            Err(err) => {
                tracing::warn!("Failed to parse history at {:?}: {}", self.path, err);
                Vec::new()
            }
        }
    }

    async fn save(&self, entries: &[ScoreEntry]) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(entries)?;
        let write_err = |source| StoreError::Write {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
        }

        // Write then rename so a crash never leaves a truncated file behind.
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &json).await.map_err(write_err)?;
        if let Err(err) = tokio::fs::rename(&tmp, &self.path).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(write_err(err));
        }

        tracing::debug!(path = %self.path.display(), entries = entries.len(), "history saved");
        Ok(())
    }
}

/// In-process store; clones share the same list.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<Vec<ScoreEntry>>>,
    saves: Arc<Mutex<usize>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries(entries: Vec<ScoreEntry>) -> Self {
        Self {
            entries: Arc::new(Mutex::new(entries)),
            saves: Arc::default(),
        }
    }

    pub async fn entries(&self) -> Vec<ScoreEntry> {
        self.entries.lock().await.clone()
    }

    /// Number of completed saves.
    pub async fn save_count(&self) -> usize {
        *self.saves.lock().await
    }
}

impl HistoryStore for MemoryStore {
    async fn load(&self) -> Vec<ScoreEntry> {
        self.entries.lock().await.clone()
    }

    async fn save(&self, entries: &[ScoreEntry]) -> Result<(), StoreError> {
        *self.entries.lock().await = entries.to_vec();
        *self.saves.lock().await += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Difficulty;

    fn entry(id: &str) -> ScoreEntry {
        ScoreEntry {
            id: id.to_string(),
            concept: "Osmose".to_string(),
            difficulty: Difficulty::Hard,
            time_taken: 33,
            date: chrono::DateTime::from_timestamp_millis(1_700_000_000_000).unwrap(),
        }
    }

    #[tokio::test]
    async fn test_memory_store_roundtrip() {
        let store = MemoryStore::new();
        assert!(store.load().await.is_empty());
        store.save(&[entry("a"), entry("b")]).await.unwrap();

        let other = store.clone();
        assert_eq!(other.load().await.len(), 2);
        assert_eq!(other.save_count().await, 1);
    }

    #[test]
    fn test_default_path_layout() {
        if let Some(path) = default_history_path() {
            assert!(path.ends_with("phrase-master/history.json"));
        }
    }
}
