//! Persistent hash -> history entry store.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tokio::sync::RwLock;
use tracing::debug;

use super::error::HistoryError;
use super::types::HistoryEntry;

/// Persistent mapping from content hash to outcome record.
///
/// Writers are serialized by the interior lock; a hash is recorded at most
/// once per store (first writer wins), which keeps "one history write per
/// job per target" intact even when the same entry shows up in several
/// feeds during one run.
pub struct HistoryStore {
    path: PathBuf,
    entries: RwLock<HashMap<String, HistoryEntry>>,
}

impl HistoryStore {
    /// Creates a store persisting to `path`. Call [`initialize`] before use.
    ///
    /// [`initialize`]: HistoryStore::initialize
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// File this store persists to.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads existing history from disk, if any.
    pub async fn initialize(&self) -> Result<(), HistoryError> {
        if !self.path.exists() {
            return Ok(());
        }
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| HistoryError::ReadFailed {
                path: self.path.clone(),
                source: e,
            })?;
        let loaded: HashMap<String, HistoryEntry> =
            serde_json::from_str(&raw).map_err(|e| HistoryError::Malformed {
                path: self.path.clone(),
                reason: e.to_string(),
            })?;
        let mut entries = self.entries.write().await;
        *entries = loaded;
        debug!("Loaded {} history entries from {:?}", entries.len(), self.path);
        Ok(())
    }

    /// Records `entry` for `hash` unless the hash is already recorded.
    ///
    /// Returns true when the entry was inserted.
    pub async fn try_add(&self, hash: &str, entry: HistoryEntry) -> bool {
        let mut entries = self.entries.write().await;
        match entries.entry(hash.to_string()) {
            std::collections::hash_map::Entry::Occupied(_) => false,
            std::collections::hash_map::Entry::Vacant(slot) => {
                slot.insert(entry);
                true
            }
        }
    }

    /// Returns the recorded entry for `hash`, if any.
    pub async fn get(&self, hash: &str) -> Option<HistoryEntry> {
        self.entries.read().await.get(hash).cloned()
    }

    /// Number of recorded hashes.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// True when nothing has been recorded.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Persists the store to its file.
    pub async fn write_to_file(&self) -> Result<(), HistoryError> {
        let entries = self.entries.read().await;
        let raw = serde_json::to_string_pretty(&*entries).map_err(|e| HistoryError::Malformed {
            path: self.path.clone(),
            reason: e.to_string(),
        })?;
        drop(entries);
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| HistoryError::WriteFailed {
                    path: self.path.clone(),
                    source: e,
                })?;
        }
        tokio::fs::write(&self.path, raw)
            .await
            .map_err(|e| HistoryError::WriteFailed {
                path: self.path.clone(),
                source: e,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::HistoryFlag;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_try_add_is_first_writer_wins() {
        let dir = TempDir::new().unwrap();
        let store = HistoryStore::new(dir.path().join("history.json"));

        let first = HistoryEntry::new(HistoryFlag::Downloaded, "first");
        let second = HistoryEntry::new(HistoryFlag::Error, "second");

        assert!(store.try_add("aaaa", first.clone()).await);
        assert!(!store.try_add("aaaa", second).await);
        assert_eq!(store.get("aaaa").await.unwrap().description, "first");
    }

    #[tokio::test]
    async fn test_roundtrip_through_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("history.json");

        let store = HistoryStore::new(&path);
        store
            .try_add("aaaa", HistoryEntry::new(HistoryFlag::NotFound, "gone"))
            .await;
        store.write_to_file().await.unwrap();

        let reloaded = HistoryStore::new(&path);
        reloaded.initialize().await.unwrap();
        assert_eq!(reloaded.len().await, 1);
        assert_eq!(
            reloaded.get("aaaa").await.unwrap().flag,
            HistoryFlag::NotFound
        );
    }

    #[tokio::test]
    async fn test_initialize_without_file_is_ok() {
        let dir = TempDir::new().unwrap();
        let store = HistoryStore::new(dir.path().join("missing.json"));
        store.initialize().await.unwrap();
        assert!(store.is_empty().await);
    }
}
