//! Mock storage target for testing.

use async_trait::async_trait;
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::download::DownloadedContent;
use crate::history::HistoryStore;
use crate::playlist::PlaylistManager;
use crate::target::{StorageTarget, TargetError};

/// Mock implementation of the [`StorageTarget`] trait.
///
/// Tracks materialized hashes in memory, can be seeded with pre-owned
/// hashes, and can be told to fail materialization. History and playlist
/// capabilities are attached per test.
pub struct MockTarget {
    name: String,
    owned: Arc<RwLock<HashSet<String>>>,
    materialized: Arc<RwLock<Vec<String>>>,
    fail_materialize: Arc<RwLock<bool>>,
    history: Option<HistoryStore>,
    playlists: Option<PlaylistManager>,
}

impl MockTarget {
    /// Create a mock target that wants everything and never fails.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            owned: Arc::new(RwLock::new(HashSet::new())),
            materialized: Arc::new(RwLock::new(Vec::new())),
            fail_materialize: Arc::new(RwLock::new(false)),
            history: None,
            playlists: None,
        }
    }

    /// Seed hashes the target already owns.
    pub fn with_owned(self, hashes: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let owned = hashes.into_iter().map(Into::into).collect();
        Self {
            owned: Arc::new(RwLock::new(owned)),
            ..self
        }
    }

    /// Attach a history store backed by the given file.
    pub fn with_history(self, path: impl Into<PathBuf>) -> Self {
        Self {
            history: Some(HistoryStore::new(path)),
            ..self
        }
    }

    /// Attach a playlist manager rooted at the given directory.
    pub fn with_playlists(self, directory: impl Into<PathBuf>) -> Self {
        Self {
            playlists: Some(PlaylistManager::new(directory)),
            ..self
        }
    }

    /// Make subsequent materializations fail.
    pub async fn set_fail_materialize(&self, fail: bool) {
        *self.fail_materialize.write().await = fail;
    }

    /// Hashes materialized so far, in call order.
    pub async fn materialized(&self) -> Vec<String> {
        self.materialized.read().await.clone()
    }
}

#[async_trait]
impl StorageTarget for MockTarget {
    fn name(&self) -> &str {
        &self.name
    }

    async fn has_content(&self, hash: &str) -> Result<bool, TargetError> {
        Ok(self.owned.read().await.contains(hash))
    }

    async fn materialize(&self, content: &DownloadedContent) -> Result<(), TargetError> {
        if *self.fail_materialize.read().await {
            return Err(TargetError::CopyFailed {
                source: content.path.clone(),
                destination: PathBuf::from(&self.name).join(&content.file_name),
                error: std::io::Error::other("mock materialization failure"),
            });
        }
        self.owned.write().await.insert(content.hash.clone());
        self.materialized.write().await.push(content.hash.clone());
        Ok(())
    }

    fn history(&self) -> Option<&HistoryStore> {
        self.history.as_ref()
    }

    fn playlists(&self) -> Option<&PlaylistManager> {
        self.playlists.as_ref()
    }
}
