//! Directory-backed storage target.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::sync::RwLock;
use tracing::debug;

use crate::download::DownloadedContent;
use crate::history::HistoryStore;
use crate::playlist::PlaylistManager;

use super::error::TargetError;
use super::traits::StorageTarget;

/// A target backed by a content directory.
///
/// Ownership is decided by a hash index supplied at construction time by an
/// external hasher (content hashing is outside this crate); materialized
/// hashes are appended to the index so a later job in the same run sees the
/// content as owned.
pub struct DirectoryTarget {
    name: String,
    content_dir: PathBuf,
    overwrite: bool,
    index: RwLock<HashSet<String>>,
    history: Option<HistoryStore>,
    playlists: Option<PlaylistManager>,
}

impl DirectoryTarget {
    /// Creates a target over `content_dir` with the given owned-hash index.
    pub fn new(
        name: impl Into<String>,
        content_dir: impl Into<PathBuf>,
        owned_hashes: impl IntoIterator<Item = String>,
    ) -> Self {
        Self {
            name: name.into(),
            content_dir: content_dir.into(),
            overwrite: false,
            index: RwLock::new(owned_hashes.into_iter().collect()),
            history: None,
            playlists: None,
        }
    }

    /// Allows replacing content that already exists on disk.
    pub fn with_overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Attaches a history store to this target.
    pub fn with_history(mut self, history: HistoryStore) -> Self {
        self.history = Some(history);
        self
    }

    /// Attaches a playlist manager to this target.
    pub fn with_playlists(mut self, playlists: PlaylistManager) -> Self {
        self.playlists = Some(playlists);
        self
    }

    /// Directory content is materialized into.
    pub fn content_dir(&self) -> &Path {
        &self.content_dir
    }
}

#[async_trait]
impl StorageTarget for DirectoryTarget {
    fn name(&self) -> &str {
        &self.name
    }

    async fn has_content(&self, hash: &str) -> Result<bool, TargetError> {
        Ok(self.index.read().await.contains(hash))
    }

    async fn materialize(&self, content: &DownloadedContent) -> Result<(), TargetError> {
        if !content.path.exists() {
            return Err(TargetError::SourceNotFound {
                path: content.path.clone(),
            });
        }

        fs::create_dir_all(&self.content_dir).await.map_err(|e| {
            TargetError::DirectoryCreationFailed {
                path: self.content_dir.clone(),
                source: e,
            }
        })?;

        let destination = self.content_dir.join(&content.file_name);
        if destination.exists() && !self.overwrite {
            return Err(TargetError::DestinationExists { path: destination });
        }

        fs::copy(&content.path, &destination)
            .await
            .map_err(|e| TargetError::CopyFailed {
                source: content.path.clone(),
                destination: destination.clone(),
                error: e,
            })?;

        self.index.write().await.insert(content.hash.clone());
        debug!("Materialized {} into target {}", content.hash, self.name);
        Ok(())
    }

    fn history(&self) -> Option<&HistoryStore> {
        self.history.as_ref()
    }

    fn playlists(&self) -> Option<&PlaylistManager> {
        self.playlists.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn content(dir: &Path, name: &str, hash: &str) -> DownloadedContent {
        let path = dir.join(name);
        std::fs::write(&path, b"payload").unwrap();
        DownloadedContent {
            hash: hash.to_string(),
            path,
            file_name: name.to_string(),
        }
    }

    #[tokio::test]
    async fn test_materialize_copies_and_indexes() {
        let dir = TempDir::new().unwrap();
        let target = DirectoryTarget::new("main", dir.path().join("songs"), Vec::new());

        let content = content(dir.path(), "ab12.zip", "HASH1");
        assert!(!target.has_content("HASH1").await.unwrap());
        target.materialize(&content).await.unwrap();

        assert!(dir.path().join("songs").join("ab12.zip").exists());
        assert!(target.has_content("HASH1").await.unwrap());
    }

    #[tokio::test]
    async fn test_materialize_respects_overwrite_flag() {
        let dir = TempDir::new().unwrap();
        let target = DirectoryTarget::new("main", dir.path().join("songs"), Vec::new());

        let content = content(dir.path(), "ab12.zip", "HASH1");
        target.materialize(&content).await.unwrap();
        let err = target.materialize(&content).await.unwrap_err();
        assert!(matches!(err, TargetError::DestinationExists { .. }));

        let target = DirectoryTarget::new("main", dir.path().join("songs"), Vec::new())
            .with_overwrite(true);
        target.materialize(&content).await.unwrap();
    }

    #[tokio::test]
    async fn test_missing_source_is_an_error() {
        let dir = TempDir::new().unwrap();
        let target = DirectoryTarget::new("main", dir.path().join("songs"), Vec::new());
        let content = DownloadedContent {
            hash: "HASH1".to_string(),
            path: dir.path().join("missing.zip"),
            file_name: "missing.zip".to_string(),
        };
        let err = target.materialize(&content).await.unwrap_err();
        assert!(matches!(err, TargetError::SourceNotFound { .. }));
    }

    #[tokio::test]
    async fn test_preloaded_index() {
        let dir = TempDir::new().unwrap();
        let target = DirectoryTarget::new(
            "main",
            dir.path().join("songs"),
            vec!["OWNED".to_string()],
        );
        assert!(target.has_content("OWNED").await.unwrap());
        assert!(!target.has_content("OTHER").await.unwrap());
    }
}
