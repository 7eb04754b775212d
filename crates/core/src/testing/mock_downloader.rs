//! Mock downloader for testing.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::catalog::CatalogEntry;
use crate::download::{DownloadContainer, DownloadError, DownloadedContent, Downloader};

/// Mock implementation of the [`Downloader`] trait.
///
/// Controllable behavior for testing:
/// - Per-hash transfer failures and remote-404s
/// - An optional per-download delay, to hold worker slots open
/// - A high-water mark of concurrently active downloads
///
/// Successful downloads write a small payload into the container so that
/// targets can actually copy the file.
pub struct MockDownloader {
    delay: Option<Duration>,
    failing: Arc<RwLock<HashSet<String>>>,
    missing: Arc<RwLock<HashSet<String>>>,
    downloads: Arc<RwLock<Vec<String>>>,
    active: Arc<AtomicUsize>,
    max_active: Arc<AtomicUsize>,
}

impl Default for MockDownloader {
    fn default() -> Self {
        Self::new()
    }
}

impl MockDownloader {
    /// Create a mock downloader where every download succeeds instantly.
    pub fn new() -> Self {
        Self {
            delay: None,
            failing: Arc::new(RwLock::new(HashSet::new())),
            missing: Arc::new(RwLock::new(HashSet::new())),
            downloads: Arc::new(RwLock::new(Vec::new())),
            active: Arc::new(AtomicUsize::new(0)),
            max_active: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Delay each download, keeping its worker slot occupied.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Make downloads of `hash` fail with a transfer error.
    pub async fn set_failing(&self, hash: &str) {
        self.failing.write().await.insert(hash.to_string());
    }

    /// Make downloads of `hash` report the content as gone remotely.
    pub async fn set_missing(&self, hash: &str) {
        self.missing.write().await.insert(hash.to_string());
    }

    /// Hashes downloaded so far, in completion order.
    pub async fn downloaded(&self) -> Vec<String> {
        self.downloads.read().await.clone()
    }

    /// Highest number of downloads that were ever in flight at once.
    pub fn max_active(&self) -> usize {
        self.max_active.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Downloader for MockDownloader {
    async fn download(
        &self,
        entry: &CatalogEntry,
        container: &DownloadContainer,
    ) -> Result<DownloadedContent, DownloadError> {
        let active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_active.fetch_max(active, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.active.fetch_sub(1, Ordering::SeqCst);

        if self.missing.read().await.contains(&entry.hash) {
            return Err(DownloadError::NotFound(entry.key_or_hash().to_string()));
        }
        if self.failing.read().await.contains(&entry.hash) {
            return Err(DownloadError::TransferFailed {
                key: entry.key_or_hash().to_string(),
                reason: "mock transfer failure".to_string(),
            });
        }

        tokio::fs::write(&container.path, entry.hash.as_bytes())
            .await
            .map_err(|e| DownloadError::Container {
                path: container.path.clone(),
                source: e,
            })?;
        self.downloads.write().await.push(entry.hash.clone());

        let file_name = container
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| format!("{}.zip", entry.key_or_hash()));
        Ok(DownloadedContent {
            hash: entry.hash.clone(),
            path: container.path.clone(),
            file_name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_download_writes_payload() {
        let dir = TempDir::new().unwrap();
        let downloader = MockDownloader::new();
        let container = DownloadContainer {
            path: dir.path().join("a.zip"),
        };
        let content = downloader
            .download(&fixtures::entry("a", "HASH-A"), &container)
            .await
            .unwrap();
        assert_eq!(content.file_name, "a.zip");
        assert!(container.path.is_file());
        assert_eq!(downloader.downloaded().await, vec!["HASH-A"]);
    }

    #[tokio::test]
    async fn test_missing_hash_reports_not_found() {
        let dir = TempDir::new().unwrap();
        let downloader = MockDownloader::new();
        downloader.set_missing("HASH-A").await;
        let container = DownloadContainer {
            path: dir.path().join("a.zip"),
        };
        let err = downloader
            .download(&fixtures::entry("a", "HASH-A"), &container)
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
