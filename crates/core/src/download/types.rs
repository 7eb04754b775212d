//! Types for the download module.

use std::path::{Path, PathBuf};

use super::error::DownloadError;
use super::traits::ContainerProvider;

/// Temporary storage for one in-flight download.
#[derive(Debug, Clone)]
pub struct DownloadContainer {
    /// Path the downloader writes into.
    pub path: PathBuf,
}

/// Handle to downloaded content, ready to be materialized into targets.
#[derive(Debug, Clone)]
pub struct DownloadedContent {
    /// Content hash of the downloaded item.
    pub hash: String,
    /// Location of the downloaded payload.
    pub path: PathBuf,
    /// File name to use when materializing into a target.
    pub file_name: String,
}

/// Container provider backed by a temp directory.
///
/// Each container is `<root>/<key>.zip`; the directory is created lazily
/// on first allocation.
pub struct TempDirContainers {
    root: PathBuf,
}

impl TempDirContainers {
    /// Creates a provider rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory containers are allocated under.
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ContainerProvider for TempDirContainers {
    fn allocate(&self, key: &str) -> Result<DownloadContainer, DownloadError> {
        std::fs::create_dir_all(&self.root).map_err(|e| DownloadError::Container {
            path: self.root.clone(),
            source: e,
        })?;
        Ok(DownloadContainer {
            path: self.root.join(format!("{key}.zip")),
        })
    }
}
