//! Trait definitions for the download module.

use async_trait::async_trait;

use crate::catalog::CatalogEntry;

use super::error::DownloadError;
use super::types::{DownloadContainer, DownloadedContent};

/// Transfers one catalog entry into a prepared container.
#[async_trait]
pub trait Downloader: Send + Sync {
    /// Downloads `entry` into `container`.
    ///
    /// Returns [`DownloadError::NotFound`] when the remote source reports
    /// the content as gone; any other error is a plain transfer failure.
    async fn download(
        &self,
        entry: &CatalogEntry,
        container: &DownloadContainer,
    ) -> Result<DownloadedContent, DownloadError>;
}

/// Allocates temporary storage for in-flight downloads.
pub trait ContainerProvider: Send + Sync {
    /// Allocates a container keyed by the entry's `key_or_hash`.
    fn allocate(&self, key: &str) -> Result<DownloadContainer, DownloadError>;
}
