//! Error types for the download module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors reported by downloaders and container providers.
#[derive(Debug, Error)]
pub enum DownloadError {
    /// The remote source reports the content no longer exists.
    ///
    /// Distinguished from other failures: jobs ending here are recorded in
    /// history but never added to playlists.
    #[error("Content not found remotely: {0}")]
    NotFound(String),

    /// Failed to allocate or write the download container.
    #[error("Container error at {path}")]
    Container {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The transfer itself failed.
    #[error("Download failed for {key}: {reason}")]
    TransferFailed { key: String, reason: String },
}

impl DownloadError {
    /// True when the remote source reported the content as gone.
    pub fn is_not_found(&self) -> bool {
        matches!(self, DownloadError::NotFound(_))
    }
}
