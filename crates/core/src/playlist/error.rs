//! Error types for the playlist module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors from loading or persisting playlists.
#[derive(Debug, Error)]
pub enum PlaylistError {
    /// Failed to read a playlist file.
    #[error("Failed to read playlist at {path}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write a playlist file.
    #[error("Failed to write playlist at {path}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A playlist file exists but could not be parsed.
    #[error("Malformed playlist file at {path}: {reason}")]
    Malformed { path: PathBuf, reason: String },
}
