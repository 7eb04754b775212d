//! Error types for the history module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors from loading or persisting a history store.
#[derive(Debug, Error)]
pub enum HistoryError {
    /// Failed to read the history file.
    #[error("Failed to read history at {path}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write the history file.
    #[error("Failed to write history at {path}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The history file exists but could not be parsed.
    #[error("Malformed history file at {path}: {reason}")]
    Malformed { path: PathBuf, reason: String },
}
