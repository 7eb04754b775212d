//! Error types for the target module.

use std::path::PathBuf;
use thiserror::Error;

/// Errors reported by storage targets.
#[derive(Debug, Error)]
pub enum TargetError {
    /// The hash lookup could not be performed.
    #[error("Content lookup failed on target {target}: {reason}")]
    LookupFailed { target: String, reason: String },

    /// Failed to create the target's content directory.
    #[error("Failed to create directory: {path}")]
    DirectoryCreationFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The downloaded payload was not found on disk.
    #[error("Downloaded content not found: {path}")]
    SourceNotFound { path: PathBuf },

    /// The destination exists and overwrite is disabled.
    #[error("Destination already exists: {path}")]
    DestinationExists { path: PathBuf },

    /// Failed to copy content into the target.
    #[error("Failed to copy {source} to {destination}")]
    CopyFailed {
        source: PathBuf,
        destination: PathBuf,
        #[source]
        error: std::io::Error,
    },
}
