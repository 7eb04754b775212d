//! Error types for the feed module.

use std::fmt;

/// Errors a feed client can report.
///
/// All of these are non-fatal to a sync run: the driver diagnoses the
/// failure and moves on to the next sub-feed.
///
/// `Display` and `Error` are implemented by hand because the `source`
/// fields name the feed source, not an underlying error cause, which
/// `thiserror`'s derive cannot express for a field with that name.
#[derive(Debug)]
pub enum FeedError {
    /// The remote service could not be reached or answered with an error.
    FetchFailed {
        source: String,
        feed: String,
        reason: String,
    },

    /// The feed requires credentials that were not configured.
    AuthenticationRequired { source: String, feed: String },

    /// The client does not know the requested sub-feed.
    UnknownFeed { source: String, feed: String },
}

impl fmt::Display for FeedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedError::FetchFailed {
                source,
                feed,
                reason,
            } => {
                write!(f, "Feed fetch failed for {source}/{feed}: {reason}")
            }
            FeedError::AuthenticationRequired { source, feed } => {
                write!(f, "Feed {source}/{feed} requires authentication")
            }
            FeedError::UnknownFeed { source, feed } => {
                write!(f, "Unknown feed {feed} for source {source}")
            }
        }
    }
}

impl std::error::Error for FeedError {}
