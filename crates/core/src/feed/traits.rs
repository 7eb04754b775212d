//! Trait definitions for the feed module.

use async_trait::async_trait;

use super::error::FeedError;
use super::types::{FeedResult, FeedSettings};

/// A client for one remote feed source.
///
/// One instance per source; drivers iterate the source's sub-feeds
/// sequentially, calling `fetch` once per sub-feed (or once per author for
/// author-filtered feeds).
#[async_trait]
pub trait FeedClient: Send + Sync {
    /// Name of the source this client reads from.
    fn source(&self) -> &str;

    /// Fetches one sub-feed.
    async fn fetch(&self, settings: &FeedSettings) -> Result<FeedResult, FeedError>;
}
