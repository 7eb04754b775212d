//! Mock feed client for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::catalog::CatalogEntry;
use crate::feed::{FeedClient, FeedError, FeedResult, FeedSettings};

/// Mock implementation of the [`FeedClient`] trait.
///
/// Sub-feed results are configured up front, keyed by feed name or, for
/// author-filtered fetches, by author name. Unconfigured feeds answer
/// [`FeedError::UnknownFeed`]; feeds marked failing answer
/// [`FeedError::FetchFailed`].
pub struct MockFeedClient {
    source: String,
    feeds: Arc<RwLock<HashMap<String, Vec<CatalogEntry>>>>,
    authors: Arc<RwLock<HashMap<String, Vec<CatalogEntry>>>>,
    failing: Arc<RwLock<Vec<String>>>,
    fetches: Arc<RwLock<Vec<FeedSettings>>>,
}

impl MockFeedClient {
    /// Create a mock client for the named source.
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            feeds: Arc::new(RwLock::new(HashMap::new())),
            authors: Arc::new(RwLock::new(HashMap::new())),
            failing: Arc::new(RwLock::new(Vec::new())),
            fetches: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Configure the entries a sub-feed returns.
    pub async fn set_feed(&self, feed: &str, entries: Vec<CatalogEntry>) {
        self.feeds.write().await.insert(feed.to_string(), entries);
    }

    /// Configure the entries an author-filtered fetch returns.
    pub async fn set_author(&self, author: &str, entries: Vec<CatalogEntry>) {
        self.authors
            .write()
            .await
            .insert(author.to_string(), entries);
    }

    /// Make fetches of a sub-feed fail.
    pub async fn set_failing(&self, feed: &str) {
        self.failing.write().await.push(feed.to_string());
    }

    /// All fetches made so far, in call order.
    pub async fn fetches(&self) -> Vec<FeedSettings> {
        self.fetches.read().await.clone()
    }
}

#[async_trait]
impl FeedClient for MockFeedClient {
    fn source(&self) -> &str {
        &self.source
    }

    async fn fetch(&self, settings: &FeedSettings) -> Result<FeedResult, FeedError> {
        self.fetches.write().await.push(settings.clone());

        if self.failing.read().await.iter().any(|f| f == &settings.feed) {
            return Err(FeedError::FetchFailed {
                source: self.source.clone(),
                feed: settings.feed.clone(),
                reason: "mock fetch failure".to_string(),
            });
        }

        let entries = if let Some(author) = &settings.author {
            self.authors.read().await.get(author).cloned()
        } else {
            self.feeds.read().await.get(&settings.feed).cloned()
        };
        let Some(mut entries) = entries else {
            return Err(FeedError::UnknownFeed {
                source: self.source.clone(),
                feed: settings.feed.clone(),
            });
        };

        if settings.max_entries > 0 {
            entries.truncate(settings.max_entries);
        }
        Ok(FeedResult::new(entries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::fixtures;

    #[tokio::test]
    async fn test_fetch_configured_feed() {
        let client = MockFeedClient::new("mock-source");
        client.set_feed("latest", fixtures::entries(5)).await;

        let settings = FeedSettings::new("mock-source", "latest").with_max_entries(3);
        let result = client.fetch(&settings).await.unwrap();
        assert_eq!(result.count(), 3);
        assert_eq!(client.fetches().await.len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_unknown_feed_fails() {
        let client = MockFeedClient::new("mock-source");
        let settings = FeedSettings::new("mock-source", "nope");
        assert!(matches!(
            client.fetch(&settings).await,
            Err(FeedError::UnknownFeed { .. })
        ));
    }

    #[tokio::test]
    async fn test_author_fetch_uses_author_map() {
        let client = MockFeedClient::new("mock-source");
        client.set_author("alice", fixtures::entries(2)).await;

        let settings = FeedSettings::new("mock-source", "authors").for_author("alice");
        let result = client.fetch(&settings).await.unwrap();
        assert_eq!(result.count(), 2);
    }
}
