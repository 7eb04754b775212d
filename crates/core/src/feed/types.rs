//! Types for the feed module.

use crate::catalog::CatalogEntry;

/// Parameters for one sub-feed fetch.
#[derive(Debug, Clone)]
pub struct FeedSettings {
    /// Source service name.
    pub source: String,
    /// Sub-feed name within the source (e.g. "latest", "trending").
    pub feed: String,
    /// Restrict the feed to one author (favorite-authors variant).
    pub author: Option<String>,
    /// Upper bound on entries to pull; 0 means the client's default.
    pub max_entries: usize,
}

impl FeedSettings {
    /// Creates settings for a plain sub-feed.
    pub fn new(source: impl Into<String>, feed: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            feed: feed.into(),
            author: None,
            max_entries: 0,
        }
    }

    /// Restricts the fetch to one author.
    pub fn for_author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    /// Caps the number of entries to pull.
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }
}

/// Entries returned by a successful fetch, ordered and unique by key.
#[derive(Debug, Clone, Default)]
pub struct FeedResult {
    entries: Vec<CatalogEntry>,
}

impl FeedResult {
    /// Builds a result, deduplicating by `key_or_hash` and keeping the
    /// first occurrence in feed order.
    pub fn new(entries: impl IntoIterator<Item = CatalogEntry>) -> Self {
        let mut seen = std::collections::HashSet::new();
        let entries = entries
            .into_iter()
            .filter(|e| seen.insert(e.key_or_hash().to_string()))
            .collect();
        Self { entries }
    }

    /// Entries in feed order.
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Number of entries.
    pub fn count(&self) -> usize {
        self.entries.len()
    }

    /// True when the fetch succeeded but produced nothing.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(key: &str) -> CatalogEntry {
        CatalogEntry {
            key: Some(key.to_string()),
            hash: format!("hash-{key}"),
            title: format!("title-{key}"),
            author: None,
            source: "test".to_string(),
        }
    }

    #[test]
    fn test_feed_result_dedups_by_key() {
        let result = FeedResult::new(vec![entry("a"), entry("b"), entry("a"), entry("c")]);
        assert_eq!(result.count(), 3);
        let keys: Vec<_> = result
            .entries()
            .iter()
            .map(|e| e.key_or_hash().to_string())
            .collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_feed_settings_builder() {
        let settings = FeedSettings::new("beatsaver", "authors")
            .for_author("ruckus")
            .with_max_entries(20);
        assert_eq!(settings.author.as_deref(), Some("ruckus"));
        assert_eq!(settings.max_entries, 20);
    }
}
