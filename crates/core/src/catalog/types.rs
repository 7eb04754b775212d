//! Types for the catalog module.

use serde::{Deserialize, Serialize};

/// One item obtained from a remote feed.
///
/// Immutable once produced by a feed client. Identity is the stable `key`
/// when the feed provides one, otherwise the content `hash`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Stable key assigned by the remote catalog, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Content hash fingerprinting the item.
    pub hash: String,
    /// Human-readable title.
    pub title: String,
    /// Uploader / author name, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    /// Name of the source feed service this entry came from.
    pub source: String,
}

impl CatalogEntry {
    /// The identifier used for temp containers and deduplication:
    /// the remote key when present, otherwise the content hash.
    pub fn key_or_hash(&self) -> &str {
        self.key.as_deref().unwrap_or(&self.hash)
    }
}

impl std::fmt::Display for CatalogEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.author {
            Some(author) => write!(f, "{} ({}) by {}", self.title, self.key_or_hash(), author),
            None => write!(f, "{} ({})", self.title, self.key_or_hash()),
        }
    }
}
