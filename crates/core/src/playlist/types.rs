//! Playlist identifiers, entries and the playlist itself.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::catalog::CatalogEntry;

/// Stable identifier for a playlist within a target.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlaylistId {
    /// Every entry handled by any feed ("all synced").
    AllSynced,
    /// One sub-feed's playlist.
    Feed { source: String, feed: String },
    /// Shared playlist for a source's favorite-authors feed.
    Authors { source: String },
    /// Per-author playlist for a source's favorite-authors feed.
    Author { source: String, name: String },
}

impl PlaylistId {
    /// File name (without directory) this playlist persists under.
    pub fn file_name(&self) -> String {
        match self {
            PlaylistId::AllSynced => "mapsync-all.json".to_string(),
            PlaylistId::Feed { source, feed } => {
                format!("mapsync-{}-{}.json", sanitize(source), sanitize(feed))
            }
            PlaylistId::Authors { source } => {
                format!("mapsync-{}-authors.json", sanitize(source))
            }
            PlaylistId::Author { source, name } => {
                format!("mapsync-{}-author-{}.json", sanitize(source), sanitize(name))
            }
        }
    }
}

fn sanitize(raw: &str) -> String {
    raw.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}

/// One playlist entry: the catalog entry plus its added-time stamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistEntry {
    /// The wrapped catalog entry.
    pub entry: CatalogEntry,
    /// Stamp assigned when the entry was added; sorts descending.
    pub added_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct PlaylistInner {
    entries: Vec<PlaylistEntry>,
    dirty: bool,
}

/// A named, ordered collection of entries.
///
/// All mutation goes through the interior lock; a playlist shared by
/// several drivers (the all-synced playlist) therefore never sees
/// interleaved writes.
pub struct Playlist {
    id: PlaylistId,
    inner: RwLock<PlaylistInner>,
}

impl Playlist {
    /// Creates an empty playlist.
    pub fn new(id: PlaylistId) -> Self {
        Self {
            id,
            inner: RwLock::new(PlaylistInner::default()),
        }
    }

    /// Creates a playlist pre-populated from persisted entries.
    pub fn with_entries(id: PlaylistId, entries: Vec<PlaylistEntry>) -> Self {
        Self {
            id,
            inner: RwLock::new(PlaylistInner {
                entries,
                dirty: false,
            }),
        }
    }

    /// This playlist's identifier.
    pub fn id(&self) -> &PlaylistId {
        &self.id
    }

    /// Adds `entry` with the given stamp unless an entry with the same
    /// key is already present. Returns true when added.
    pub async fn add(&self, entry: CatalogEntry, added_at: DateTime<Utc>) -> bool {
        let mut inner = self.inner.write().await;
        let duplicate = inner
            .entries
            .iter()
            .any(|e| e.entry.key_or_hash() == entry.key_or_hash());
        if duplicate {
            return false;
        }
        inner.entries.push(PlaylistEntry { entry, added_at });
        true
    }

    /// Removes every entry.
    pub async fn clear(&self) {
        self.inner.write().await.entries.clear();
    }

    /// Sorts entries descending by added-time (newest first).
    pub async fn sort(&self) {
        let mut inner = self.inner.write().await;
        inner.entries.sort_by(|a, b| b.added_at.cmp(&a.added_at));
    }

    /// Marks the playlist as changed, scheduling it for persistence.
    pub async fn notify_changed(&self) {
        self.inner.write().await.dirty = true;
    }

    /// Clears and returns the changed flag.
    pub(crate) async fn take_changed(&self) -> bool {
        let mut inner = self.inner.write().await;
        std::mem::take(&mut inner.dirty)
    }

    /// Current entries in playlist order.
    pub async fn snapshot(&self) -> Vec<PlaylistEntry> {
        self.inner.read().await.entries.clone()
    }

    /// Number of entries.
    pub async fn len(&self) -> usize {
        self.inner.read().await.entries.len()
    }

    /// True when the playlist has no entries.
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.entries.is_empty()
    }
}
