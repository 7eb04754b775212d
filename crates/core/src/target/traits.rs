//! Trait definitions for the target module.

use async_trait::async_trait;

use crate::download::DownloadedContent;
use crate::history::HistoryStore;
use crate::playlist::PlaylistManager;

use super::error::TargetError;

/// A local destination for downloaded content.
///
/// History and playlist support are optional capabilities surfaced through
/// accessors rather than downcasting; callers branch on `Option`, never on
/// the concrete type.
#[async_trait]
pub trait StorageTarget: Send + Sync {
    /// Name used in diagnostics.
    fn name(&self) -> &str;

    /// True when this target already owns content with the given hash.
    async fn has_content(&self, hash: &str) -> Result<bool, TargetError>;

    /// Copies downloaded content into this target.
    async fn materialize(&self, content: &DownloadedContent) -> Result<(), TargetError>;

    /// History capability, if this target records download history.
    fn history(&self) -> Option<&HistoryStore> {
        None
    }

    /// Playlist capability, if this target maintains playlists.
    fn playlists(&self) -> Option<&PlaylistManager> {
        None
    }
}
