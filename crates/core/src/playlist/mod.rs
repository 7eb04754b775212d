//! Per-target ordered playlists.
//!
//! A playlist-capable target owns one [`PlaylistManager`], a registry of
//! named [`Playlist`]s persisted as JSON files. Playlists are mutated only
//! through the completion reconciler; each playlist serializes its own
//! writers so concurrent drivers may safely touch shared playlists (the
//! all-synced playlist in particular).

mod error;
mod manager;
mod stamp;
mod types;

pub use error::PlaylistError;
pub use manager::PlaylistManager;
pub use stamp::next_added_at;
pub use types::{Playlist, PlaylistEntry, PlaylistId};
