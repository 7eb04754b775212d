//! Per-target playlist registry and persistence.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, warn};

use super::error::PlaylistError;
use super::types::{Playlist, PlaylistEntry, PlaylistId};

/// On-disk representation of one playlist.
#[derive(Debug, Serialize, Deserialize)]
struct PlaylistFile {
    id: PlaylistId,
    entries: Vec<PlaylistEntry>,
}

/// Registry of a target's named playlists, persisted under one directory.
pub struct PlaylistManager {
    directory: PathBuf,
    playlists: RwLock<HashMap<PlaylistId, Arc<Playlist>>>,
}

impl PlaylistManager {
    /// Creates a manager persisting playlists under `directory`.
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            playlists: RwLock::new(HashMap::new()),
        }
    }

    /// Directory playlists are persisted under.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Returns the playlist for `id`, loading it from disk on first access
    /// or creating it empty. A malformed file is diagnosed and replaced by
    /// an empty playlist rather than failing the run.
    pub async fn get_or_create(&self, id: PlaylistId) -> Arc<Playlist> {
        {
            let playlists = self.playlists.read().await;
            if let Some(playlist) = playlists.get(&id) {
                return Arc::clone(playlist);
            }
        }
        let mut playlists = self.playlists.write().await;
        // Re-check: another caller may have inserted while we upgraded.
        if let Some(playlist) = playlists.get(&id) {
            return Arc::clone(playlist);
        }
        let playlist = Arc::new(self.load_or_empty(&id));
        playlists.insert(id, Arc::clone(&playlist));
        playlist
    }

    fn load_or_empty(&self, id: &PlaylistId) -> Playlist {
        let path = self.directory.join(id.file_name());
        if !path.exists() {
            return Playlist::new(id.clone());
        }
        match std::fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<PlaylistFile>(&raw) {
                Ok(file) => {
                    debug!("Loaded playlist {:?} with {} entries", path, file.entries.len());
                    Playlist::with_entries(id.clone(), file.entries)
                }
                Err(e) => {
                    warn!("Malformed playlist file {:?}, starting empty: {}", path, e);
                    Playlist::new(id.clone())
                }
            },
            Err(e) => {
                warn!("Failed to read playlist file {:?}, starting empty: {}", path, e);
                Playlist::new(id.clone())
            }
        }
    }

    /// Persists every playlist whose changed flag is set.
    ///
    /// A write failure for one playlist is diagnosed and does not block the
    /// others. Returns the number of playlists written.
    pub async fn store_all(&self) -> usize {
        let playlists: Vec<Arc<Playlist>> = {
            let playlists = self.playlists.read().await;
            playlists.values().cloned().collect()
        };

        let mut stored = 0;
        for playlist in playlists {
            if !playlist.take_changed().await {
                continue;
            }
            match self.store_one(&playlist).await {
                Ok(()) => stored += 1,
                Err(e) => {
                    // Flag again so a later flush can retry.
                    playlist.notify_changed().await;
                    warn!("Failed to persist playlist {:?}: {}", playlist.id(), e);
                }
            }
        }
        stored
    }

    async fn store_one(&self, playlist: &Playlist) -> Result<(), PlaylistError> {
        let path = self.directory.join(playlist.id().file_name());
        let file = PlaylistFile {
            id: playlist.id().clone(),
            entries: playlist.snapshot().await,
        };
        let raw = serde_json::to_string_pretty(&file).map_err(|e| PlaylistError::Malformed {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        tokio::fs::create_dir_all(&self.directory)
            .await
            .map_err(|e| PlaylistError::WriteFailed {
                path: path.clone(),
                source: e,
            })?;
        tokio::fs::write(&path, raw)
            .await
            .map_err(|e| PlaylistError::WriteFailed { path, source: e })
    }
}
