use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// Worker slots in the job manager.
    #[serde(default = "default_max_concurrent_downloads")]
    pub max_concurrent_downloads: usize,
    /// Maintain the shared playlist collecting every synced entry.
    #[serde(default = "default_true")]
    pub all_synced_playlist: bool,
    /// Directory for in-flight download containers.
    #[serde(default = "default_temp_dir")]
    pub temp_dir: PathBuf,
    #[serde(default)]
    pub sources: Vec<SourceConfig>,
    #[serde(default)]
    pub targets: Vec<TargetLocationConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            max_concurrent_downloads: default_max_concurrent_downloads(),
            all_synced_playlist: true,
            temp_dir: default_temp_dir(),
            sources: Vec::new(),
            targets: Vec::new(),
        }
    }
}

fn default_max_concurrent_downloads() -> usize {
    3
}

fn default_temp_dir() -> PathBuf {
    PathBuf::from("temp")
}

fn default_true() -> bool {
    true
}

fn default_max_entries() -> usize {
    20
}

/// One content source and the sub-feeds to sync from it
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SourceConfig {
    /// Source name, matched against a registered feed client.
    pub name: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub feeds: Vec<FeedConfig>,
    #[serde(default)]
    pub favorite_authors: Option<FavoriteAuthorsConfig>,
}

/// One named sub-feed of a source
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FeedConfig {
    pub name: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Most recent entries to take per fetch.
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
    /// Maintain a playlist for this feed.
    #[serde(default = "default_true")]
    pub create_playlist: bool,
    #[serde(default)]
    pub playlist_style: PlaylistStyle,
}

/// How a feed playlist absorbs each batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaylistStyle {
    /// Keep prior contents, add the batch on top.
    #[default]
    Append,
    /// Mirror the feed: drop prior contents when the batch succeeds.
    Replace,
}

/// Per-author sync of followed uploaders
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FavoriteAuthorsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    pub authors: Vec<String>,
    #[serde(default = "default_true")]
    pub create_playlist: bool,
    /// One playlist per author instead of a shared one.
    #[serde(default)]
    pub separate_author_playlists: bool,
    #[serde(default)]
    pub playlist_style: PlaylistStyle,
}

/// One storage target location
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TargetLocationConfig {
    /// Content directory.
    pub path: PathBuf,
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Replace already-materialized files instead of failing.
    #[serde(default)]
    pub overwrite: bool,
    /// History file; omit to disable history for this target.
    #[serde(default)]
    pub history_path: Option<PathBuf>,
    /// Playlist directory; omit to disable playlists for this target.
    #[serde(default)]
    pub playlist_dir: Option<PathBuf>,
}
