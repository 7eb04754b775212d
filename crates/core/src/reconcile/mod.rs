//! Completion reconciliation: history writes per job, playlist updates per
//! batch.
//!
//! History is written from the scheduler's completion handler, once per job
//! for every history-capable target, whether or not the job ever reached a
//! download. Playlist reconciliation runs once per finished batch, after
//! the driver has awaited every job in it.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::config::PlaylistStyle;
use crate::job::{JobOutcome, JobResult};
use crate::metrics;
use crate::playlist::{next_added_at, Playlist, PlaylistId};
use crate::scheduler::JobCompletionHandler;
use crate::target::TargetRegistry;

/// The feed-specific playlist a batch reconciles into, when enabled.
#[derive(Debug, Clone)]
pub struct FeedPlaylistSpec {
    /// Playlist identifier.
    pub id: PlaylistId,
    /// Append to the playlist or replace its contents.
    pub style: PlaylistStyle,
}

/// Writes one history entry per finished job into every history-capable
/// target.
pub struct HistoryRecorder {
    registry: TargetRegistry,
}

impl HistoryRecorder {
    /// Creates a recorder over the configured targets.
    pub fn new(registry: TargetRegistry) -> Self {
        Self { registry }
    }
}

#[async_trait]
impl JobCompletionHandler for HistoryRecorder {
    async fn on_job_finished(&self, result: &JobResult) {
        let entry = result.to_history_entry();
        for target in self.registry.iter() {
            let Some(history) = target.history() else {
                continue;
            };
            if history.try_add(&result.entry.hash, entry.clone()).await {
                metrics::HISTORY_WRITES.inc();
            } else {
                debug!(
                    "History on {} already has {}",
                    target.name(),
                    result.entry.hash
                );
            }
        }

        match result.outcome {
            JobOutcome::Success => info!("Job completed: {}", result.entry),
            JobOutcome::Skipped => info!("Job skipped: {} not wanted by any target", result.entry),
            JobOutcome::NotFound => warn!("Job not found remotely: {}", result.entry),
            JobOutcome::Failed => warn!("Job failed: {}", result.entry),
        }
    }
}

/// Batch-level playlist reconciliation.
pub struct Reconciler {
    registry: TargetRegistry,
    all_synced_playlist: bool,
}

impl Reconciler {
    /// Creates a reconciler; `all_synced_playlist` enables the shared
    /// playlist collecting every synced entry.
    pub fn new(registry: TargetRegistry, all_synced_playlist: bool) -> Self {
        Self {
            registry,
            all_synced_playlist,
        }
    }

    /// Reconciles one finished batch into the relevant playlists.
    ///
    /// Collects the all-synced playlist (if enabled) and the feed playlist
    /// (if given) from every playlist-capable target. Replace-style feed
    /// playlists are cleared only when at least one job in the batch
    /// succeeded; an all-failed or all-skipped batch never wipes prior
    /// contents. Entries whose download was reported gone remotely are
    /// excluded. Each touched playlist is re-sorted and flagged changed
    /// exactly once per pass.
    pub async fn reconcile(
        &self,
        batch: &[Arc<JobResult>],
        feed_playlist: Option<&FeedPlaylistSpec>,
    ) {
        let mut playlists: Vec<Arc<Playlist>> = Vec::new();
        let mut feed_playlists: Vec<Arc<Playlist>> = Vec::new();

        for target in self.registry.iter() {
            let Some(manager) = target.playlists() else {
                continue;
            };
            if self.all_synced_playlist {
                push_unique(
                    &mut playlists,
                    manager.get_or_create(PlaylistId::AllSynced).await,
                );
            }
            if let Some(spec) = feed_playlist {
                let playlist = manager.get_or_create(spec.id.clone()).await;
                push_unique(&mut feed_playlists, Arc::clone(&playlist));
                push_unique(&mut playlists, playlist);
            }
        }

        if playlists.is_empty() {
            return;
        }

        let any_success = batch.iter().any(|r| r.outcome.successful());
        let replace = matches!(
            feed_playlist.map(|s| s.style),
            Some(PlaylistStyle::Replace)
        );
        if any_success && replace {
            for playlist in &feed_playlists {
                playlist.clear().await;
                playlist.notify_changed().await;
            }
        }

        for result in batch.iter().filter(|r| r.playlist_eligible()) {
            for playlist in &playlists {
                playlist.add(result.entry.clone(), next_added_at()).await;
            }
        }

        for playlist in &playlists {
            playlist.sort().await;
            playlist.notify_changed().await;
        }
        metrics::PLAYLIST_PASSES.inc();
    }
}

fn push_unique(list: &mut Vec<Arc<Playlist>>, playlist: Arc<Playlist>) {
    if !list.iter().any(|p| Arc::ptr_eq(p, &playlist)) {
        list.push(playlist);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::StorageTarget;
    use crate::testing::{fixtures, MockTarget};
    use tempfile::TempDir;

    fn result(key: &str, outcome: JobOutcome) -> Arc<JobResult> {
        Arc::new(fixtures::job_result(key, outcome))
    }

    async fn playlist_keys(playlist: &Playlist) -> Vec<String> {
        playlist
            .snapshot()
            .await
            .iter()
            .map(|e| e.entry.key_or_hash().to_string())
            .collect()
    }

    #[tokio::test]
    async fn test_batch_order_reverses_iteration_order() {
        let dir = TempDir::new().unwrap();
        let target = Arc::new(MockTarget::new("t1").with_playlists(dir.path()));
        let registry = TargetRegistry::new(vec![target.clone()]);
        let reconciler = Reconciler::new(registry, true);

        let batch = vec![
            result("a", JobOutcome::Success),
            result("b", JobOutcome::Success),
            result("c", JobOutcome::Success),
        ];
        reconciler.reconcile(&batch, None).await;

        let playlist = target
            .playlists()
            .unwrap()
            .get_or_create(PlaylistId::AllSynced)
            .await;
        assert_eq!(playlist_keys(&playlist).await, vec!["c", "b", "a"]);
    }

    #[tokio::test]
    async fn test_not_found_excluded_from_playlists() {
        let dir = TempDir::new().unwrap();
        let target = Arc::new(MockTarget::new("t1").with_playlists(dir.path()));
        let registry = TargetRegistry::new(vec![target.clone()]);
        let reconciler = Reconciler::new(registry, true);

        let batch = vec![
            result("a", JobOutcome::Success),
            result("b", JobOutcome::NotFound),
            result("c", JobOutcome::Failed),
        ];
        reconciler.reconcile(&batch, None).await;

        let playlist = target
            .playlists()
            .unwrap()
            .get_or_create(PlaylistId::AllSynced)
            .await;
        // Failures stay (retryable), remote-404s do not.
        assert_eq!(playlist_keys(&playlist).await, vec!["c", "a"]);
    }

    #[tokio::test]
    async fn test_replace_clears_only_on_success() {
        let dir = TempDir::new().unwrap();
        let target = Arc::new(MockTarget::new("t1").with_playlists(dir.path()));
        let registry = TargetRegistry::new(vec![target.clone()]);
        let reconciler = Reconciler::new(registry, false);

        let spec = FeedPlaylistSpec {
            id: PlaylistId::Feed {
                source: "s".to_string(),
                feed: "f".to_string(),
            },
            style: PlaylistStyle::Replace,
        };

        let batch = vec![result("a", JobOutcome::Success)];
        reconciler.reconcile(&batch, Some(&spec)).await;

        let playlist = target
            .playlists()
            .unwrap()
            .get_or_create(spec.id.clone())
            .await;
        assert_eq!(playlist_keys(&playlist).await, vec!["a"]);

        // An all-skipped batch must not wipe the playlist.
        let batch = vec![result("b", JobOutcome::Skipped)];
        reconciler.reconcile(&batch, Some(&spec)).await;
        assert_eq!(playlist_keys(&playlist).await, vec!["b", "a"]);

        // A successful batch replaces prior contents.
        let batch = vec![result("c", JobOutcome::Success)];
        reconciler.reconcile(&batch, Some(&spec)).await;
        assert_eq!(playlist_keys(&playlist).await, vec!["c"]);
    }

    #[tokio::test]
    async fn test_history_recorder_writes_once_per_target() {
        let dir = TempDir::new().unwrap();
        let t1 = Arc::new(MockTarget::new("t1").with_history(dir.path().join("h1.json")));
        let t2 = Arc::new(MockTarget::new("t2"));
        let registry = TargetRegistry::new(vec![t1.clone(), t2]);
        let recorder = HistoryRecorder::new(registry);

        for outcome in [
            JobOutcome::Success,
            JobOutcome::Failed,
            JobOutcome::NotFound,
        ] {
            let result = fixtures::job_result(&format!("{outcome:?}"), outcome);
            recorder.on_job_finished(&result).await;
        }

        // One write per job, even for jobs that never reached a download.
        assert_eq!(t1.history().unwrap().len().await, 3);
    }
}
