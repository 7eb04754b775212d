//! Sync orchestrator implementation.
//!
//! One [`SourceDriver`] per enabled source, all driven concurrently. Within
//! a driver, sub-feeds run sequentially: fetch, post one job per entry,
//! await the whole batch, reconcile its playlists. The orchestrator then
//! drains the job manager and flushes playlists and history to disk.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use futures::future;
use tracing::{debug, info, warn};

use crate::config::{validate_config, AppConfig, ConfigError, SourceConfig};
use crate::download::{Downloader, TempDirContainers};
use crate::feed::{FeedClient, FeedSettings};
use crate::history::HistoryStore;
use crate::job::JobBuilder;
use crate::metrics;
use crate::playlist::{PlaylistId, PlaylistManager};
use crate::reconcile::{FeedPlaylistSpec, HistoryRecorder, Reconciler};
use crate::scheduler::JobManager;
use crate::target::{DirectoryTarget, StorageTarget, TargetRegistry};

use super::types::{DriverReport, OrchestratorError, SyncSummary};

/// Sub-feed name used for author-filtered fetches.
const AUTHORS_FEED: &str = "authors";

/// Drives one source's sub-feeds through the pipeline.
pub struct SourceDriver {
    client: Arc<dyn FeedClient>,
    config: SourceConfig,
    builder: Arc<JobBuilder>,
    manager: Arc<JobManager>,
    reconciler: Arc<Reconciler>,
}

impl SourceDriver {
    /// Creates a driver for one source.
    pub fn new(
        client: Arc<dyn FeedClient>,
        config: SourceConfig,
        builder: Arc<JobBuilder>,
        manager: Arc<JobManager>,
        reconciler: Arc<Reconciler>,
    ) -> Self {
        Self {
            client,
            config,
            builder,
            manager,
            reconciler,
        }
    }

    /// Runs every enabled sub-feed of this source, sequentially.
    pub async fn run(&self) -> DriverReport {
        let mut report = DriverReport::default();

        for feed in &self.config.feeds {
            if !feed.enabled {
                debug!("Feed {}/{} disabled, skipping", self.config.name, feed.name);
                continue;
            }
            let settings = FeedSettings::new(&self.config.name, &feed.name)
                .with_max_entries(feed.max_entries);
            let playlist = feed.create_playlist.then(|| FeedPlaylistSpec {
                id: PlaylistId::Feed {
                    source: self.config.name.clone(),
                    feed: feed.name.clone(),
                },
                style: feed.playlist_style,
            });
            self.run_batch(&settings, playlist.as_ref(), &mut report)
                .await;
        }

        if let Some(authors) = &self.config.favorite_authors {
            if authors.enabled {
                for author in &authors.authors {
                    let settings =
                        FeedSettings::new(&self.config.name, AUTHORS_FEED).for_author(author);
                    let playlist = authors.create_playlist.then(|| FeedPlaylistSpec {
                        id: if authors.separate_author_playlists {
                            PlaylistId::Author {
                                source: self.config.name.clone(),
                                name: author.clone(),
                            }
                        } else {
                            PlaylistId::Authors {
                                source: self.config.name.clone(),
                            }
                        },
                        style: authors.playlist_style,
                    });
                    self.run_batch(&settings, playlist.as_ref(), &mut report)
                        .await;
                }
            }
        }

        report
    }

    /// Fetches one sub-feed and runs its batch to completion.
    ///
    /// A failed fetch skips the batch entirely: no jobs, no playlist
    /// mutation. A successful but empty fetch still reconciles, so a
    /// replace-style playlist keeps its prior contents (no success in an
    /// empty batch) and its manager sees the pass.
    async fn run_batch(
        &self,
        settings: &FeedSettings,
        playlist: Option<&FeedPlaylistSpec>,
        report: &mut DriverReport,
    ) {
        let feed_label = match &settings.author {
            Some(author) => format!("{}/{}({})", settings.source, settings.feed, author),
            None => format!("{}/{}", settings.source, settings.feed),
        };

        let result = match self.client.fetch(settings).await {
            Ok(result) => {
                let label = if result.is_empty() { "empty" } else { "ok" };
                metrics::FEED_FETCHES
                    .with_label_values(&[settings.source.as_str(), label])
                    .inc();
                report.feeds_fetched += 1;
                result
            }
            Err(e) => {
                warn!("Skipping feed {}: {}", feed_label, e);
                metrics::FEED_FETCHES
                    .with_label_values(&[settings.source.as_str(), "failed"])
                    .inc();
                report.feeds_failed += 1;
                return;
            }
        };
        info!("Fetched {} entries from {}", result.count(), feed_label);

        let mut handles = Vec::with_capacity(result.count());
        for entry in result.entries() {
            let job = self.builder.create_job(entry.clone());
            match self.manager.try_post(job) {
                Some(handle) => handles.push(handle),
                None => warn!("Job for {} rejected, manager is not accepting", entry),
            }
        }

        let mut batch = Vec::with_capacity(handles.len());
        for handle in handles {
            match handle.wait().await {
                Ok(result) => batch.push(result),
                Err(e) => warn!("Job in {} vanished: {}", feed_label, e),
            }
        }
        report.outcomes.extend(batch.iter().map(|r| r.outcome));

        self.reconciler.reconcile(&batch, playlist).await;
    }
}

/// The assembled pipeline for one sync run.
pub struct SyncOrchestrator {
    registry: TargetRegistry,
    manager: Arc<JobManager>,
    drivers: Vec<SourceDriver>,
}

impl SyncOrchestrator {
    /// Starts assembling a pipeline from configuration.
    pub fn builder(config: AppConfig) -> PipelineBuilder {
        PipelineBuilder::new(config)
    }

    /// Runs the full sync: all source drivers concurrently, then drains the
    /// job manager, then flushes playlists and history.
    pub async fn run(&self) -> SyncSummary {
        info!("Starting sync across {} sources", self.drivers.len());
        self.manager.start();

        let reports = future::join_all(self.drivers.iter().map(|d| d.run())).await;
        self.manager.complete().await;

        let mut summary = SyncSummary::default();
        for report in &reports {
            summary.absorb(report);
        }

        self.flush().await;
        info!(
            "Sync finished: {} jobs ({} ok, {} skipped, {} failed, {} gone), {} feeds fetched, {} failed",
            summary.jobs_total(),
            summary.jobs_success,
            summary.jobs_skipped,
            summary.jobs_failed,
            summary.jobs_not_found,
            summary.feeds_fetched,
            summary.feeds_failed,
        );
        summary
    }

    /// Persists every target's playlists and history. Failures are isolated
    /// per target: one broken disk never loses another target's records.
    async fn flush(&self) {
        for target in self.registry.iter() {
            if let Some(playlists) = target.playlists() {
                let stored = playlists.store_all().await;
                debug!("Stored {} playlists for target {}", stored, target.name());
            }
            if let Some(history) = target.history() {
                if let Err(e) = history.write_to_file().await {
                    warn!("History flush failed for target {}: {}", target.name(), e);
                }
            }
        }
    }
}

/// Assembles a [`SyncOrchestrator`] from configuration plus injected
/// collaborators.
pub struct PipelineBuilder {
    config: AppConfig,
    feed_clients: Vec<Arc<dyn FeedClient>>,
    downloader: Option<Arc<dyn Downloader>>,
    targets: Vec<Arc<dyn StorageTarget>>,
    owned_hashes: HashMap<PathBuf, Vec<String>>,
}

impl PipelineBuilder {
    fn new(config: AppConfig) -> Self {
        Self {
            config,
            feed_clients: Vec::new(),
            downloader: None,
            targets: Vec::new(),
            owned_hashes: HashMap::new(),
        }
    }

    /// Registers a feed client; sources without a matching client are
    /// skipped with a diagnostic.
    pub fn with_feed_client(mut self, client: Arc<dyn FeedClient>) -> Self {
        self.feed_clients.push(client);
        self
    }

    /// Sets the downloader. Required.
    pub fn with_downloader(mut self, downloader: Arc<dyn Downloader>) -> Self {
        self.downloader = Some(downloader);
        self
    }

    /// Adds a pre-built target alongside the configured ones.
    pub fn with_target(mut self, target: Arc<dyn StorageTarget>) -> Self {
        self.targets.push(target);
        self
    }

    /// Seeds the owned-hash index for configured targets, keyed by content
    /// directory. Hashing existing content is the caller's concern.
    pub fn with_owned_hashes(mut self, owned_hashes: HashMap<PathBuf, Vec<String>>) -> Self {
        self.owned_hashes = owned_hashes;
        self
    }

    /// Builds the pipeline.
    ///
    /// The only fatal failure point of a sync run: configuration problems
    /// and missing collaborators surface here, everything later degrades
    /// per feed, per job or per target.
    pub async fn build(mut self) -> Result<SyncOrchestrator, OrchestratorError> {
        validate_config(&self.config)?;
        let downloader = self
            .downloader
            .ok_or(OrchestratorError::MissingCollaborator("downloader"))?;

        let mut targets = std::mem::take(&mut self.targets);
        for location in self.config.targets.iter().filter(|t| t.enabled) {
            let name = location.path.display().to_string();
            let owned = self
                .owned_hashes
                .remove(&location.path)
                .unwrap_or_default();
            let mut target = DirectoryTarget::new(&name, &location.path, owned)
                .with_overwrite(location.overwrite);

            if let Some(history_path) = &location.history_path {
                let history = HistoryStore::new(history_path);
                if let Err(e) = history.initialize().await {
                    warn!("History load failed for {}, starting empty: {}", name, e);
                }
                target = target.with_history(history);
            }
            if let Some(playlist_dir) = &location.playlist_dir {
                target = target.with_playlists(PlaylistManager::new(playlist_dir));
            }
            targets.push(Arc::new(target));
        }
        if targets.is_empty() {
            return Err(ConfigError::ValidationError(
                "at least one enabled target is required".to_string(),
            )
            .into());
        }
        let registry = TargetRegistry::new(targets);

        let recorder = Arc::new(HistoryRecorder::new(registry.clone()));
        let manager = Arc::new(JobManager::new(
            self.config.max_concurrent_downloads,
            recorder,
        ));
        let builder = Arc::new(JobBuilder::new(
            registry.clone(),
            downloader,
            Arc::new(TempDirContainers::new(&self.config.temp_dir)),
        ));
        let reconciler = Arc::new(Reconciler::new(
            registry.clone(),
            self.config.all_synced_playlist,
        ));

        let mut drivers = Vec::new();
        for source in self.config.sources.iter().filter(|s| s.enabled) {
            let Some(client) = self
                .feed_clients
                .iter()
                .find(|c| c.source() == source.name)
            else {
                warn!("No feed client registered for source {}, skipping", source.name);
                continue;
            };
            drivers.push(SourceDriver::new(
                Arc::clone(client),
                source.clone(),
                Arc::clone(&builder),
                Arc::clone(&manager),
                Arc::clone(&reconciler),
            ));
        }

        Ok(SyncOrchestrator {
            registry,
            manager,
            drivers,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TargetLocationConfig;
    use crate::testing::{fixtures, MockDownloader, MockFeedClient, MockTarget};
    use tempfile::TempDir;

    fn config_with_feed(temp: &TempDir) -> AppConfig {
        crate::config::load_config_from_str(&format!(
            r#"
temp_dir = "{}"

[[sources]]
name = "mock-source"

[[sources.feeds]]
name = "latest"
"#,
            temp.path().join("temp").display()
        ))
        .unwrap()
    }

    #[tokio::test]
    async fn test_build_without_downloader_fails() {
        let temp = TempDir::new().unwrap();
        let result = SyncOrchestrator::builder(config_with_feed(&temp))
            .with_target(Arc::new(MockTarget::new("t1")))
            .build()
            .await;
        assert!(matches!(
            result,
            Err(OrchestratorError::MissingCollaborator("downloader"))
        ));
    }

    #[tokio::test]
    async fn test_build_without_targets_fails() {
        let temp = TempDir::new().unwrap();
        let result = SyncOrchestrator::builder(config_with_feed(&temp))
            .with_downloader(Arc::new(MockDownloader::new()))
            .build()
            .await;
        assert!(matches!(
            result,
            Err(OrchestratorError::Config(ConfigError::ValidationError(_)))
        ));
    }

    #[tokio::test]
    async fn test_run_syncs_configured_feed() {
        let temp = TempDir::new().unwrap();
        let client = Arc::new(MockFeedClient::new("mock-source"));
        client.set_feed("latest", fixtures::entries(4)).await;
        let target = Arc::new(MockTarget::new("t1"));

        let orchestrator = SyncOrchestrator::builder(config_with_feed(&temp))
            .with_feed_client(client)
            .with_downloader(Arc::new(MockDownloader::new()))
            .with_target(Arc::clone(&target) as Arc<dyn StorageTarget>)
            .build()
            .await
            .unwrap();

        let summary = orchestrator.run().await;
        assert_eq!(summary.feeds_fetched, 1);
        assert_eq!(summary.jobs_success, 4);
        assert_eq!(target.materialized().await.len(), 4);
    }

    #[tokio::test]
    async fn test_failed_fetch_is_skipped() {
        let temp = TempDir::new().unwrap();
        let client = Arc::new(MockFeedClient::new("mock-source"));
        client.set_failing("latest").await;

        let orchestrator = SyncOrchestrator::builder(config_with_feed(&temp))
            .with_feed_client(client)
            .with_downloader(Arc::new(MockDownloader::new()))
            .with_target(Arc::new(MockTarget::new("t1")))
            .build()
            .await
            .unwrap();

        let summary = orchestrator.run().await;
        assert_eq!(summary.feeds_failed, 1);
        assert_eq!(summary.jobs_total(), 0);
    }

    #[tokio::test]
    async fn test_entries_owned_everywhere_are_skipped() {
        let temp = TempDir::new().unwrap();
        let client = Arc::new(MockFeedClient::new("mock-source"));
        client.set_feed("latest", fixtures::entries(2)).await;
        let target = Arc::new(MockTarget::new("t1").with_owned(["HASH-0", "HASH-1"]));

        let orchestrator = SyncOrchestrator::builder(config_with_feed(&temp))
            .with_feed_client(client)
            .with_downloader(Arc::new(MockDownloader::new()))
            .with_target(Arc::clone(&target) as Arc<dyn StorageTarget>)
            .build()
            .await
            .unwrap();

        let summary = orchestrator.run().await;
        assert_eq!(summary.jobs_skipped, 2);
        assert!(target.materialized().await.is_empty());
    }

    #[tokio::test]
    async fn test_configured_directory_target() {
        let temp = TempDir::new().unwrap();
        let mut config = config_with_feed(&temp);
        config.targets.push(TargetLocationConfig {
            path: temp.path().join("content"),
            enabled: true,
            overwrite: false,
            history_path: Some(temp.path().join("history.json")),
            playlist_dir: Some(temp.path().join("playlists")),
        });
        let client = Arc::new(MockFeedClient::new("mock-source"));
        client.set_feed("latest", fixtures::entries(2)).await;

        let orchestrator = SyncOrchestrator::builder(config)
            .with_feed_client(client)
            .with_downloader(Arc::new(MockDownloader::new()))
            .build()
            .await
            .unwrap();

        let summary = orchestrator.run().await;
        assert_eq!(summary.jobs_success, 2);
        assert!(temp.path().join("content").join("k0.zip").is_file());
        assert!(temp.path().join("history.json").is_file());
    }
}
