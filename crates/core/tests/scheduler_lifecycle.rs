//! Scheduler lifecycle integration tests.
//!
//! Exercises the job manager against real jobs built from mock
//! collaborators: the concurrency bound, drain semantics and the shutdown
//! contract for queued work.

use std::sync::Arc;
use std::time::Duration;

use tempfile::TempDir;

use mapsync_core::{
    download::{Downloader, TempDirContainers},
    job::{JobBuilder, JobOutcome},
    reconcile::HistoryRecorder,
    scheduler::{JobManager, NoopCompletionHandler},
    target::{StorageTarget, TargetRegistry},
    testing::{fixtures, MockDownloader, MockTarget},
};

struct TestHarness {
    downloader: Arc<MockDownloader>,
    target: Arc<MockTarget>,
    registry: TargetRegistry,
    builder: JobBuilder,
    _temp_dir: TempDir,
}

impl TestHarness {
    fn new(downloader: MockDownloader) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let downloader = Arc::new(downloader);
        let target = Arc::new(
            MockTarget::new("main").with_history(temp_dir.path().join("history.json")),
        );
        let registry =
            TargetRegistry::new(vec![Arc::clone(&target) as Arc<dyn StorageTarget>]);
        let builder = JobBuilder::new(
            registry.clone(),
            Arc::clone(&downloader) as Arc<dyn Downloader>,
            Arc::new(TempDirContainers::new(temp_dir.path().join("temp"))),
        );
        Self {
            downloader,
            target,
            registry,
            builder,
            _temp_dir: temp_dir,
        }
    }
}

#[tokio::test]
async fn test_concurrency_never_exceeds_capacity() {
    let harness = TestHarness::new(MockDownloader::new().with_delay(Duration::from_millis(30)));
    let manager = JobManager::new(3, Arc::new(NoopCompletionHandler));
    manager.start();

    for entry in fixtures::entries(10) {
        let job = harness.builder.create_job(entry);
        assert!(manager.try_post(job).is_some());
    }
    manager.complete().await;

    assert_eq!(harness.downloader.downloaded().await.len(), 10);
    // Ten delayed jobs through three slots saturate the pool without ever
    // exceeding it.
    assert_eq!(harness.downloader.max_active(), 3);
}

#[tokio::test]
async fn test_complete_drains_through_completion_handler() {
    let harness = TestHarness::new(MockDownloader::new());
    let recorder = Arc::new(HistoryRecorder::new(harness.registry.clone()));
    let manager = JobManager::new(2, recorder);
    manager.start();

    for entry in fixtures::entries(5) {
        let job = harness.builder.create_job(entry);
        assert!(manager.try_post(job).is_some());
    }
    manager.complete().await;

    // complete() returning implies every handler already ran.
    assert_eq!(harness.target.history().unwrap().len().await, 5);
    assert_eq!(harness.target.materialized().await.len(), 5);
}

#[tokio::test]
async fn test_shutdown_resolves_unstarted_jobs_as_failed() {
    let harness = TestHarness::new(MockDownloader::new().with_delay(Duration::from_millis(100)));
    let recorder = Arc::new(HistoryRecorder::new(harness.registry.clone()));
    let manager = JobManager::new(1, recorder);
    manager.start();

    let mut handles = Vec::new();
    for entry in fixtures::entries(4) {
        let job = harness.builder.create_job(entry);
        handles.push(manager.try_post(job).expect("manager accepts before shutdown"));
    }

    // Let the first job start, then pull the plug.
    tokio::time::sleep(Duration::from_millis(20)).await;
    manager.shutdown();
    assert!(manager
        .try_post(harness.builder.create_job(fixtures::entry("late", "HASH-LATE")))
        .is_none());
    manager.complete().await;

    // Every accepted handle resolves, and jobs that never started come
    // back failed with their handler invoked.
    let mut failed = 0;
    for handle in handles {
        let result = handle.wait().await.expect("handle resolves");
        if result.outcome == JobOutcome::Failed {
            failed += 1;
        }
    }
    assert!(failed >= 2, "queued jobs should fail on shutdown");
    assert_eq!(harness.target.history().unwrap().len().await, 4);
}
