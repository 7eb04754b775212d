//! Prometheus metrics for core components.

use once_cell::sync::Lazy;
use prometheus::{IntCounter, IntCounterVec, Opts, Registry};

/// Feed fetches by source and result ("ok", "empty", "failed").
pub static FEED_FETCHES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("mapsync_feed_fetches_total", "Total sub-feed fetches"),
        &["source", "result"],
    )
    .unwrap()
});

/// Completed jobs by terminal outcome.
pub static JOBS_COMPLETED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("mapsync_jobs_completed_total", "Total completed jobs"),
        &["outcome"], // "success", "skipped", "failed", "not_found"
    )
    .unwrap()
});

/// Job posts rejected by the manager (shutting down or not started).
pub static JOBS_REJECTED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("mapsync_jobs_rejected_total", "Total rejected job posts").unwrap()
});

/// History entries written across all targets.
pub static HISTORY_WRITES: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("mapsync_history_writes_total", "Total history writes").unwrap()
});

/// Playlist reconciliation passes.
pub static PLAYLIST_PASSES: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "mapsync_playlist_passes_total",
        "Total playlist reconciliation passes",
    )
    .unwrap()
});

/// Registers all core metrics with the given registry.
pub fn register_all(registry: &Registry) -> Result<(), prometheus::Error> {
    registry.register(Box::new(FEED_FETCHES.clone()))?;
    registry.register(Box::new(JOBS_COMPLETED.clone()))?;
    registry.register(Box::new(JOBS_REJECTED.clone()))?;
    registry.register(Box::new(HISTORY_WRITES.clone()))?;
    registry.register(Box::new(PLAYLIST_PASSES.clone()))?;
    Ok(())
}
