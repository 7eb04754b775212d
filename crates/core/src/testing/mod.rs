//! Testing utilities and mock implementations.
//!
//! Mock implementations of the feed, download and target traits, so the
//! whole pipeline can be exercised without network access or a real
//! content library.

mod mock_downloader;
mod mock_feed;
mod mock_target;

pub use mock_downloader::MockDownloader;
pub use mock_feed::MockFeedClient;
pub use mock_target::MockTarget;

/// Test fixtures and helper functions.
pub mod fixtures {
    use chrono::Utc;
    use uuid::Uuid;

    use crate::catalog::CatalogEntry;
    use crate::job::{JobOutcome, JobResult};

    /// Create a catalog entry with reasonable defaults.
    pub fn entry(key: &str, hash: &str) -> CatalogEntry {
        CatalogEntry {
            key: Some(key.to_string()),
            hash: hash.to_string(),
            title: format!("title-{key}"),
            author: Some("mock-author".to_string()),
            source: "mock-source".to_string(),
        }
    }

    /// Create a batch of entries keyed `k0..kN`.
    pub fn entries(count: usize) -> Vec<CatalogEntry> {
        (0..count)
            .map(|i| entry(&format!("k{i}"), &format!("HASH-{i}")))
            .collect()
    }

    /// Create a terminal job result without running a job.
    pub fn job_result(key: &str, outcome: JobOutcome) -> JobResult {
        JobResult {
            job_id: Uuid::new_v4(),
            entry: entry(key, &format!("HASH-{key}")),
            outcome,
            download: None,
            target_outcomes: Vec::new(),
            finished_at: Utc::now(),
        }
    }
}
