//! Job factory binding entries to the configured target set.

use std::sync::Arc;

use crate::catalog::CatalogEntry;
use crate::download::{ContainerProvider, Downloader};
use crate::target::TargetRegistry;

use super::types::Job;

/// Builds jobs bound to the full target registry snapshot and the
/// download-container provider.
pub struct JobBuilder {
    registry: TargetRegistry,
    downloader: Arc<dyn Downloader>,
    containers: Arc<dyn ContainerProvider>,
}

impl JobBuilder {
    /// Creates a builder over the given collaborators.
    pub fn new(
        registry: TargetRegistry,
        downloader: Arc<dyn Downloader>,
        containers: Arc<dyn ContainerProvider>,
    ) -> Self {
        Self {
            registry,
            downloader,
            containers,
        }
    }

    /// The registry jobs are bound to.
    pub fn registry(&self) -> &TargetRegistry {
        &self.registry
    }

    /// Builds a job for `entry` bound to the current target snapshot.
    pub fn create_job(&self, entry: CatalogEntry) -> Job {
        Job::new(
            entry,
            self.registry.snapshot(),
            Arc::clone(&self.downloader),
            Arc::clone(&self.containers),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::download::TempDirContainers;
    use crate::testing::{fixtures, MockDownloader};
    use tempfile::TempDir;

    #[test]
    fn test_create_job_snapshots_targets() {
        let dir = TempDir::new().unwrap();
        let registry = TargetRegistry::new(Vec::new());
        let builder = JobBuilder::new(
            registry,
            Arc::new(MockDownloader::new()),
            Arc::new(TempDirContainers::new(dir.path().join("temp"))),
        );
        let job = builder.create_job(fixtures::entry("a", "HASH-A"));
        assert_eq!(job.entry().key_or_hash(), "a");
    }
}
