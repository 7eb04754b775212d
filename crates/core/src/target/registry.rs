//! Read-only registry of configured storage targets.

use std::sync::Arc;

use super::traits::StorageTarget;

/// The set of configured storage targets.
///
/// Built once at startup and read-only afterwards; jobs and the reconciler
/// hold clones of the inner `Arc`s.
#[derive(Clone)]
pub struct TargetRegistry {
    targets: Arc<Vec<Arc<dyn StorageTarget>>>,
}

impl TargetRegistry {
    /// Builds a registry from the configured targets.
    pub fn new(targets: Vec<Arc<dyn StorageTarget>>) -> Self {
        Self {
            targets: Arc::new(targets),
        }
    }

    /// Targets in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn StorageTarget>> {
        self.targets.iter()
    }

    /// Snapshot of the targets, for binding into a job.
    pub fn snapshot(&self) -> Vec<Arc<dyn StorageTarget>> {
        self.targets.to_vec()
    }

    /// Number of configured targets.
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// True when no targets are configured.
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}
