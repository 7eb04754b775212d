//! Types for the sync orchestrator.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ConfigError;
use crate::job::JobOutcome;

/// Errors that can occur while assembling or running the pipeline.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A required collaborator was not supplied to the builder.
    #[error("missing collaborator: {0}")]
    MissingCollaborator(&'static str),
}

/// Per-driver tally, merged into the run's [`SyncSummary`].
#[derive(Debug, Clone, Default)]
pub struct DriverReport {
    /// Sub-feed fetches that succeeded.
    pub feeds_fetched: usize,
    /// Sub-feed fetches that failed and were skipped.
    pub feeds_failed: usize,
    /// Terminal outcome of every job the driver awaited.
    pub outcomes: Vec<JobOutcome>,
}

/// Aggregate result of one sync run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SyncSummary {
    /// Sub-feed fetches that succeeded.
    pub feeds_fetched: usize,
    /// Sub-feed fetches that failed and were skipped.
    pub feeds_failed: usize,
    /// Jobs that downloaded and materialized content.
    pub jobs_success: usize,
    /// Jobs skipped because every target already owned the content.
    pub jobs_skipped: usize,
    /// Jobs that failed.
    pub jobs_failed: usize,
    /// Jobs whose content was gone from the remote source.
    pub jobs_not_found: usize,
}

impl SyncSummary {
    /// Folds one driver's tally into the summary.
    pub fn absorb(&mut self, report: &DriverReport) {
        self.feeds_fetched += report.feeds_fetched;
        self.feeds_failed += report.feeds_failed;
        for outcome in &report.outcomes {
            match outcome {
                JobOutcome::Success => self.jobs_success += 1,
                JobOutcome::Skipped => self.jobs_skipped += 1,
                JobOutcome::Failed => self.jobs_failed += 1,
                JobOutcome::NotFound => self.jobs_not_found += 1,
            }
        }
    }

    /// Total jobs awaited across all drivers.
    pub fn jobs_total(&self) -> usize {
        self.jobs_success + self.jobs_skipped + self.jobs_failed + self.jobs_not_found
    }
}
