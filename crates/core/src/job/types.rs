//! Job, result and outcome types.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::catalog::CatalogEntry;
use crate::download::{ContainerProvider, DownloadedContent, Downloader};
use crate::history::{HistoryEntry, HistoryFlag};
use crate::target::StorageTarget;

/// Terminal outcome of a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobOutcome {
    /// Downloaded and materialized into at least one target.
    Success,
    /// Every target already had the content; nothing was downloaded.
    Skipped,
    /// The download or every materialization failed.
    Failed,
    /// The remote source reports the content no longer exists.
    NotFound,
}

impl JobOutcome {
    /// True for [`JobOutcome::Success`].
    pub fn successful(&self) -> bool {
        matches!(self, JobOutcome::Success)
    }

    /// Label used in diagnostics and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            JobOutcome::Success => "success",
            JobOutcome::Skipped => "skipped",
            JobOutcome::Failed => "failed",
            JobOutcome::NotFound => "not_found",
        }
    }
}

/// Per-target materialization record.
#[derive(Debug, Clone)]
pub struct TargetOutcome {
    /// Target name.
    pub target: String,
    /// Whether materialization succeeded.
    pub success: bool,
    /// Failure detail, if any.
    pub detail: Option<String>,
}

/// Terminal record of one job.
#[derive(Debug, Clone)]
pub struct JobResult {
    /// Job id, for diagnostics.
    pub job_id: Uuid,
    /// The entry this job handled.
    pub entry: CatalogEntry,
    /// Aggregate outcome.
    pub outcome: JobOutcome,
    /// Downloaded content handle, when a download happened.
    pub download: Option<DownloadedContent>,
    /// Per-target outcomes, in registration order, for targets that
    /// wanted the content.
    pub target_outcomes: Vec<TargetOutcome>,
    /// Completion time.
    pub finished_at: DateTime<Utc>,
}

impl JobResult {
    /// History record for this result.
    pub fn to_history_entry(&self) -> HistoryEntry {
        let flag = match self.outcome {
            JobOutcome::Success => HistoryFlag::Downloaded,
            JobOutcome::Skipped => HistoryFlag::PreExisting,
            JobOutcome::Failed => HistoryFlag::Error,
            JobOutcome::NotFound => HistoryFlag::NotFound,
        };
        HistoryEntry::new(flag, self.entry.to_string())
    }

    /// True when the entry belongs in playlists: everything except
    /// remote-404 results (permanently-gone entries would otherwise pile
    /// up in playlists).
    pub fn playlist_eligible(&self) -> bool {
        self.outcome != JobOutcome::NotFound
    }
}

/// One download-and-distribute unit of work.
///
/// Owned by the job manager from submission to completion; `run` consumes
/// the job and produces its terminal [`JobResult`].
pub struct Job {
    id: Uuid,
    entry: CatalogEntry,
    targets: Vec<Arc<dyn StorageTarget>>,
    downloader: Arc<dyn Downloader>,
    containers: Arc<dyn ContainerProvider>,
}

impl Job {
    pub(crate) fn new(
        entry: CatalogEntry,
        targets: Vec<Arc<dyn StorageTarget>>,
        downloader: Arc<dyn Downloader>,
        containers: Arc<dyn ContainerProvider>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            entry,
            targets,
            downloader,
            containers,
        }
    }

    /// Job id, for diagnostics.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The entry this job handles.
    pub fn entry(&self) -> &CatalogEntry {
        &self.entry
    }

    /// Executes the job to completion. Never panics or escapes an error:
    /// every failure mode folds into the terminal outcome.
    pub async fn run(self) -> JobResult {
        let wanting = self.wanting_targets().await;
        if wanting.is_empty() {
            debug!("Job {}: {} not wanted by any target", self.id, self.entry);
            return self.finish(JobOutcome::Skipped, None, Vec::new());
        }

        let container = match self.containers.allocate(self.entry.key_or_hash()) {
            Ok(container) => container,
            Err(e) => {
                warn!("Job {}: container allocation failed: {}", self.id, e);
                return self.finish(JobOutcome::Failed, None, Vec::new());
            }
        };

        let content = match self.downloader.download(&self.entry, &container).await {
            Ok(content) => content,
            Err(e) if e.is_not_found() => {
                debug!("Job {}: {} gone from remote", self.id, self.entry);
                return self.finish(JobOutcome::NotFound, None, Vec::new());
            }
            Err(e) => {
                warn!("Job {}: download failed for {}: {}", self.id, self.entry, e);
                return self.finish(JobOutcome::Failed, None, Vec::new());
            }
        };

        let mut target_outcomes = Vec::with_capacity(wanting.len());
        for target in &wanting {
            match target.materialize(&content).await {
                Ok(()) => target_outcomes.push(TargetOutcome {
                    target: target.name().to_string(),
                    success: true,
                    detail: None,
                }),
                Err(e) => {
                    warn!(
                        "Job {}: materialization into {} failed: {}",
                        self.id,
                        target.name(),
                        e
                    );
                    target_outcomes.push(TargetOutcome {
                        target: target.name().to_string(),
                        success: false,
                        detail: Some(e.to_string()),
                    });
                }
            }
        }

        let outcome = if target_outcomes.iter().any(|o| o.success) {
            JobOutcome::Success
        } else {
            JobOutcome::Failed
        };
        self.finish(outcome, Some(content), target_outcomes)
    }

    /// Targets that do not yet own the content, in registration order.
    /// A failed lookup counts as wanting; materialization will surface the
    /// real problem.
    async fn wanting_targets(&self) -> Vec<Arc<dyn StorageTarget>> {
        let mut wanting = Vec::new();
        for target in &self.targets {
            match target.has_content(&self.entry.hash).await {
                Ok(true) => {}
                Ok(false) => wanting.push(Arc::clone(target)),
                Err(e) => {
                    warn!(
                        "Job {}: hash lookup failed on {}, assuming wanted: {}",
                        self.id,
                        target.name(),
                        e
                    );
                    wanting.push(Arc::clone(target));
                }
            }
        }
        wanting
    }

    fn finish(
        self,
        outcome: JobOutcome,
        download: Option<DownloadedContent>,
        target_outcomes: Vec<TargetOutcome>,
    ) -> JobResult {
        JobResult {
            job_id: self.id,
            entry: self.entry,
            outcome,
            download,
            target_outcomes,
            finished_at: Utc::now(),
        }
    }
}
