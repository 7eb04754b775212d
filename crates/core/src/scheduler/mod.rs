//! Bounded-concurrency job scheduler.
//!
//! The [`JobManager`] accepts jobs from every feed driver and runs them on
//! a fixed-size worker pool: at most `capacity` jobs execute at once, FIFO
//! over submission order. Each accepted job's completion handler is invoked
//! exactly once with the terminal result, before the job's handle resolves,
//! so [`JobManager::complete`] returning implies every handler has run.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{broadcast, mpsc, oneshot, Semaphore};
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, info, warn};

use crate::job::{Job, JobOutcome, JobResult};
use crate::metrics;

/// Error type for scheduler operations.
#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    /// The handle's job was dropped before producing a result.
    #[error("Job handle resolved without a result")]
    HandleDropped,
}

/// Invoked exactly once per accepted job with its terminal result.
///
/// Runs on the worker that executed the job, asynchronously relative to
/// the submission call; implementations must not assume any ordering with
/// the return of [`JobManager::try_post`].
#[async_trait]
pub trait JobCompletionHandler: Send + Sync {
    /// Called once when a job reaches its terminal result.
    async fn on_job_finished(&self, result: &JobResult);
}

/// Handler that does nothing.
pub struct NoopCompletionHandler;

#[async_trait]
impl JobCompletionHandler for NoopCompletionHandler {
    async fn on_job_finished(&self, _result: &JobResult) {}
}

struct QueuedJob {
    job: Job,
    done: oneshot::Sender<Arc<JobResult>>,
}

/// Handle to an accepted job.
pub struct JobHandle {
    rx: oneshot::Receiver<Arc<JobResult>>,
}

impl JobHandle {
    /// Resolves with the job's terminal result, after its completion
    /// handler has run.
    pub async fn wait(self) -> Result<Arc<JobResult>, SchedulerError> {
        self.rx.await.map_err(|_| SchedulerError::HandleDropped)
    }
}

/// Bounded-concurrency scheduler for download jobs.
pub struct JobManager {
    capacity: usize,
    handler: Arc<dyn JobCompletionHandler>,
    accepting: AtomicBool,
    accepted: AtomicUsize,
    tx: Mutex<Option<mpsc::UnboundedSender<QueuedJob>>>,
    dispatcher: Mutex<Option<JoinHandle<()>>>,
    shutdown_tx: broadcast::Sender<()>,
}

impl JobManager {
    /// Creates a manager with the given worker-slot count and completion
    /// handler. Call [`start`] before posting.
    ///
    /// [`start`]: JobManager::start
    pub fn new(capacity: usize, handler: Arc<dyn JobCompletionHandler>) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);
        Self {
            capacity: capacity.max(1),
            handler,
            accepting: AtomicBool::new(false),
            accepted: AtomicUsize::new(0),
            tx: Mutex::new(None),
            dispatcher: Mutex::new(None),
            shutdown_tx,
        }
    }

    /// Configured worker-slot count.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of jobs accepted so far.
    pub fn accepted(&self) -> usize {
        self.accepted.load(Ordering::SeqCst)
    }

    /// Begins accepting work.
    pub fn start(&self) {
        let mut dispatcher = self.dispatcher.lock().unwrap_or_else(|p| p.into_inner());
        if dispatcher.is_some() {
            warn!("Job manager already started");
            return;
        }

        let (tx, rx) = mpsc::unbounded_channel();
        *self.tx.lock().unwrap_or_else(|p| p.into_inner()) = Some(tx);

        let semaphore = Arc::new(Semaphore::new(self.capacity));
        let handler = Arc::clone(&self.handler);
        let shutdown_rx = self.shutdown_tx.subscribe();
        *dispatcher = Some(tokio::spawn(dispatch(rx, semaphore, handler, shutdown_rx)));

        self.accepting.store(true, Ordering::SeqCst);
        info!("Job manager started with {} worker slots", self.capacity);
    }

    /// Posts a job without blocking.
    ///
    /// Returns `None` once the manager is shutting down or was never
    /// started; accepted jobs yield a handle resolving with the terminal
    /// result.
    pub fn try_post(&self, job: Job) -> Option<JobHandle> {
        if !self.accepting.load(Ordering::SeqCst) {
            metrics::JOBS_REJECTED.inc();
            return None;
        }
        let tx = self.tx.lock().unwrap_or_else(|p| p.into_inner());
        let Some(tx) = tx.as_ref() else {
            metrics::JOBS_REJECTED.inc();
            return None;
        };

        let (done, rx) = oneshot::channel();
        if tx.send(QueuedJob { job, done }).is_err() {
            metrics::JOBS_REJECTED.inc();
            return None;
        }
        self.accepted.fetch_add(1, Ordering::SeqCst);
        Some(JobHandle { rx })
    }

    /// Signals terminal shutdown: queued jobs are not started (their
    /// handlers still run, with a failed result), running jobs finish.
    pub fn shutdown(&self) {
        self.accepting.store(false, Ordering::SeqCst);
        let _ = self.shutdown_tx.send(());
        info!("Job manager shutdown signalled");
    }

    /// Stops accepting work and waits until every accepted job has
    /// finished and had its completion handler invoked.
    pub async fn complete(&self) {
        self.accepting.store(false, Ordering::SeqCst);
        // Dropping the sender closes the queue; the dispatcher drains the
        // remainder and then joins its workers.
        self.tx.lock().unwrap_or_else(|p| p.into_inner()).take();

        let dispatcher = self
            .dispatcher
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .take();
        if let Some(dispatcher) = dispatcher {
            if let Err(e) = dispatcher.await {
                warn!("Job dispatcher task failed: {}", e);
            }
        }
        debug!("Job manager drained after {} accepted jobs", self.accepted());
    }
}

/// FIFO dispatcher: pulls queued jobs in submission order and spawns one
/// worker per job, gated on the semaphore so at most `capacity` jobs are
/// executing (not merely queued) at any time.
async fn dispatch(
    mut rx: mpsc::UnboundedReceiver<QueuedJob>,
    semaphore: Arc<Semaphore>,
    handler: Arc<dyn JobCompletionHandler>,
    mut shutdown_rx: broadcast::Receiver<()>,
) {
    let mut workers: JoinSet<()> = JoinSet::new();
    let mut cancelled = false;
    // The shutdown arm disarms itself if the channel closes without a
    // signal, so a dropped manager cannot spin the select loops.
    let mut shutdown_armed = true;

    while !cancelled {
        tokio::select! {
            signal = shutdown_rx.recv(), if shutdown_armed => {
                match signal {
                    Ok(()) => cancelled = true,
                    Err(_) => shutdown_armed = false,
                }
            }
            next = rx.recv() => {
                let Some(queued) = next else { break };
                // Wait for a free slot, still honoring shutdown: a job that
                // has not started when the signal arrives must not start.
                let permit = loop {
                    tokio::select! {
                        signal = shutdown_rx.recv(), if shutdown_armed => {
                            match signal {
                                Ok(()) => break None,
                                Err(_) => shutdown_armed = false,
                            }
                        }
                        permit = Arc::clone(&semaphore).acquire_owned() => {
                            break permit.ok();
                        }
                    }
                };
                match permit {
                    Some(permit) => {
                        let handler = Arc::clone(&handler);
                        workers.spawn(async move {
                            let result = Arc::new(queued.job.run().await);
                            handler.on_job_finished(&result).await;
                            metrics::JOBS_COMPLETED
                                .with_label_values(&[result.outcome.as_str()])
                                .inc();
                            // The batch driver may have given up on the
                            // handle; completion already happened.
                            let _ = queued.done.send(result);
                            drop(permit);
                        });
                    }
                    None => {
                        cancelled = true;
                        finish_unstarted(queued, &handler).await;
                    }
                }
            }
        }
    }

    if cancelled {
        rx.close();
        while let Some(queued) = rx.recv().await {
            finish_unstarted(queued, &handler).await;
        }
    }

    while workers.join_next().await.is_some() {}
}

/// Terminates a job that will never run, preserving the exactly-once
/// handler contract.
async fn finish_unstarted(queued: QueuedJob, handler: &Arc<dyn JobCompletionHandler>) {
    debug!(
        "Job {} cancelled before start: {}",
        queued.job.id(),
        queued.job.entry()
    );
    let result = Arc::new(JobResult {
        job_id: queued.job.id(),
        entry: queued.job.entry().clone(),
        outcome: JobOutcome::Failed,
        download: None,
        target_outcomes: Vec::new(),
        finished_at: Utc::now(),
    });
    handler.on_job_finished(&result).await;
    metrics::JOBS_COMPLETED
        .with_label_values(&[result.outcome.as_str()])
        .inc();
    let _ = queued.done.send(result);
}
