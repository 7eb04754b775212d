//! Sync orchestrator: drives every configured source through fetch, job
//! submission, batch reconciliation and the final flush.

mod runner;
mod types;

pub use runner::{PipelineBuilder, SourceDriver, SyncOrchestrator};
pub use types::{DriverReport, OrchestratorError, SyncSummary};
