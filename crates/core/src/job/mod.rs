//! Download jobs: one unit of work binding a catalog entry to every
//! configured storage target.

mod builder;
mod types;

pub use builder::JobBuilder;
pub use types::{Job, JobOutcome, JobResult, TargetOutcome};
