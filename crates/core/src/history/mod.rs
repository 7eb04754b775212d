//! Per-target download history.
//!
//! Each history-capable target owns one [`HistoryStore`]: a persistent map
//! from content hash to the recorded outcome of the first job that handled
//! that hash. The store guards against re-attempting known-bad or
//! already-handled entries on later runs.

mod error;
mod store;
mod types;

pub use error::HistoryError;
pub use store::HistoryStore;
pub use types::{HistoryEntry, HistoryFlag};
