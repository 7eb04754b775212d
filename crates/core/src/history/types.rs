//! Types for the history module.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome class recorded for a handled content hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryFlag {
    /// Content was downloaded and materialized into at least one target.
    Downloaded,
    /// Every target already had the content.
    PreExisting,
    /// The download or every materialization failed.
    Error,
    /// The remote source no longer has the content.
    NotFound,
}

/// One history record: outcome plus a human-readable description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Outcome class.
    pub flag: HistoryFlag,
    /// Human-readable description of the entry (title, key).
    pub description: String,
    /// When the record was written.
    pub added_at: DateTime<Utc>,
}

impl HistoryEntry {
    /// Creates an entry stamped with the current time.
    pub fn new(flag: HistoryFlag, description: impl Into<String>) -> Self {
        Self {
            flag,
            description: description.into(),
            added_at: Utc::now(),
        }
    }
}
