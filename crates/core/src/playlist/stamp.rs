//! Added-time stamps for playlist ordering.
//!
//! Reconciliation must produce deterministic playlist order from
//! non-deterministic job completion order: within one pass, later-processed
//! entries rank first once the playlist is sorted descending by added-time.
//! Wall-clock arithmetic collides under concurrency, so stamps come from a
//! process-wide counter seeded once from the clock; only relative order is
//! meaningful.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;

static NEXT_STAMP_MICROS: Lazy<AtomicI64> =
    Lazy::new(|| AtomicI64::new(Utc::now().timestamp_micros()));

/// Returns a strictly increasing, process-unique added-time stamp.
pub fn next_added_at() -> DateTime<Utc> {
    let micros = NEXT_STAMP_MICROS.fetch_add(1, Ordering::Relaxed);
    DateTime::from_timestamp_micros(micros).unwrap_or_else(Utc::now)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stamps_strictly_increase() {
        let stamps: Vec<_> = (0..100).map(|_| next_added_at()).collect();
        for pair in stamps.windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }
}
