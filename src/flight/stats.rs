//! Flight Statistics Module
//!
//! Counts how lookups were satisfied.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use super::Outcome;

/// Lock-free counters shared by every clone of a coordinator.
#[derive(Debug, Default)]
pub struct FlightStats {
    hits: AtomicU64,
    fetched: AtomicU64,
    coalesced: AtomicU64,
    fallback_fetched: AtomicU64,
    fetch_errors: AtomicU64,
}

/// Point-in-time copy of [`FlightStats`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FlightStatsSnapshot {
    /// Served straight from the data slot
    pub hits: u64,
    /// Fetched by the caller that claimed the key
    pub fetched: u64,
    /// Served to a waiter from the claimant's result
    pub coalesced: u64,
    /// Fetched by a waiter whose deadline passed
    pub fallback_fetched: u64,
    /// Upstream fetches that returned an error
    pub fetch_errors: u64,
}

impl FlightStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record(&self, outcome: Outcome) {
        let counter = match outcome {
            Outcome::Hit => &self.hits,
            Outcome::Fetched => &self.fetched,
            Outcome::Coalesced => &self.coalesced,
            Outcome::FallbackFetched => &self.fallback_fetched,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_fetch_error(&self) {
        self.fetch_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> FlightStatsSnapshot {
        FlightStatsSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            fetched: self.fetched.load(Ordering::Relaxed),
            coalesced: self.coalesced.load(Ordering::Relaxed),
            fallback_fetched: self.fallback_fetched.load(Ordering::Relaxed),
            fetch_errors: self.fetch_errors.load(Ordering::Relaxed),
        }
    }
}

impl FlightStatsSnapshot {
    /// Total upstream calls, successful or not.
    pub fn upstream_calls(&self) -> u64 {
        self.fetched + self.fallback_fetched + self.fetch_errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_each_outcome() {
        let stats = FlightStats::new();
        stats.record(Outcome::Hit);
        stats.record(Outcome::Hit);
        stats.record(Outcome::Fetched);
        stats.record(Outcome::Coalesced);
        stats.record(Outcome::FallbackFetched);
        stats.record_fetch_error();

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.hits, 2);
        assert_eq!(snapshot.fetched, 1);
        assert_eq!(snapshot.coalesced, 1);
        assert_eq!(snapshot.fallback_fetched, 1);
        assert_eq!(snapshot.fetch_errors, 1);
        assert_eq!(snapshot.upstream_calls(), 3);
    }
}
