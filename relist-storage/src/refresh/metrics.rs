//! Counters for refresh rounds.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters maintained by a [`RefreshingLister`](super::RefreshingLister).
///
/// All counters use relaxed ordering; they are observability only.
#[derive(Debug, Default)]
pub struct RefreshMetrics {
    /// Total list-or-refresh rounds started
    pub rounds: AtomicU64,

    /// Rounds that skipped scanning because the namespace was checked
    pub skipped_scans: AtomicU64,

    /// Rounds that scanned items for divergence
    pub scans: AtomicU64,

    /// Direct authoritative reads issued by the detector
    pub direct_gets: AtomicU64,

    /// Scans that found an item whose status diverged
    pub divergences_detected: AtomicU64,

    /// Scans stopped by a failed direct read
    pub verification_errors: AtomicU64,

    /// Cache-bypassing re-lists issued
    pub refreshes: AtomicU64,

    /// Cache-bypassing re-lists that failed
    pub refresh_failures: AtomicU64,

    /// Initial lists that failed
    pub list_failures: AtomicU64,
}

impl RefreshMetrics {
    /// Create new metrics instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get current snapshot of all metrics.
    pub fn snapshot(&self) -> RefreshMetricsSnapshot {
        RefreshMetricsSnapshot {
            rounds: self.rounds.load(Ordering::Relaxed),
            skipped_scans: self.skipped_scans.load(Ordering::Relaxed),
            scans: self.scans.load(Ordering::Relaxed),
            direct_gets: self.direct_gets.load(Ordering::Relaxed),
            divergences_detected: self.divergences_detected.load(Ordering::Relaxed),
            verification_errors: self.verification_errors.load(Ordering::Relaxed),
            refreshes: self.refreshes.load(Ordering::Relaxed),
            refresh_failures: self.refresh_failures.load(Ordering::Relaxed),
            list_failures: self.list_failures.load(Ordering::Relaxed),
        }
    }

    pub(crate) fn incr(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

/// Snapshot of refresh metrics at a point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshMetricsSnapshot {
    pub rounds: u64,
    pub skipped_scans: u64,
    pub scans: u64,
    pub direct_gets: u64,
    pub divergences_detected: u64,
    pub verification_errors: u64,
    pub refreshes: u64,
    pub refresh_failures: u64,
    pub list_failures: u64,
}
