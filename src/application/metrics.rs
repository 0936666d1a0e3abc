//! Observability metrics for admission control.
//!
//! Provides counters about admission behavior for monitoring and debugging.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Metrics tracking admission statistics.
///
/// All metrics use atomic operations for thread-safe updates and reads, and
/// can be queried at any time without blocking request handling.
#[derive(Debug, Clone)]
pub struct Metrics {
    inner: Arc<MetricsInner>,
}

#[derive(Debug)]
struct MetricsInner {
    /// Total number of requests admitted
    requests_admitted: AtomicU64,
    /// Total number of requests rejected as over-threshold
    requests_rejected: AtomicU64,
    /// Total number of counter resets (scheduled or manual)
    decay_resets: AtomicU64,
}

impl Metrics {
    /// Create a new metrics tracker.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MetricsInner {
                requests_admitted: AtomicU64::new(0),
                requests_rejected: AtomicU64::new(0),
                decay_resets: AtomicU64::new(0),
            }),
        }
    }

    /// Record an admitted request.
    pub(crate) fn record_admitted(&self) {
        self.inner.requests_admitted.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a rejected request.
    pub(crate) fn record_rejected(&self) {
        self.inner.requests_rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a counter reset.
    pub(crate) fn record_reset(&self) {
        self.inner.decay_resets.fetch_add(1, Ordering::Relaxed);
    }

    /// Get the total number of requests admitted.
    pub fn requests_admitted(&self) -> u64 {
        self.inner.requests_admitted.load(Ordering::Relaxed)
    }

    /// Get the total number of requests rejected.
    pub fn requests_rejected(&self) -> u64 {
        self.inner.requests_rejected.load(Ordering::Relaxed)
    }

    /// Get the total number of counter resets.
    pub fn decay_resets(&self) -> u64 {
        self.inner.decay_resets.load(Ordering::Relaxed)
    }

    /// Get a snapshot of all metrics.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            requests_admitted: self.requests_admitted(),
            requests_rejected: self.requests_rejected(),
            decay_resets: self.decay_resets(),
        }
    }

    /// Reset all metrics to zero.
    ///
    /// Useful for testing or when starting a new monitoring period.
    pub fn reset(&self) {
        self.inner.requests_admitted.store(0, Ordering::Relaxed);
        self.inner.requests_rejected.store(0, Ordering::Relaxed);
        self.inner.decay_resets.store(0, Ordering::Relaxed);
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// A point-in-time snapshot of metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Total number of requests admitted
    pub requests_admitted: u64,
    /// Total number of requests rejected
    pub requests_rejected: u64,
    /// Total number of counter resets
    pub decay_resets: u64,
}

impl MetricsSnapshot {
    /// Total number of requests checked.
    pub fn total_requests(&self) -> u64 {
        self.requests_admitted.saturating_add(self.requests_rejected)
    }

    /// Calculate the rejection rate (0.0 to 1.0).
    ///
    /// Returns 0.0 if no requests have been checked.
    pub fn rejection_rate(&self) -> f64 {
        let total = self.total_requests();
        if total == 0 {
            0.0
        } else {
            self.requests_rejected as f64 / total as f64
        }
    }
}
