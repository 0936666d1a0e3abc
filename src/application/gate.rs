//! Admission decision logic.
//!
//! The gate decides whether requests should be admitted or rejected based on
//! the frequency of their client key in the current decay window.

use crate::application::metrics::Metrics;
use crate::domain::counter::{Counter, FrequencyCounter};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Decision about how to handle a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmissionDecision {
    /// Forward the request to downstream handling
    Admitted,
    /// Terminate the request with an overload outcome
    Rejected,
}

impl AdmissionDecision {
    /// Check if this decision is Admitted.
    pub fn is_admitted(&self) -> bool {
        matches!(self, AdmissionDecision::Admitted)
    }

    /// Check if this decision is Rejected.
    pub fn is_rejected(&self) -> bool {
        matches!(self, AdmissionDecision::Rejected)
    }
}

/// Which requests count toward a client's frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CountingPolicy {
    /// Every checked request counts, including ones ultimately rejected.
    /// Accounting is at-least-once and biased toward over-counting, never
    /// under-throttling actual load.
    #[default]
    AllRequests,
    /// Only admitted requests count; rejected traffic leaves the counter
    /// untouched.
    AdmittedOnly,
}

/// Per-request gatekeeper over a shared frequency counter.
///
/// One counter instance is shared between all request-handling tasks and the
/// decay scheduler. Updates and resets take the write guard, estimates the
/// read guard, so a reset is observed atomically: no operation sees a
/// mixture of pre- and post-reset values. Guard hold times are bounded
/// (O(depth) for the sketch, O(1) amortized per key for the exact map).
#[derive(Debug, Clone)]
pub struct AdmissionGate {
    counter: Arc<RwLock<Counter>>,
    threshold: u64,
    counting_policy: CountingPolicy,
    // variant is fixed for the process lifetime, so cache the short-circuit
    disabled: bool,
    metrics: Metrics,
}

impl AdmissionGate {
    /// Create a new gate over a shared counter.
    ///
    /// # Arguments
    /// * `counter` - The shared frequency counter (also handed to the decay scheduler)
    /// * `threshold` - Max occurrences per decay window before rejection
    /// * `counting_policy` - Which requests count toward the frequency
    /// * `metrics` - Metrics tracker
    pub fn new(
        counter: Arc<RwLock<Counter>>,
        threshold: u64,
        counting_policy: CountingPolicy,
        metrics: Metrics,
    ) -> Self {
        let disabled = read_counter(&counter).is_disabled();
        Self {
            counter,
            threshold,
            counting_policy,
            disabled,
            metrics,
        }
    }

    /// Check a request identified by `key` and decide its outcome.
    ///
    /// With the default [`CountingPolicy::AllRequests`], the occurrence is
    /// recorded before the decision and never rolled back, even if the
    /// request is rejected or the surrounding request is later cancelled.
    ///
    /// Rejection is an intended outcome, not a failure: the caller can
    /// always recover by backing off and retrying in a later decay window.
    pub fn check(&self, key: &str) -> AdmissionDecision {
        if self.disabled {
            self.metrics.record_admitted();
            return AdmissionDecision::Admitted;
        }

        // Update and estimate under one write guard so a concurrent decay
        // reset cannot interleave between a request's update and its query.
        let decision = {
            let mut counter = write_counter(&self.counter);
            match self.counting_policy {
                CountingPolicy::AllRequests => {
                    counter.update(key);
                    if counter.estimate(key) > self.threshold {
                        AdmissionDecision::Rejected
                    } else {
                        AdmissionDecision::Admitted
                    }
                }
                CountingPolicy::AdmittedOnly => {
                    if counter.estimate(key) >= self.threshold {
                        AdmissionDecision::Rejected
                    } else {
                        counter.update(key);
                        AdmissionDecision::Admitted
                    }
                }
            }
        };

        match decision {
            AdmissionDecision::Admitted => {
                self.metrics.record_admitted();
                tracing::debug!(client = key, "request admitted");
            }
            AdmissionDecision::Rejected => {
                self.metrics.record_rejected();
                tracing::warn!(
                    client = key,
                    threshold = self.threshold,
                    "rate limit exceeded, rejecting request"
                );
            }
        }

        decision
    }

    /// Current estimate for `key` without recording an occurrence.
    ///
    /// Multiple concurrent estimates may proceed together under the shared
    /// read guard.
    pub fn estimate(&self, key: &str) -> u64 {
        read_counter(&self.counter).estimate(key)
    }

    /// Zero the shared counter, starting a new decay epoch.
    ///
    /// Called by the decay scheduler on each tick and available for manual
    /// resets. The reset is indivisible with respect to concurrent checks.
    pub fn reset(&self) {
        write_counter(&self.counter).reset();
        self.metrics.record_reset();
    }

    /// Textual dump of the counter state for manual inspection.
    ///
    /// Holds the read guard while formatting; not intended for the
    /// per-request path.
    pub fn dump(&self) -> String {
        read_counter(&self.counter).to_string()
    }

    /// Whether counting is disabled and every request is admitted.
    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// The configured rejection threshold.
    pub fn threshold(&self) -> u64 {
        self.threshold
    }

    /// Get a reference to the metrics.
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }
}

// The counters hold no invariant a panicking guard holder could break (every
// operation leaves the table in a valid state), so recover from poisoning
// instead of propagating it into request handling.
fn read_counter(counter: &Arc<RwLock<Counter>>) -> RwLockReadGuard<'_, Counter> {
    counter.read().unwrap_or_else(PoisonError::into_inner)
}

fn write_counter(counter: &Arc<RwLock<Counter>>) -> RwLockWriteGuard<'_, Counter> {
    counter.write().unwrap_or_else(PoisonError::into_inner)
}
