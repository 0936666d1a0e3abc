//! Admission filter assembly.
//!
//! Wires the shared counter, the admission gate and the decay scheduler
//! together behind a builder with validated configuration. This is the type
//! a hosting server embeds in front of its request handling.

use crate::application::{
    decay::{DecayConfig, DecayConfigError, DecayHandle, DecayScheduler, ShutdownError},
    gate::{AdmissionDecision, AdmissionGate, CountingPolicy},
    metrics::Metrics,
};
use crate::domain::counter::Counter;
use crate::domain::params::{SizingError, SketchParams};
use crate::infrastructure::key::client_key;

use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

/// Error returned when building an `AdmissionFilter` fails.
///
/// Configuration errors surface at startup; the filter refuses to start
/// rather than run silently misconfigured.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Sketch sizing validation failed
    Sizing(SizingError),
    /// Threshold must be greater than zero
    ZeroThreshold,
    /// Decay configuration validation failed
    Decay(DecayConfigError),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Sizing(e) => write!(f, "sketch sizing error: {}", e),
            ConfigError::ZeroThreshold => write!(f, "threshold must be greater than 0"),
            ConfigError::Decay(e) => write!(f, "decay configuration error: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<SizingError> for ConfigError {
    fn from(e: SizingError) -> Self {
        ConfigError::Sizing(e)
    }
}

impl From<DecayConfigError> for ConfigError {
    fn from(e: DecayConfigError) -> Self {
        ConfigError::Decay(e)
    }
}

/// How the sketch is sized; resolved and validated at build time.
#[derive(Debug, Clone, Copy)]
enum SketchSizing {
    Default,
    Dimensions { depth: usize, width: usize },
    ErrorBounds { certainty: f64, error_margin: f64 },
}

/// Counter variant selection; fixed once the filter is built.
#[derive(Debug, Clone, Copy)]
enum CounterChoice {
    Sketch(SketchSizing),
    Exact,
    Disabled,
}

/// Builder for constructing an [`AdmissionFilter`].
#[derive(Debug)]
pub struct AdmissionFilterBuilder {
    variant: CounterChoice,
    threshold: u64,
    decay_interval: Duration,
    counting_policy: CountingPolicy,
}

impl AdmissionFilterBuilder {
    /// Track frequencies approximately with a default-sized sketch.
    pub fn with_sketch(mut self) -> Self {
        self.variant = CounterChoice::Sketch(SketchSizing::Default);
        self
    }

    /// Track frequencies approximately with an explicitly sized sketch.
    ///
    /// Dimensions are validated when `build()` is called.
    pub fn with_sketch_dimensions(mut self, depth: usize, width: usize) -> Self {
        self.variant = CounterChoice::Sketch(SketchSizing::Dimensions { depth, width });
        self
    }

    /// Track frequencies approximately with a sketch sized from accuracy
    /// targets (see [`SketchParams::from_error_bounds`]).
    ///
    /// Bounds are validated when `build()` is called.
    pub fn with_sketch_error_bounds(mut self, certainty: f64, error_margin: f64) -> Self {
        self.variant = CounterChoice::Sketch(SketchSizing::ErrorBounds {
            certainty,
            error_margin,
        });
        self
    }

    /// Track frequencies exactly. Memory grows with the number of distinct
    /// client keys observed per decay window.
    pub fn with_exact_counts(mut self) -> Self {
        self.variant = CounterChoice::Exact;
        self
    }

    /// Disable counting entirely: every request is admitted, no counter is
    /// allocated and no decay scheduler is started.
    pub fn disabled(mut self) -> Self {
        self.variant = CounterChoice::Disabled;
        self
    }

    /// Set the max occurrences per decay window before rejection.
    ///
    /// Validated when `build()` is called.
    pub fn with_threshold(mut self, threshold: u64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Set the decay interval (the length of one counting epoch).
    ///
    /// Validated when `build()` is called.
    pub fn with_decay_interval(mut self, interval: Duration) -> Self {
        self.decay_interval = interval;
        self
    }

    /// Set which requests count toward a client's frequency.
    pub fn with_counting_policy(mut self, policy: CountingPolicy) -> Self {
        self.counting_policy = policy;
        self
    }

    /// Build the filter and start its decay scheduler.
    ///
    /// Must be called within a tokio runtime unless the filter is disabled:
    /// the decay scheduler is spawned here so the filter arrives running.
    ///
    /// # Errors
    /// Returns `ConfigError` if the configuration is invalid.
    pub fn build(self) -> Result<AdmissionFilter, ConfigError> {
        if self.threshold == 0 {
            return Err(ConfigError::ZeroThreshold);
        }
        let decay_config = DecayConfig::new(self.decay_interval)?;

        let counter = match self.variant {
            CounterChoice::Sketch(sizing) => {
                let params = match sizing {
                    SketchSizing::Default => SketchParams::default(),
                    SketchSizing::Dimensions { depth, width } => SketchParams::new(depth, width)?,
                    SketchSizing::ErrorBounds {
                        certainty,
                        error_margin,
                    } => SketchParams::from_error_bounds(certainty, error_margin)?,
                };
                tracing::info!(
                    depth = params.depth(),
                    width = params.width(),
                    threshold = self.threshold,
                    "starting admission filter with sketch counting"
                );
                Counter::sketch(params)
            }
            CounterChoice::Exact => {
                tracing::info!(
                    threshold = self.threshold,
                    "starting admission filter with exact counting"
                );
                Counter::exact()
            }
            CounterChoice::Disabled => {
                tracing::warn!("admission filter disabled, all requests will be admitted");
                Counter::disabled()
            }
        };

        let gate = AdmissionGate::new(
            Arc::new(RwLock::new(counter)),
            self.threshold,
            self.counting_policy,
            Metrics::new(),
        );

        let decay_handle = if gate.is_disabled() {
            None
        } else {
            Some(DecayScheduler::new(gate.clone(), decay_config).start())
        };

        Ok(AdmissionFilter {
            gate,
            decay_handle: Arc::new(Mutex::new(decay_handle)),
        })
    }
}

impl Default for AdmissionFilterBuilder {
    fn default() -> Self {
        Self {
            variant: CounterChoice::Sketch(SketchSizing::Default),
            threshold: 20,
            decay_interval: Duration::from_secs(60),
            counting_policy: CountingPolicy::default(),
        }
    }
}

/// Per-request gatekeeper for a request-handling service.
///
/// Every inbound request passes through [`check`](AdmissionFilter::check):
/// the client key is derived, the shared counter updated and queried, and
/// the request either forwarded unchanged or terminated with an overload
/// outcome. A background decay scheduler zeroes the counter each epoch so
/// throttled clients recover once their traffic subsides.
///
/// The filter is cheaply cloneable; clones share the counter, metrics and
/// scheduler.
///
/// # Example
/// ```no_run
/// use floodgate::AdmissionFilter;
/// use std::time::Duration;
///
/// # #[tokio::main] async fn main() {
/// let filter = AdmissionFilter::builder()
///     .with_sketch_dimensions(5, 25)
///     .with_threshold(20)
///     .with_decay_interval(Duration::from_secs(60))
///     .build()
///     .unwrap();
///
/// let decision = filter.check(None, "192.0.2.10:43210");
/// if decision.is_rejected() {
///     // respond with the hosting protocol's too-many-requests outcome
/// }
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct AdmissionFilter {
    gate: AdmissionGate,
    decay_handle: Arc<Mutex<Option<DecayHandle>>>,
}

impl AdmissionFilter {
    /// Create a builder for configuring the filter.
    ///
    /// Defaults:
    /// - Counter: sketch, 5 rows of 25 counters
    /// - Threshold: 20 occurrences per decay window
    /// - Decay interval: 60 seconds
    /// - Counting policy: all checked requests count
    pub fn builder() -> AdmissionFilterBuilder {
        AdmissionFilterBuilder::default()
    }

    /// Check a request and decide its outcome.
    ///
    /// # Arguments
    /// * `forwarded_for` - Trusted forwarded-address header value, if any
    /// * `peer_addr` - The transport peer address
    pub fn check(&self, forwarded_for: Option<&str>, peer_addr: &str) -> AdmissionDecision {
        let key = client_key(forwarded_for, peer_addr);
        self.gate.check(&key)
    }

    /// Check a request by an already-derived client key.
    pub fn check_key(&self, key: &str) -> AdmissionDecision {
        self.gate.check(key)
    }

    /// Current estimate for a client key without recording an occurrence.
    pub fn estimate(&self, key: &str) -> u64 {
        self.gate.estimate(key)
    }

    /// Manually zero the counter, starting a fresh decay epoch.
    pub fn reset_counts(&self) {
        self.gate.reset();
    }

    /// Textual dump of the counter state for manual inspection only.
    pub fn dump_counter(&self) -> String {
        self.gate.dump()
    }

    /// Get a reference to the metrics.
    pub fn metrics(&self) -> &Metrics {
        self.gate.metrics()
    }

    /// Get a reference to the underlying gate.
    pub fn gate(&self) -> &AdmissionGate {
        &self.gate
    }

    /// Stop the decay scheduler, if running.
    ///
    /// Gracefully stops the background reset task. Does nothing if the
    /// filter is disabled or has already been shut down.
    ///
    /// # Errors
    /// Returns an error if the scheduler task fails to exit cleanly.
    pub async fn shutdown(&self) -> Result<(), ShutdownError> {
        // take the handle while holding the lock, then release before awaiting
        let handle = {
            let mut guard = self
                .decay_handle
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            guard.take()
        };

        if let Some(handle) = handle {
            handle.shutdown().await?;
        }
        Ok(())
    }
}
