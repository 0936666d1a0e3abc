//! # floodgate
//!
//! Per-client admission control for request-handling services, backed by
//! approximate frequency counting.
//!
//! Instead of keeping an exact counter per client (unbounded memory in the
//! number of clients), the default configuration tracks request frequencies
//! in a count-min sketch: a fixed `depth × width` table of counters with a
//! one-sided error bound. Estimates may overcount under hash collisions but
//! never undercount, so the filter errs toward throttling heavy traffic,
//! never toward missing it.
//!
//! ## Quick Start
//!
//! ```no_run
//! use floodgate::AdmissionFilter;
//! use std::time::Duration;
//!
//! # #[tokio::main] async fn main() {
//! // Defaults: 5x25 sketch, threshold 20, 60s decay interval
//! let filter = AdmissionFilter::builder().build().unwrap();
//!
//! // Or tune for your traffic:
//! let filter = AdmissionFilter::builder()
//!     .with_sketch_error_bounds(0.01, 0.001) // sized from accuracy targets
//!     .with_threshold(100)
//!     .with_decay_interval(Duration::from_secs(30))
//!     .build()
//!     .unwrap();
//!
//! // On every inbound request:
//! let decision = filter.check(None, "192.0.2.10:43210");
//! if decision.is_rejected() {
//!     // terminate with the hosting protocol's too-many-requests outcome
//! }
//!
//! // On graceful shutdown:
//! filter.shutdown().await.unwrap();
//! # }
//! ```
//!
//! ## Counter Variants
//!
//! The counter variant is chosen once at startup and fixed for the process
//! lifetime:
//!
//! - **Sketch** (default): bounded memory, approximate counts with
//!   one-sided error. Size it directly (`with_sketch_dimensions`) or derive
//!   the dimensions from accuracy targets (`with_sketch_error_bounds`).
//! - **Exact** (`with_exact_counts`): precise counts; memory grows with the
//!   number of distinct client keys seen per decay window. Appropriate when
//!   the key space is bounded or its cost is acceptable.
//! - **Disabled** (`disabled`): no counting, every request admitted, no
//!   background task started.
//!
//! ## Decay
//!
//! Without decay, counts only grow and eventually every client would be
//! throttled. A background task resets the counter at a configured
//! interval; the threshold is therefore a budget *per decay window*. Short
//! intervals forget abuse quickly, long intervals limit more smoothly but
//! recover more slowly. Call [`AdmissionFilter::shutdown`] to stop the task
//! deterministically.
//!
//! ## Client Keys
//!
//! Requests are keyed by a string identity: the trusted forwarded-address
//! header value when the hosting layer supplies one, else the peer address
//! with its port stripped. The pieces are also usable individually; see
//! [`AdmissionGate`] and [`Counter`] for embedding the decision core
//! without the builder.
//!
//! ## Concurrency
//!
//! One counter instance is shared by all request handlers and the decay
//! scheduler. Updates and resets take an exclusive guard, estimates a
//! shared guard; a reset is observed atomically and guard hold times are
//! bounded by the sketch depth. Accounting is at-least-once: a request
//! cancelled after its update is never rolled back.

// Domain layer - pure counting logic
pub mod domain;

// Application layer - orchestration
pub mod application;

// Infrastructure layer - adapters and assembly
pub mod infrastructure;

// Re-export commonly used types for convenience
pub use domain::{
    counter::{Counter, FrequencyCounter},
    exact::ExactCounter,
    params::{SizingError, SketchParams},
    sketch::SketchCounter,
};

pub use application::{
    decay::{DecayConfig, DecayConfigError, DecayHandle, DecayScheduler, ShutdownError},
    gate::{AdmissionDecision, AdmissionGate, CountingPolicy},
    metrics::{Metrics, MetricsSnapshot},
};

pub use infrastructure::{
    filter::{AdmissionFilter, AdmissionFilterBuilder, ConfigError},
    key::client_key,
};
