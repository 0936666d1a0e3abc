//! Application layer - orchestration of the counting logic.
//!
//! This layer coordinates the domain counters and manages runtime behavior:
//! - Admission gate (per-request decisions over the shared counter)
//! - Decay scheduler (periodic counter resets)
//! - Metrics (observability of admission behavior)

pub mod decay;
pub mod gate;
pub mod metrics;
