//! Frequency counter abstraction.
//!
//! The admission layer is polymorphic over how request frequencies are
//! tracked. The variant is selected once at startup and never switched at
//! runtime.

use crate::domain::exact::ExactCounter;
use crate::domain::params::SketchParams;
use crate::domain::sketch::SketchCounter;
use std::fmt;

/// Trait for frequency counters.
///
/// All three operations are total, pure, in-memory functions: they cannot
/// fail and accept any string key, including the empty string.
pub trait FrequencyCounter {
    /// Record one occurrence of `key`.
    fn update(&mut self, key: &str);

    /// Current estimate (or exact count) for `key` since the last reset.
    fn estimate(&self, key: &str) -> u64;

    /// Zero all state.
    fn reset(&mut self);
}

/// Counter variant chosen at startup.
#[derive(Debug)]
pub enum Counter {
    /// Approximate counting with bounded memory (count-min sketch)
    Sketch(SketchCounter),
    /// Exact counting, memory grows with distinct keys
    Exact(ExactCounter),
    /// No counting; estimates are always zero
    Disabled,
}

impl Counter {
    /// Create a sketch-backed counter.
    pub fn sketch(params: SketchParams) -> Self {
        Counter::Sketch(SketchCounter::new(params))
    }

    /// Create an exact map-backed counter.
    pub fn exact() -> Self {
        Counter::Exact(ExactCounter::new())
    }

    /// Create a counter that tracks nothing.
    pub fn disabled() -> Self {
        Counter::Disabled
    }

    /// Whether this is the no-op variant.
    pub fn is_disabled(&self) -> bool {
        matches!(self, Counter::Disabled)
    }
}

impl FrequencyCounter for Counter {
    fn update(&mut self, key: &str) {
        match self {
            Counter::Sketch(c) => c.update(key),
            Counter::Exact(c) => c.update(key),
            Counter::Disabled => {}
        }
    }

    fn estimate(&self, key: &str) -> u64 {
        match self {
            Counter::Sketch(c) => c.estimate(key),
            Counter::Exact(c) => c.estimate(key),
            Counter::Disabled => 0,
        }
    }

    fn reset(&mut self) {
        match self {
            Counter::Sketch(c) => c.reset(),
            Counter::Exact(c) => c.reset(),
            Counter::Disabled => {}
        }
    }
}

/// Diagnostic dump of the underlying state.
impl fmt::Display for Counter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Counter::Sketch(c) => c.fmt(f),
            Counter::Exact(c) => c.fmt(f),
            Counter::Disabled => writeln!(f, "counting disabled"),
        }
    }
}
