//! Exact per-key frequency counter.
//!
//! Precise counterpart to the sketch: a plain map from key to count. Memory
//! grows with the number of distinct keys observed rather than with a fixed
//! configuration, so this variant suits deployments where the key space
//! (typically client addresses) is bounded or its cost is acceptable.

use ahash::RandomState;
use std::collections::HashMap;
use std::fmt;

/// Exact frequency counter, unbounded in key cardinality.
#[derive(Debug, Default)]
pub struct ExactCounter {
    counts: HashMap<String, u64, RandomState>,
}

impl ExactCounter {
    /// Create an empty counter.
    pub fn new() -> Self {
        Self {
            counts: HashMap::default(),
        }
    }

    /// Record one occurrence of `key`.
    pub fn update(&mut self, key: &str) {
        let count = self.counts.entry(key.to_string()).or_insert(0);
        *count = count.saturating_add(1);
    }

    /// Exact number of occurrences of `key` since the last reset.
    pub fn estimate(&self, key: &str) -> u64 {
        self.counts.get(key).copied().unwrap_or(0)
    }

    /// Clear the whole mapping.
    pub fn reset(&mut self) {
        self.counts.clear();
    }

    /// Number of distinct keys currently tracked.
    pub fn distinct_keys(&self) -> usize {
        self.counts.len()
    }
}

/// Key/count listing for manual inspection, sorted for stable output.
impl fmt::Display for ExactCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut entries: Vec<_> = self.counts.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        for (key, count) in entries {
            writeln!(f, "{}: {}", key, count)?;
        }
        Ok(())
    }
}
