//! Count-min sketch frequency counter.
//!
//! A fixed `depth × width` table of counters indexed by `depth` independent
//! hash rows. Updates increment one cell per row; queries take the minimum
//! across rows, which suppresses any single row's collisions and yields the
//! tightest achievable upper bound. Estimates never undercount: for any key,
//! `estimate(key)` is at least the number of `update(key)` calls since the
//! last reset.

use crate::domain::params::SketchParams;
use ahash::RandomState;
use std::fmt;

// Fixed base seeds so row hashes are deterministic across processes. Each
// row mixes its index into the final seed; rows must hash independently or
// the min-of-rows error bound no longer holds.
const SEED_A: u64 = 0x9e37_79b9_7f4a_7c15;
const SEED_B: u64 = 0x6a09_e667_f3bc_c908;
const SEED_C: u64 = 0xbb67_ae85_84ca_a73b;
const SEED_D: u64 = 0x3c6e_f372_fe94_f82b;

/// Approximate frequency counter with bounded memory and one-sided error.
pub struct SketchCounter {
    rows: Vec<RandomState>,
    width: usize,
    // row-major, depth * width cells
    table: Vec<u64>,
}

impl SketchCounter {
    /// Create a zeroed sketch with the given dimensions.
    pub fn new(params: SketchParams) -> Self {
        let rows = (0..params.depth())
            .map(|row| RandomState::with_seeds(SEED_A, SEED_B, SEED_C, SEED_D ^ row as u64))
            .collect();
        Self {
            rows,
            width: params.width(),
            table: vec![0; params.cells()],
        }
    }

    /// Record one occurrence of `key`.
    pub fn update(&mut self, key: &str) {
        for (row, hasher) in self.rows.iter().enumerate() {
            let col = (hasher.hash_one(key) as usize) % self.width;
            let cell = &mut self.table[row * self.width + col];
            *cell = cell.saturating_add(1);
        }
    }

    /// Estimate the number of occurrences of `key` since the last reset.
    ///
    /// Total over any string, including the empty string. May overestimate
    /// due to collisions; never underestimates.
    pub fn estimate(&self, key: &str) -> u64 {
        self.rows
            .iter()
            .enumerate()
            .fold(u64::MAX, |min, (row, hasher)| {
                let col = (hasher.hash_one(key) as usize) % self.width;
                min.min(self.table[row * self.width + col])
            })
    }

    /// Zero every cell.
    pub fn reset(&mut self) {
        self.table.fill(0);
    }

    /// Number of hash rows.
    pub fn depth(&self) -> usize {
        self.rows.len()
    }

    /// Number of counters per row.
    pub fn width(&self) -> usize {
        self.width
    }
}

/// Grid dump of the table for manual inspection. Not intended for the
/// per-request path.
impl fmt::Display for SketchCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\t: ")?;
        for col in 0..self.width {
            write!(f, "{}\t", col)?;
        }
        writeln!(f)?;
        for row in 0..self.rows.len() {
            write!(f, "h{}\t: ", row)?;
            for col in 0..self.width {
                write!(f, "{}\t", self.table[row * self.width + col])?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl fmt::Debug for SketchCounter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SketchCounter")
            .field("depth", &self.rows.len())
            .field("width", &self.width)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sketch(depth: usize, width: usize) -> SketchCounter {
        SketchCounter::new(SketchParams::new(depth, width).unwrap())
    }

    #[test]
    fn test_repeated_updates_counted() {
        // 3x4 sketch, five updates of one key on an otherwise empty table
        let mut cms = sketch(3, 4);
        for _ in 0..5 {
            cms.update("user_123");
        }
        assert_eq!(cms.estimate("user_123"), 5);
    }

    #[test]
    fn test_unseen_key_is_zero_on_empty_sketch() {
        let cms = sketch(3, 16);
        assert_eq!(cms.estimate("never_seen"), 0);
    }

    #[test]
    fn test_empty_string_is_a_valid_key() {
        let mut cms = sketch(3, 16);
        cms.update("");
        cms.update("");
        assert_eq!(cms.estimate(""), 2);
    }

    #[test]
    fn test_never_underestimates() {
        let mut cms = sketch(2, 4); // tiny table forces collisions
        let keys = ["a", "b", "c", "d", "e", "f", "g", "h"];
        for (i, key) in keys.iter().enumerate() {
            for _ in 0..=i {
                cms.update(key);
            }
        }
        for (i, key) in keys.iter().enumerate() {
            let truth = (i + 1) as u64;
            assert!(
                cms.estimate(key) >= truth,
                "estimate for {} fell below true count {}",
                key,
                truth
            );
        }
    }

    #[test]
    fn test_monotonic_between_resets() {
        let mut cms = sketch(3, 8);
        let mut previous = 0;
        for _ in 0..50 {
            cms.update("client");
            let current = cms.estimate("client");
            assert!(current >= previous);
            previous = current;
        }
    }

    #[test]
    fn test_reset_zeroes_everything() {
        let mut cms = sketch(3, 8);
        for key in ["a", "b", "c"] {
            for _ in 0..10 {
                cms.update(key);
            }
        }
        cms.reset();
        for key in ["a", "b", "c", ""] {
            assert_eq!(cms.estimate(key), 0);
        }
    }

    #[test]
    fn test_counting_resumes_after_reset() {
        let mut cms = sketch(3, 8);
        for _ in 0..7 {
            cms.update("x");
        }
        cms.reset();
        cms.update("x");
        assert_eq!(cms.estimate("x"), 1);
    }

    #[test]
    fn test_rows_hash_independently() {
        // If every row used the same hash, two keys colliding in one row
        // would collide in all of them. With a wide table and independent
        // rows, distinct keys land apart often enough that estimates stay
        // exact here.
        let mut cms = sketch(4, 1024);
        cms.update("alpha");
        cms.update("alpha");
        cms.update("beta");
        assert_eq!(cms.estimate("alpha"), 2);
        assert_eq!(cms.estimate("beta"), 1);
    }

    #[test]
    fn test_deterministic_across_instances() {
        let mut first = sketch(3, 32);
        let mut second = sketch(3, 32);
        for key in ["a", "b", "a", "c", "a"] {
            first.update(key);
            second.update(key);
        }
        for key in ["a", "b", "c", "d"] {
            assert_eq!(first.estimate(key), second.estimate(key));
        }
    }

    #[test]
    fn test_display_grid_shape() {
        let mut cms = sketch(2, 3);
        cms.update("k");
        let dump = cms.to_string();
        // header line plus one line per hash row
        assert_eq!(dump.lines().count(), 3);
        assert!(dump.contains("h0"));
        assert!(dump.contains("h1"));
    }
}
