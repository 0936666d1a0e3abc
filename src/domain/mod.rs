//! Domain layer - pure frequency-counting logic with no external dependencies.
//!
//! This layer contains the core concepts and invariants of the admission
//! control system:
//! - Sketch sizing parameters and their accuracy derivation
//! - The count-min sketch and exact counters
//! - The frequency counter abstraction the rest of the crate works against
//!
//! All types in this layer are pure and easily testable.

pub mod counter;
pub mod exact;
pub mod params;
pub mod sketch;
