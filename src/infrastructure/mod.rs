//! Infrastructure layer - adapters around the admission core.
//!
//! This layer provides:
//! - Client key extraction from connection data
//! - The admission filter builder and assembly (counter, gate, scheduler)

pub mod filter;
pub mod key;
