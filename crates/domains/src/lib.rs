//! # domains
//!
//! Entities, error taxonomy and port traits for the wish board.
//! Nothing in here performs I/O; adapters live in their own crates.

pub mod errors;
pub mod models;
pub mod ports;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use errors::*;
pub use models::*;
pub use ports::*;
