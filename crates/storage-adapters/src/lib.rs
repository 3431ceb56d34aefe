//! # storage-adapters
//!
//! Implementations of `WishRepository` and `ActionLog`.
//!
//! - [`memory`]: process-local maps, used for development and tests.
//! - [`sqlite`]: durable SQLite tables via sqlx (feature `db-sqlite`).

pub mod memory;

#[cfg(feature = "db-sqlite")]
pub mod sqlite;

pub use memory::{InMemoryActionLog, InMemoryWishRepository};

#[cfg(feature = "db-sqlite")]
pub use sqlite::SqliteStore;
