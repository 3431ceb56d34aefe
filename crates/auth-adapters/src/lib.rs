//! # auth-adapters
//!
//! Admin session plumbing: random bearer tokens and the live-token store.

pub mod session_store;
pub mod token;

pub use session_store::InMemorySessionStore;
pub use token::RandomTokenGenerator;
