//! # DomainError
//!
//! Centralized error handling for the wish board.
//! Every failure a caller can observe maps to exactly one variant here.

use thiserror::Error;

use crate::models::{ActionKind, WishId};

/// The primary error type for all domain and service operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The client exhausted its quota for this action in the current window.
    #[error("too many {0} requests, slow down")]
    RateLimited(ActionKind),

    /// Wish id does not resolve to a stored wish.
    #[error("wish {0} not found")]
    NotFound(WishId),

    /// Ownership mismatch on an owner-initiated delete.
    #[error("you can only delete your own wishes")]
    Forbidden,

    /// Missing or invalid admin credential.
    #[error("administrator credentials required")]
    Unauthorized,

    /// The admin subsystem is not configured.
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Infrastructure failure (e.g., DB down). Never retried internally.
    #[error("storage error: {0}")]
    Storage(String),
}

impl DomainError {
    /// Wraps any displayable infrastructure error as [`DomainError::Storage`].
    pub fn storage(err: impl std::fmt::Display) -> Self {
        Self::Storage(err.to_string())
    }
}

/// A specialized Result type for wish board logic.
pub type Result<T> = std::result::Result<T, DomainError>;
