//! # Core Traits (Ports)
//!
//! Any adapter must implement these traits to be wired into the binary.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::errors::Result;
use crate::models::{
    ActionKind, ActionRecord, ClientId, NewWish, Page, Visibility, Wish, WishId, WishTag,
};

/// Source of "now". Injected so that windows and day boundaries are testable.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// One page of wishes plus the number of wishes matching the filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Listing {
    pub wishes: Vec<Wish>,
    pub total: u64,
}

/// Counts for one tag over every stored wish, hidden or not.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TagTotals {
    pub wishes: u64,
    pub likes: u64,
    /// Wishes created at or after the `since` bound of the query.
    pub recent: u64,
}

/// Persistence contract for wishes.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait WishRepository: Send + Sync {
    /// Stores a wish and assigns it the next id.
    async fn insert(&self, wish: NewWish) -> Result<Wish>;

    async fn get(&self, id: WishId) -> Result<Option<Wish>>;

    /// Newest first (creation time, then id, both descending).
    async fn list(&self, visibility: Visibility, page: Page) -> Result<Listing>;

    /// Adds one like in a single store operation and returns the new count,
    /// or `None` when the wish does not exist.
    async fn increment_likes(&self, id: WishId) -> Result<Option<u64>>;

    /// Returns `false` when the wish does not exist.
    async fn set_hidden(&self, id: WishId, hidden: bool) -> Result<bool>;

    /// Permanently removes a wish. Returns `false` when it did not exist.
    async fn delete(&self, id: WishId) -> Result<bool>;

    /// Per-tag totals, hidden wishes included. Tags with no wishes may be absent.
    async fn aggregate(&self, since: DateTime<Utc>) -> Result<HashMap<WishTag, TagTotals>>;
}

/// Append-only log backing the sliding-window rate limiter.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ActionLog: Send + Sync {
    async fn append(&self, record: ActionRecord) -> Result<()>;

    /// Number of records for this exact (client, action) pair at or after `since`.
    async fn count_since(
        &self,
        client_id: &ClientId,
        action: ActionKind,
        since: DateTime<Utc>,
    ) -> Result<u64>;

    /// Drops records strictly older than `cutoff`; returns how many were removed.
    async fn purge_before(&self, cutoff: DateTime<Utc>) -> Result<u64>;
}

/// Live set of issued admin tokens.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// `expires_at = None` keeps the token until logout or restart.
    async fn insert(&self, token: String, expires_at: Option<DateTime<Utc>>) -> Result<()>;

    /// True when the token is present and not expired at `now`.
    async fn is_live(&self, token: &str, now: DateTime<Utc>) -> Result<bool>;

    /// Returns whether a token was actually removed.
    async fn remove(&self, token: &str) -> Result<bool>;

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64>;
}

/// Produces fresh, high-entropy bearer tokens.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait TokenGenerator: Send + Sync {
    fn generate(&self) -> Result<String>;
}
