//! # services
//!
//! Business rules of the wish board, expressed over the ports in `domains`:
//! rate limiting, ownership checks, admin sessions, moderation and statistics.

pub mod admin;
pub mod moderation;
pub mod rate_limiter;
pub mod stats;
pub mod wishes;

pub use admin::{AdminGrant, AdminSession};
pub use moderation::{AdminWishPage, AdminWishView, ModerationService};
pub use rate_limiter::{RateLimitPolicy, RateLimiter};
pub use stats::{StatsAggregator, WishStats};
pub use wishes::{CreateWish, LikeOutcome, WishPage, WishService, WishView};
