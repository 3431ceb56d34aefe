//! Sliding-window rate limiter.
//!
//! Counts [`ActionRecord`]s per (client, action) inside a trailing window.
//! Checking and recording are separate calls made by the caller in sequence,
//! so concurrent requests from one client may overshoot a quota slightly.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use domains::{ActionKind, ActionLog, ActionRecord, ClientId, Clock, Result};
use tracing::{debug, info};

/// Quotas for the two throttled actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    pub window: Duration,
    pub create_limit: u32,
    pub like_limit: u32,
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self {
            window: Duration::hours(1),
            create_limit: 10,
            like_limit: 50,
        }
    }
}

impl RateLimitPolicy {
    pub fn limit_for(&self, action: ActionKind) -> u32 {
        match action {
            ActionKind::Create => self.create_limit,
            ActionKind::Like => self.like_limit,
        }
    }
}

pub struct RateLimiter {
    log: Arc<dyn ActionLog>,
    clock: Arc<dyn Clock>,
    policy: RateLimitPolicy,
}

impl RateLimiter {
    pub fn new(log: Arc<dyn ActionLog>, clock: Arc<dyn Clock>, policy: RateLimitPolicy) -> Self {
        Self { log, clock, policy }
    }

    pub fn policy(&self) -> &RateLimitPolicy {
        &self.policy
    }

    /// [`RateLimiter::allow`] with the policy's quota for `action`.
    pub async fn allow_action(&self, client_id: Option<&ClientId>, action: ActionKind) -> Result<bool> {
        self.allow(client_id, action, self.policy.limit_for(action)).await
    }

    /// True iff fewer than `limit` actions of this kind were recorded for the
    /// client within the window. Anonymous traffic is never throttled.
    pub async fn allow(
        &self,
        client_id: Option<&ClientId>,
        action: ActionKind,
        limit: u32,
    ) -> Result<bool> {
        let Some(client_id) = client_id else {
            return Ok(true);
        };

        let since = self.window_start();
        let count = self.log.count_since(client_id, action, since).await?;
        let allowed = count < u64::from(limit);

        if allowed {
            debug!(client = %client_id.redacted(), %action, count, limit, "rate limit check passed");
        } else {
            info!(client = %client_id.redacted(), %action, count, limit, "rate limit exceeded");
        }
        Ok(allowed)
    }

    /// Appends an action to the log. No-op for anonymous callers.
    pub async fn record(&self, client_id: Option<&ClientId>, action: ActionKind) -> Result<()> {
        let Some(client_id) = client_id else {
            return Ok(());
        };

        self.log
            .append(ActionRecord {
                client_id: client_id.clone(),
                action,
                at: self.clock.now(),
            })
            .await
    }

    /// Oldest instant still inside the window. A window reaching past the
    /// representable range counts from the beginning of time.
    fn window_start(&self) -> DateTime<Utc> {
        self.clock
            .now()
            .checked_sub_signed(self.policy.window)
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Drops records that can no longer affect any decision.
    pub async fn compact(&self) -> Result<u64> {
        let cutoff = self.window_start();
        let removed = self.log.purge_before(cutoff).await?;
        if removed > 0 {
            debug!(removed, "compacted action log");
        }
        Ok(removed)
    }
}
