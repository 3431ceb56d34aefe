//! In-memory expiring token set.
//!
//! Process-local and reset on restart. Expired tokens are rejected on lookup
//! and removed by `purge_expired`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use domains::{Result, SessionStore};
use tracing::debug;

#[derive(Default)]
pub struct InMemorySessionStore {
    /// token -> expiry; `None` never expires.
    tokens: DashMap<String, Option<DateTime<Utc>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

fn is_expired(expires_at: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
    expires_at.is_some_and(|at| at <= now)
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn insert(&self, token: String, expires_at: Option<DateTime<Utc>>) -> Result<()> {
        self.tokens.insert(token, expires_at);
        Ok(())
    }

    async fn is_live(&self, token: &str, now: DateTime<Utc>) -> Result<bool> {
        Ok(self
            .tokens
            .get(token)
            .is_some_and(|entry| !is_expired(*entry.value(), now)))
    }

    async fn remove(&self, token: &str) -> Result<bool> {
        Ok(self.tokens.remove(token).is_some())
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<u64> {
        let before = self.tokens.len();
        self.tokens.retain(|_, expires_at| !is_expired(*expires_at, now));
        let removed = before.saturating_sub(self.tokens.len()) as u64;
        if removed > 0 {
            debug!(removed, "purged expired admin tokens");
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, 12, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn tokens_live_until_removed() {
        let store = InMemorySessionStore::new();
        store.insert("t".into(), None).await.unwrap();

        assert!(store.is_live("t", noon() + Duration::days(365)).await.unwrap());
        assert!(store.remove("t").await.unwrap());
        assert!(!store.remove("t").await.unwrap());
        assert!(!store.is_live("t", noon()).await.unwrap());
    }

    #[tokio::test]
    async fn expired_tokens_are_rejected_then_purged() {
        let store = InMemorySessionStore::new();
        store
            .insert("short".into(), Some(noon() + Duration::minutes(5)))
            .await
            .unwrap();
        store.insert("forever".into(), None).await.unwrap();

        assert!(store.is_live("short", noon()).await.unwrap());
        let later = noon() + Duration::minutes(5);
        assert!(!store.is_live("short", later).await.unwrap());

        assert_eq!(store.purge_expired(later).await.unwrap(), 1);
        assert_eq!(store.len(), 1);
        assert!(store.is_live("forever", later).await.unwrap());
    }
}
