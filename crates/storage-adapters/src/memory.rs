//! In-memory adapters.
//!
//! Wishes live in a single `RwLock`ed map so that every mutation of a wish
//! (like, hide, delete) is serialized. The action log keeps one deque per
//! (client, action) pair and is bounded by periodic `purge_before` calls.

use std::collections::{BTreeMap, HashMap, VecDeque};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use domains::{
    ActionKind, ActionLog, ActionRecord, ClientId, Listing, NewWish, Page, Result, TagTotals,
    Visibility, Wish, WishId, WishRepository, WishTag,
};
use tokio::sync::RwLock;

#[derive(Default)]
struct WishTable {
    rows: BTreeMap<WishId, Wish>,
    last_id: i64,
}

#[derive(Default)]
pub struct InMemoryWishRepository {
    table: RwLock<WishTable>,
}

impl InMemoryWishRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WishRepository for InMemoryWishRepository {
    async fn insert(&self, wish: NewWish) -> Result<Wish> {
        let mut table = self.table.write().await;
        table.last_id += 1;
        let stored = Wish {
            id: WishId(table.last_id),
            content: wish.content,
            name: wish.name,
            tag: wish.tag,
            likes: 0,
            client_id: wish.client_id,
            is_hidden: false,
            created_at: wish.created_at,
        };
        table.rows.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn get(&self, id: WishId) -> Result<Option<Wish>> {
        Ok(self.table.read().await.rows.get(&id).cloned())
    }

    async fn list(&self, visibility: Visibility, page: Page) -> Result<Listing> {
        let table = self.table.read().await;
        let mut matching: Vec<&Wish> = table
            .rows
            .values()
            .filter(|wish| visibility.admits(wish))
            .collect();
        matching.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));

        let total = matching.len() as u64;
        let wishes = matching
            .into_iter()
            .skip(usize::try_from(page.skip).unwrap_or(usize::MAX))
            .take(usize::try_from(page.limit).unwrap_or(usize::MAX))
            .cloned()
            .collect();
        Ok(Listing { wishes, total })
    }

    async fn increment_likes(&self, id: WishId) -> Result<Option<u64>> {
        let mut table = self.table.write().await;
        Ok(table.rows.get_mut(&id).map(|wish| {
            wish.likes += 1;
            wish.likes
        }))
    }

    async fn set_hidden(&self, id: WishId, hidden: bool) -> Result<bool> {
        let mut table = self.table.write().await;
        Ok(match table.rows.get_mut(&id) {
            Some(wish) => {
                wish.is_hidden = hidden;
                true
            }
            None => false,
        })
    }

    async fn delete(&self, id: WishId) -> Result<bool> {
        Ok(self.table.write().await.rows.remove(&id).is_some())
    }

    async fn aggregate(&self, since: DateTime<Utc>) -> Result<HashMap<WishTag, TagTotals>> {
        let table = self.table.read().await;
        let mut totals: HashMap<WishTag, TagTotals> = HashMap::new();
        for wish in table.rows.values() {
            let entry = totals.entry(wish.tag).or_default();
            entry.wishes += 1;
            entry.likes += wish.likes;
            if wish.created_at >= since {
                entry.recent += 1;
            }
        }
        Ok(totals)
    }
}

#[derive(Default)]
pub struct InMemoryActionLog {
    entries: DashMap<(ClientId, ActionKind), VecDeque<DateTime<Utc>>>,
}

impl InMemoryActionLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records currently held, across all clients.
    pub fn len(&self) -> usize {
        self.entries.iter().map(|entry| entry.value().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ActionLog for InMemoryActionLog {
    async fn append(&self, record: ActionRecord) -> Result<()> {
        self.entries
            .entry((record.client_id, record.action))
            .or_default()
            .push_back(record.at);
        Ok(())
    }

    async fn count_since(
        &self,
        client_id: &ClientId,
        action: ActionKind,
        since: DateTime<Utc>,
    ) -> Result<u64> {
        let count = self
            .entries
            .get(&(client_id.clone(), action))
            .map(|stamps| stamps.iter().filter(|at| **at >= since).count())
            .unwrap_or(0);
        Ok(count as u64)
    }

    async fn purge_before(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let mut removed = 0u64;
        self.entries.retain(|_, stamps| {
            let before = stamps.len();
            stamps.retain(|at| *at >= cutoff);
            removed += (before - stamps.len()) as u64;
            !stamps.is_empty()
        });
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

    fn new_wish(content: &str, at: DateTime<Utc>) -> NewWish {
        NewWish {
            content: content.into(),
            name: "n".into(),
            tag: WishTag::Blessing,
            client_id: ClientId::parse(Some("x")),
            created_at: at,
        }
    }

    fn record(client: &str, action: ActionKind, at: DateTime<Utc>) -> ActionRecord {
        ActionRecord {
            client_id: ClientId::parse(Some(client)).unwrap(),
            action,
            at,
        }
    }

    #[tokio::test]
    async fn ids_are_monotonic_and_never_reused() {
        let repo = InMemoryWishRepository::new();
        let first = repo.insert(new_wish("a", noon())).await.unwrap();
        assert!(repo.delete(first.id).await.unwrap());
        let second = repo.insert(new_wish("b", noon())).await.unwrap();
        assert!(second.id > first.id);
    }

    #[tokio::test]
    async fn list_is_newest_first_and_paginated() {
        let repo = InMemoryWishRepository::new();
        for minutes in 0..5 {
            repo.insert(new_wish(&format!("w{minutes}"), noon() + Duration::minutes(minutes)))
                .await
                .unwrap();
        }
        let hidden = repo.insert(new_wish("hidden", noon() + Duration::hours(1))).await.unwrap();
        repo.set_hidden(hidden.id, true).await.unwrap();

        let page = repo
            .list(Visibility::VisibleOnly, Page { skip: 1, limit: 2 })
            .await
            .unwrap();
        let contents: Vec<&str> = page.wishes.iter().map(|w| w.content.as_str()).collect();
        assert_eq!(contents, vec!["w3", "w2"]);
        assert_eq!(page.total, 5);

        let all = repo.list(Visibility::IncludeHidden, Page::default()).await.unwrap();
        assert_eq!(all.total, 6);
        assert_eq!(all.wishes[0].content, "hidden");
    }

    #[tokio::test]
    async fn aggregate_counts_hidden_wishes_and_recent_ones() {
        let repo = InMemoryWishRepository::new();
        let old = repo.insert(new_wish("old", noon() - Duration::days(1))).await.unwrap();
        let hidden = repo.insert(new_wish("hidden", noon())).await.unwrap();
        repo.increment_likes(old.id).await.unwrap();
        repo.increment_likes(hidden.id).await.unwrap();
        repo.set_hidden(hidden.id, true).await.unwrap();

        let totals = repo.aggregate(noon()).await.unwrap();
        assert_eq!(totals.len(), 1);
        assert_eq!(
            totals[&WishTag::Blessing],
            TagTotals { wishes: 2, likes: 2, recent: 1 }
        );
    }

    #[tokio::test]
    async fn equal_timestamps_fall_back_to_id_order() {
        let repo = InMemoryWishRepository::new();
        repo.insert(new_wish("older", noon())).await.unwrap();
        repo.insert(new_wish("newer", noon())).await.unwrap();

        let page = repo.list(Visibility::VisibleOnly, Page::default()).await.unwrap();
        assert_eq!(page.wishes[0].content, "newer");
    }

    #[test]
    fn mutations_report_missing_wishes() {
        let repo = InMemoryWishRepository::new();
        tokio_test::block_on(async {
            assert_eq!(repo.increment_likes(WishId(1)).await.unwrap(), None);
            assert!(!repo.set_hidden(WishId(1), true).await.unwrap());
            assert!(!repo.delete(WishId(1)).await.unwrap());
        });
    }

    #[tokio::test]
    async fn hiding_keeps_content_and_likes() {
        let repo = InMemoryWishRepository::new();
        let wish = repo.insert(new_wish("keep me", noon())).await.unwrap();
        repo.increment_likes(wish.id).await.unwrap();
        repo.set_hidden(wish.id, true).await.unwrap();

        let stored = repo.get(wish.id).await.unwrap().unwrap();
        assert!(stored.is_hidden);
        assert_eq!(stored.likes, 1);
        assert_eq!(stored.content, "keep me");
        assert_eq!(stored.client_id, wish.client_id);
    }

    #[tokio::test]
    async fn log_counts_per_client_and_action() {
        let log = InMemoryActionLog::new();
        log.append(record("x", ActionKind::Create, noon())).await.unwrap();
        log.append(record("x", ActionKind::Like, noon())).await.unwrap();
        log.append(record("y", ActionKind::Create, noon())).await.unwrap();
        log.append(record("x", ActionKind::Create, noon() - Duration::hours(2)))
            .await
            .unwrap();

        let x = ClientId::parse(Some("x")).unwrap();
        let since = noon() - Duration::hours(1);
        assert_eq!(log.count_since(&x, ActionKind::Create, since).await.unwrap(), 1);
        assert_eq!(log.count_since(&x, ActionKind::Like, since).await.unwrap(), 1);
        assert_eq!(log.count_since(&x, ActionKind::Create, noon()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn purge_drops_old_records_and_empty_keys() {
        let log = InMemoryActionLog::new();
        log.append(record("x", ActionKind::Create, noon() - Duration::hours(2)))
            .await
            .unwrap();
        log.append(record("y", ActionKind::Like, noon() - Duration::hours(3)))
            .await
            .unwrap();
        log.append(record("x", ActionKind::Create, noon())).await.unwrap();

        let removed = log.purge_before(noon() - Duration::hours(1)).await.unwrap();
        assert_eq!(removed, 2);
        assert_eq!(log.len(), 1);
        assert_eq!(log.entries.len(), 1);
    }
}
