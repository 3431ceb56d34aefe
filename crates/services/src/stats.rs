//! Aggregate counts for the admin dashboard.
//!
//! Totals include hidden wishes.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::{DateTime, NaiveTime, Utc};
use domains::{Clock, Result, TagTotals, WishRepository, WishTag};
use serde::Serialize;

use crate::admin::AdminGrant;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WishStats {
    pub total_wishes: u64,
    pub total_likes: u64,
    pub wishes_today: u64,
    /// Always holds every tag of [`WishTag::ALL`], zero or not.
    pub by_tag: BTreeMap<&'static str, u64>,
}

impl WishStats {
    /// Folds per-tag totals into the dashboard view.
    pub fn from_totals(totals: &HashMap<WishTag, TagTotals>) -> Self {
        let mut stats = Self {
            total_wishes: 0,
            total_likes: 0,
            wishes_today: 0,
            by_tag: WishTag::ALL.iter().map(|tag| (tag.as_str(), 0)).collect(),
        };

        for (tag, counts) in totals {
            stats.total_wishes += counts.wishes;
            stats.total_likes += counts.likes;
            stats.wishes_today += counts.recent;
            *stats.by_tag.entry(tag.as_str()).or_default() += counts.wishes;
        }
        stats
    }
}

pub struct StatsAggregator {
    repo: Arc<dyn WishRepository>,
    clock: Arc<dyn Clock>,
}

impl StatsAggregator {
    pub fn new(repo: Arc<dyn WishRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { repo, clock }
    }

    pub async fn stats(&self, _grant: &AdminGrant) -> Result<WishStats> {
        let totals = self.repo.aggregate(start_of_day(self.clock.now())).await?;
        Ok(WishStats::from_totals(&totals))
    }
}

fn start_of_day(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive().and_time(NaiveTime::MIN).and_utc()
}
