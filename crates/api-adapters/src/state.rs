//! State shared across all request handlers.

use std::sync::Arc;

use services::{AdminSession, ModerationService, StatsAggregator, WishService};

use crate::metrics::Metrics;

#[derive(Clone)]
pub struct AppState {
    pub wishes: Arc<WishService>,
    pub admin: Arc<AdminSession>,
    pub moderation: Arc<ModerationService>,
    pub stats: Arc<StatsAggregator>,
    pub metrics: Arc<Metrics>,
}
