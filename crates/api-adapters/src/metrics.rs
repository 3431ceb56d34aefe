//! Prometheus counters for the wish board.

use prometheus_client::encoding::text::encode;
use prometheus_client::encoding::EncodeLabelSet;
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::registry::Registry;

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct ActionLabels {
    pub action: String,
}

#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct OutcomeLabels {
    pub outcome: String,
}

pub struct Metrics {
    registry: Registry,
    pub wishes_created: Counter,
    pub likes: Counter,
    pub rate_limited: Family<ActionLabels, Counter>,
    pub admin_logins: Family<OutcomeLabels, Counter>,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub fn new() -> Self {
        let mut registry = Registry::with_prefix("wishboard");
        let wishes_created = Counter::default();
        let likes = Counter::default();
        let rate_limited = Family::<ActionLabels, Counter>::default();
        let admin_logins = Family::<OutcomeLabels, Counter>::default();

        registry.register("wishes_created", "Wishes successfully created", wishes_created.clone());
        registry.register("wish_likes", "Likes successfully applied", likes.clone());
        registry.register(
            "rate_limited",
            "Requests refused by the per-client rate limiter",
            rate_limited.clone(),
        );
        registry.register("admin_logins", "Admin login attempts by outcome", admin_logins.clone());

        Self {
            registry,
            wishes_created,
            likes,
            rate_limited,
            admin_logins,
        }
    }

    pub fn record_rate_limited(&self, action: &str) {
        self.rate_limited
            .get_or_create(&ActionLabels {
                action: action.to_owned(),
            })
            .inc();
    }

    pub fn record_login(&self, outcome: &str) {
        self.admin_logins
            .get_or_create(&OutcomeLabels {
                outcome: outcome.to_owned(),
            })
            .inc();
    }

    /// OpenMetrics text exposition.
    pub fn render(&self) -> Result<String, std::fmt::Error> {
        let mut body = String::new();
        encode(&mut body, &self.registry)?;
        Ok(body)
    }
}
