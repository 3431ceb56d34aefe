//! Shared fixtures: a full wish board wired over in-memory adapters and a
//! manually driven clock.

use std::sync::Arc;

use auth_adapters::{InMemorySessionStore, RandomTokenGenerator};
use domains::{testing::ManualClock, ActionLog, ClientId, WishRepository};
use secrecy::SecretString;
use services::{
    AdminSession, CreateWish, ModerationService, RateLimitPolicy, RateLimiter, StatsAggregator,
    WishService,
};
use storage_adapters::{InMemoryActionLog, InMemoryWishRepository};

#[cfg(feature = "web-axum")]
use api_adapters::{metrics::Metrics, AppState};

pub const ADMIN_PASSWORD: &str = "abc123";

pub struct TestBoard {
    pub clock: Arc<ManualClock>,
    pub repo: Arc<dyn WishRepository>,
    pub sessions: Arc<InMemorySessionStore>,
    pub limiter: Arc<RateLimiter>,
    pub wishes: Arc<WishService>,
    pub admin: Arc<AdminSession>,
    pub moderation: Arc<ModerationService>,
    pub stats: Arc<StatsAggregator>,
}

impl TestBoard {
    /// Default quotas, admin password [`ADMIN_PASSWORD`], tokens never expire.
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> TestBoardBuilder {
        TestBoardBuilder::default()
    }

    #[cfg(feature = "web-axum")]
    pub fn state(&self) -> AppState {
        AppState {
            wishes: self.wishes.clone(),
            admin: self.admin.clone(),
            moderation: self.moderation.clone(),
            stats: self.stats.clone(),
            metrics: Arc::new(Metrics::new()),
        }
    }

    #[cfg(feature = "web-axum")]
    pub fn router(&self) -> axum::Router {
        api_adapters::router(self.state())
    }
}

impl Default for TestBoard {
    fn default() -> Self {
        Self::new()
    }
}

pub struct TestBoardBuilder {
    password: Option<String>,
    policy: RateLimitPolicy,
    token_ttl: Option<chrono::Duration>,
    action_log: Option<Arc<dyn ActionLog>>,
}

impl Default for TestBoardBuilder {
    fn default() -> Self {
        Self {
            password: Some(ADMIN_PASSWORD.to_string()),
            policy: RateLimitPolicy::default(),
            token_ttl: None,
            action_log: None,
        }
    }
}

impl TestBoardBuilder {
    pub fn password(mut self, password: Option<&str>) -> Self {
        self.password = password.map(str::to_owned);
        self
    }

    pub fn policy(mut self, policy: RateLimitPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn token_ttl(mut self, ttl: chrono::Duration) -> Self {
        self.token_ttl = Some(ttl);
        self
    }

    /// Replaces the in-memory action log, e.g. with a failing mock.
    pub fn action_log(mut self, log: Arc<dyn ActionLog>) -> Self {
        self.action_log = Some(log);
        self
    }

    pub fn build(self) -> TestBoard {
        let clock = Arc::new(ManualClock::at_noon());
        let repo: Arc<dyn WishRepository> = Arc::new(InMemoryWishRepository::new());
        let log: Arc<dyn ActionLog> = match self.action_log {
            Some(log) => log,
            None => Arc::new(InMemoryActionLog::new()),
        };
        let sessions = Arc::new(InMemorySessionStore::new());

        let limiter = Arc::new(RateLimiter::new(log, clock.clone(), self.policy));
        let wishes = Arc::new(WishService::new(repo.clone(), limiter.clone(), clock.clone()));
        let admin = Arc::new(AdminSession::new(
            self.password.map(SecretString::from),
            sessions.clone(),
            Arc::new(RandomTokenGenerator),
            clock.clone(),
            self.token_ttl,
        ));
        let moderation = Arc::new(ModerationService::new(repo.clone()));
        let stats = Arc::new(StatsAggregator::new(repo.clone(), clock.clone()));

        TestBoard {
            clock,
            repo,
            sessions,
            limiter,
            wishes,
            admin,
            moderation,
            stats,
        }
    }
}

pub fn client(raw: &str) -> ClientId {
    ClientId::parse(Some(raw)).expect("fixture client ids are non-blank")
}

pub fn wish_from(content: &str, client_id: Option<&ClientId>) -> CreateWish {
    CreateWish {
        content: content.to_string(),
        client_id: client_id.cloned(),
        ..CreateWish::default()
    }
}

/// Drives one request through `app` and decodes the JSON body
/// (`Value::Null` for an empty body).
#[cfg(feature = "web-axum")]
pub async fn call(
    app: &axum::Router,
    method: &str,
    uri: &str,
    headers: &[(&str, &str)],
    body: Option<serde_json::Value>,
) -> (axum::http::StatusCode, serde_json::Value) {
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    let mut request = Request::builder().method(method).uri(uri);
    for (name, value) in headers {
        request = request.header(*name, *value);
    }
    let request = match body {
        Some(json) => request
            .header("content-type", "application/json")
            .body(Body::from(json.to_string())),
        None => request.body(Body::empty()),
    }
    .expect("valid test request");

    let response = app.clone().oneshot(request).await.expect("router is infallible");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("readable body");
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| {
            serde_json::Value::String(String::from_utf8_lossy(&bytes).into_owned())
        })
    };
    (status, json)
}
