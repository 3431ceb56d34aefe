//! # Wishboard Binary
//!
//! The entry point that assembles the application from configuration and
//! compile-time features.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use api_adapters::{metrics::Metrics, middleware, AppState};
use auth_adapters::{InMemorySessionStore, RandomTokenGenerator};
use configs::{DatabaseSettings, LogSettings, Settings};
use domains::{ActionLog, Clock, SystemClock, WishRepository};
use services::{
    AdminSession, ModerationService, RateLimitPolicy, RateLimiter, StatsAggregator, WishService,
};
use storage_adapters::{InMemoryActionLog, InMemoryWishRepository};
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[cfg(feature = "db-sqlite")]
use storage_adapters::SqliteStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("failed to load configuration")?;
    init_tracing(&settings.log);
    settings.log_summary();

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    // 1. Storage
    let (repo, action_log) = open_storage(&settings.database).await?;

    // 2. Services
    let policy = RateLimitPolicy {
        window: chrono::Duration::from_std(settings.rate_limit.window())?,
        create_limit: settings.rate_limit.create_per_window,
        like_limit: settings.rate_limit.like_per_window,
    };
    let limiter = Arc::new(RateLimiter::new(action_log, clock.clone(), policy));
    let admin = Arc::new(AdminSession::new(
        settings.admin.password(),
        Arc::new(InMemorySessionStore::new()),
        Arc::new(RandomTokenGenerator),
        clock.clone(),
        settings
            .admin
            .token_ttl()
            .map(chrono::Duration::from_std)
            .transpose()?,
    ));

    let state = AppState {
        wishes: Arc::new(WishService::new(repo.clone(), limiter.clone(), clock.clone())),
        admin: admin.clone(),
        moderation: Arc::new(ModerationService::new(repo.clone())),
        stats: Arc::new(StatsAggregator::new(repo, clock)),
        metrics: Arc::new(Metrics::new()),
    };

    spawn_compaction(limiter, admin, settings.rate_limit.compaction_interval());

    // 3. HTTP
    let mut app = api_adapters::router(state);
    if let Some(dir) = &settings.server.static_dir {
        info!(%dir, "serving static files");
        app = middleware::with_static_files(app, dir);
    } else {
        app = middleware::with_service_info(app);
    }
    let app = app
        .layer(middleware::cors_policy(settings.server.allowed_origins().as_deref()))
        .layer(middleware::trace_layer());

    let listener = tokio::net::TcpListener::bind(settings.server.bind_address())
        .await
        .with_context(|| format!("failed to bind {}", settings.server.bind_address()))?;
    info!(address = %listener.local_addr()?, "wishboard listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("wishboard stopped");
    Ok(())
}

fn init_tracing(log: &LogSettings) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&log.level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if log.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn open_storage(
    database: &DatabaseSettings,
) -> anyhow::Result<(Arc<dyn WishRepository>, Arc<dyn ActionLog>)> {
    #[cfg(feature = "db-sqlite")]
    if let Some(url) = &database.url {
        let store = Arc::new(
            SqliteStore::connect(url, database.max_connections)
                .await
                .context("failed to open SQLite database")?,
        );
        return Ok((store.clone(), store));
    }

    #[cfg(not(feature = "db-sqlite"))]
    if database.url.is_some() {
        warn!("database.url is set but this build has no SQLite support");
    }

    info!("using in-memory storage; wishes are lost on restart");
    Ok((
        Arc::new(InMemoryWishRepository::new()),
        Arc::new(InMemoryActionLog::new()),
    ))
}

/// Periodically drops action records outside the rate-limit window and
/// expired admin tokens.
fn spawn_compaction(limiter: Arc<RateLimiter>, admin: Arc<AdminSession>, every: Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            match limiter.compact().await {
                Ok(0) => {}
                Ok(removed) => info!(removed, "compacted rate limit log"),
                Err(e) => warn!(error = %e, "rate limit compaction failed"),
            }
            if let Err(e) = admin.purge_expired().await {
                warn!(error = %e, "admin token purge failed");
            }
        }
    });
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for ctrl-c");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    info!("shutdown signal received");
}
