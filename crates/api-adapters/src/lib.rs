//! # api-adapters
//!
//! The HTTP boundary of the wish board: request shapes and validation,
//! client identity and admin credential extraction, error-to-status mapping,
//! routing and metrics.

pub mod dto;
pub mod metrics;

#[cfg(feature = "web-axum")]
pub mod error;
#[cfg(feature = "web-axum")]
pub mod extract;
#[cfg(feature = "web-axum")]
pub mod handlers;
#[cfg(feature = "web-axum")]
pub mod middleware;
#[cfg(feature = "web-axum")]
pub mod state;

#[cfg(feature = "web-axum")]
pub use state::AppState;

#[cfg(feature = "web-axum")]
use axum::{
    routing::{delete, get, post},
    Router,
};

/// Builds the API router.
///
/// Layers (CORS, tracing, static hosting) are applied by the caller via
/// [`middleware`], so tests can drive the bare routes.
#[cfg(feature = "web-axum")]
pub fn router(state: AppState) -> Router {
    use handlers::{admin, wishes};

    Router::new()
        .route("/api/wishes", get(wishes::list_wishes).post(wishes::create_wish))
        .route("/api/wishes/{id}", delete(wishes::delete_wish))
        .route("/api/wishes/{id}/like", post(wishes::like_wish))
        .route("/api/admin/login", post(admin::login))
        .route("/api/admin/logout", post(admin::logout))
        .route("/api/admin/stats", get(admin::stats))
        .route("/api/admin/wishes", get(admin::list_all))
        .route("/api/admin/wishes/{id}", delete(admin::delete_wish))
        .route("/api/admin/wishes/{id}/hide", post(admin::hide_wish))
        .route("/api/admin/wishes/{id}/show", post(admin::show_wish))
        .route("/health", get(handlers::health))
        .route("/metrics", get(handlers::metrics))
        .with_state(state)
}
