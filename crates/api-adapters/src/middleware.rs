//! Layers applied around the API router by the binary.

use std::path::Path;

use axum::{http::HeaderValue, routing::get, Router};
use tower_http::{
    classify::{ServerErrorsAsFailures, SharedClassifier},
    cors::{AllowOrigin, Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};
use tracing::warn;

/// Request/response tracing at the default `tower_http::trace` levels.
pub fn trace_layer() -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>> {
    TraceLayer::new_for_http()
}

/// `None` allows any origin; otherwise only the listed ones.
pub fn cors_policy(origins: Option<&[String]>) -> CorsLayer {
    let allow_origin = match origins {
        None => AllowOrigin::any(),
        Some(origins) => AllowOrigin::list(origins.iter().filter_map(|origin| {
            HeaderValue::from_str(origin)
                .map_err(|_| warn!(%origin, "ignoring invalid CORS origin"))
                .ok()
        })),
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(Any)
        .allow_headers(Any)
        .max_age(std::time::Duration::from_secs(3600))
}

/// Serves a built single-page app from `dir` for every path the API does not
/// claim, falling back to `index.html` for client-side routes.
pub fn with_static_files(router: Router, dir: impl AsRef<Path>) -> Router {
    let dir = dir.as_ref();
    let spa = ServeDir::new(dir).fallback(ServeFile::new(dir.join("index.html")));
    router.fallback_service(spa)
}

/// Answers `GET /` with a small service document, for deployments without a
/// frontend.
pub fn with_service_info(router: Router) -> Router {
    router.route("/", get(crate::handlers::service_info))
}
