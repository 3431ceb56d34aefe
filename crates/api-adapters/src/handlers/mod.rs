//! # Handlers
//!
//! Coordinates the flow between HTTP requests and the services.

pub mod admin;
pub mod wishes;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

use crate::state::AppState;

pub async fn health() -> impl IntoResponse {
    Json(json!({ "status": "healthy" }))
}

/// Root document served when no frontend is hosted.
pub async fn service_info() -> impl IntoResponse {
    Json(json!({
        "name": "wishboard",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running",
    }))
}

pub async fn metrics(State(state): State<AppState>) -> Response {
    match state.metrics.render() {
        Ok(body) => (
            [(
                header::CONTENT_TYPE,
                "application/openmetrics-text; version=1.0.0; charset=utf-8",
            )],
            body,
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "failed to encode metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
