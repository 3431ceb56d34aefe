//! Maps domain errors and rejected requests onto HTTP responses.
//!
//! Bodies are `{"detail": "..."}`. Storage failures are logged and reported
//! without their message.

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use domains::DomainError;
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::dto::ValidationError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{}", .0.body_text())]
    Body(#[from] JsonRejection),

    #[error("{}", .0.body_text())]
    Path(#[from] PathRejection),

    #[error("{}", .0.body_text())]
    Query(#[from] QueryRejection),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Domain(DomainError::RateLimited(_)) => StatusCode::TOO_MANY_REQUESTS,
            ApiError::Domain(DomainError::NotFound(_)) => StatusCode::NOT_FOUND,
            ApiError::Domain(DomainError::Forbidden) => StatusCode::FORBIDDEN,
            ApiError::Domain(DomainError::Unauthorized) => StatusCode::UNAUTHORIZED,
            ApiError::Domain(DomainError::ServiceUnavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Domain(DomainError::Storage(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Validation(_)
            | ApiError::Body(_)
            | ApiError::Path(_)
            | ApiError::Query(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = match &self {
            ApiError::Domain(DomainError::Storage(message)) => {
                error!(%message, "request failed on storage");
                "internal server error".to_string()
            }
            other => other.to_string(),
        };

        (status, Json(json!({ "detail": detail }))).into_response()
    }
}
