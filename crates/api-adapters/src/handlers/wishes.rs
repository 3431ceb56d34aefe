//! Public wish endpoints.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};
use domains::{ActionKind, DomainError, WishId};
use services::{WishPage, WishView};

use crate::dto::{CreateWishRequest, LikeResponse, ListQuery, MessageResponse};
use crate::error::ApiError;
use crate::extract::ClientIdentity;
use crate::state::AppState;

/// `GET /api/wishes`: visible wishes, newest first.
pub async fn list_wishes(
    State(state): State<AppState>,
    client: ClientIdentity,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<WishPage>, ApiError> {
    let Query(query) = query?;
    let page = state.wishes.list(query.page()?, client.client_id()).await?;
    Ok(Json(page))
}

/// `POST /api/wishes`
pub async fn create_wish(
    State(state): State<AppState>,
    client: ClientIdentity,
    body: Result<Json<CreateWishRequest>, JsonRejection>,
) -> Result<Json<WishView>, ApiError> {
    let Json(body) = body?;
    let request = body.validate(client.0)?;
    match state.wishes.create(request).await {
        Ok(wish) => {
            state.metrics.wishes_created.inc();
            Ok(Json(wish))
        }
        Err(DomainError::RateLimited(action)) => {
            state.metrics.record_rate_limited(action.as_str());
            Err(DomainError::RateLimited(action).into())
        }
        Err(other) => Err(other.into()),
    }
}

/// `POST /api/wishes/{id}/like`. Throttling is reported in the body,
/// not as an error status.
pub async fn like_wish(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    client: ClientIdentity,
) -> Result<Json<LikeResponse>, ApiError> {
    let Path(id) = id?;
    let outcome = state.wishes.like(WishId(id), client.client_id()).await?;

    let message = if outcome.success {
        state.metrics.likes.inc();
        "liked"
    } else {
        state.metrics.record_rate_limited(ActionKind::Like.as_str());
        "too many likes, take a break"
    };

    Ok(Json(LikeResponse {
        success: outcome.success,
        likes: outcome.likes,
        message: message.to_owned(),
    }))
}

/// `DELETE /api/wishes/{id}`: owner path.
pub async fn delete_wish(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
    client: ClientIdentity,
) -> Result<Json<MessageResponse>, ApiError> {
    let Path(id) = id?;
    state.wishes.delete(WishId(id), client.client_id()).await?;
    Ok(Json(MessageResponse::ok("deleted")))
}
