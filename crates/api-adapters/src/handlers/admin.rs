//! Admin endpoints. Everything except login/logout requires a credential.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};
use domains::{DomainError, WishId};
use services::{AdminWishPage, WishStats};

use crate::dto::{AdminListQuery, LoginRequest, LoginResponse, MessageResponse};
use crate::error::ApiError;
use crate::extract::AdminBearer;
use crate::state::AppState;

/// `POST /api/admin/login`
pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(body) = body?;
    match state.admin.login(&body.password).await {
        Ok(token) => {
            state.metrics.record_login("success");
            Ok(Json(LoginResponse {
                success: true,
                token: Some(token),
                message: "logged in".into(),
            }))
        }
        Err(err) => {
            let outcome = match err {
                DomainError::Unauthorized => "rejected",
                DomainError::ServiceUnavailable(_) => "unconfigured",
                _ => "error",
            };
            state.metrics.record_login(outcome);
            Err(err.into())
        }
    }
}

/// `POST /api/admin/logout`: always succeeds.
pub async fn logout(
    State(state): State<AppState>,
    bearer: AdminBearer,
) -> Result<Json<MessageResponse>, ApiError> {
    state.admin.logout(bearer.as_deref()).await?;
    Ok(Json(MessageResponse::ok("logged out")))
}

/// `GET /api/admin/stats`
pub async fn stats(
    State(state): State<AppState>,
    bearer: AdminBearer,
) -> Result<Json<WishStats>, ApiError> {
    let grant = state.admin.authorize(bearer.as_deref()).await?;
    Ok(Json(state.stats.stats(&grant).await?))
}

/// `GET /api/admin/wishes`: includes hidden wishes unless told otherwise.
pub async fn list_all(
    State(state): State<AppState>,
    bearer: AdminBearer,
    query: Result<Query<AdminListQuery>, QueryRejection>,
) -> Result<Json<AdminWishPage>, ApiError> {
    let grant = state.admin.authorize(bearer.as_deref()).await?;
    let Query(query) = query?;
    let page = state
        .moderation
        .list_all(&grant, query.include_hidden(), query.page()?)
        .await?;
    Ok(Json(page))
}

/// `POST /api/admin/wishes/{id}/hide`
pub async fn hide_wish(
    State(state): State<AppState>,
    bearer: AdminBearer,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let grant = state.admin.authorize(bearer.as_deref()).await?;
    let Path(id) = id?;
    state.moderation.hide(&grant, WishId(id)).await?;
    Ok(Json(MessageResponse::ok("hidden")))
}

/// `POST /api/admin/wishes/{id}/show`
pub async fn show_wish(
    State(state): State<AppState>,
    bearer: AdminBearer,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let grant = state.admin.authorize(bearer.as_deref()).await?;
    let Path(id) = id?;
    state.moderation.unhide(&grant, WishId(id)).await?;
    Ok(Json(MessageResponse::ok("shown")))
}

/// `DELETE /api/admin/wishes/{id}`: ignores ownership.
pub async fn delete_wish(
    State(state): State<AppState>,
    bearer: AdminBearer,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let grant = state.admin.authorize(bearer.as_deref()).await?;
    let Path(id) = id?;
    state.moderation.delete(&grant, WishId(id)).await?;
    Ok(Json(MessageResponse::ok("deleted")))
}
