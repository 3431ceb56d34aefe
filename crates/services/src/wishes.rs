//! # WishService
//!
//! Public wish operations: list, create, like and owner-initiated delete.
//! Create and like pass through the rate limiter; delete enforces ownership.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use domains::{
    ActionKind, ClientId, Clock, DomainError, NewWish, Page, Result, Visibility, Wish, WishId,
    WishRepository, WishTag, DEFAULT_DISPLAY_NAME,
};
use serde::Serialize;
use tracing::{info, warn};

use crate::rate_limiter::RateLimiter;

/// A submission as it arrives from the boundary layer. Length limits have
/// already been enforced there.
#[derive(Debug, Clone, Default)]
pub struct CreateWish {
    pub content: String,
    pub name: Option<String>,
    pub tag: Option<String>,
    pub client_id: Option<ClientId>,
}

/// A wish as shown to a public caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WishView {
    pub id: WishId,
    pub content: String,
    pub name: String,
    pub tag: WishTag,
    pub likes: u64,
    pub created_at: DateTime<Utc>,
    pub is_owner: bool,
}

impl WishView {
    pub fn for_viewer(wish: Wish, viewer: Option<&ClientId>) -> Self {
        let is_owner = wish.is_owned_by(viewer);
        Self {
            id: wish.id,
            content: wish.content,
            name: wish.name,
            tag: wish.tag,
            likes: wish.likes,
            created_at: wish.created_at,
            is_owner,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WishPage {
    pub wishes: Vec<WishView>,
    pub total: u64,
}

/// Result of a like. A throttled like is not an error: `success` is false
/// and `likes` carries the unchanged count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LikeOutcome {
    pub success: bool,
    pub likes: u64,
}

pub struct WishService {
    repo: Arc<dyn WishRepository>,
    limiter: Arc<RateLimiter>,
    clock: Arc<dyn Clock>,
}

impl WishService {
    pub fn new(
        repo: Arc<dyn WishRepository>,
        limiter: Arc<RateLimiter>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { repo, limiter, clock }
    }

    /// Visible wishes, newest first, each flagged with whether `viewer` owns it.
    pub async fn list(&self, page: Page, viewer: Option<&ClientId>) -> Result<WishPage> {
        let listing = self.repo.list(Visibility::VisibleOnly, page).await?;
        Ok(WishPage {
            wishes: listing
                .wishes
                .into_iter()
                .map(|wish| WishView::for_viewer(wish, viewer))
                .collect(),
            total: listing.total,
        })
    }

    pub async fn create(&self, request: CreateWish) -> Result<WishView> {
        let client_id = request.client_id;

        if !self
            .limiter
            .allow_action(client_id.as_ref(), ActionKind::Create)
            .await?
        {
            return Err(DomainError::RateLimited(ActionKind::Create));
        }

        let wish = self
            .repo
            .insert(NewWish {
                content: request.content.trim().to_owned(),
                name: display_name(request.name.as_deref()),
                tag: WishTag::normalize(request.tag.as_deref()),
                client_id: client_id.clone(),
                created_at: self.clock.now(),
            })
            .await?;

        self.limiter
            .record(client_id.as_ref(), ActionKind::Create)
            .await?;

        info!(id = %wish.id, tag = %wish.tag, "wish created");
        Ok(WishView::for_viewer(wish, client_id.as_ref()))
    }

    /// Adds one like. Unknown ids fail before the rate limit is consulted.
    pub async fn like(&self, id: WishId, client_id: Option<&ClientId>) -> Result<LikeOutcome> {
        let wish = self.repo.get(id).await?.ok_or(DomainError::NotFound(id))?;

        if !self.limiter.allow_action(client_id, ActionKind::Like).await? {
            return Ok(LikeOutcome {
                success: false,
                likes: wish.likes,
            });
        }

        let likes = self
            .repo
            .increment_likes(id)
            .await?
            .ok_or(DomainError::NotFound(id))?;

        self.limiter.record(client_id, ActionKind::Like).await?;

        Ok(LikeOutcome { success: true, likes })
    }

    /// Owner-initiated, permanent delete. Wishes without an owner can never be
    /// deleted through this path.
    pub async fn delete(&self, id: WishId, client_id: Option<&ClientId>) -> Result<()> {
        let wish = self.repo.get(id).await?.ok_or(DomainError::NotFound(id))?;

        if !wish.is_owned_by(client_id) {
            warn!(%id, "refused delete by non-owner");
            return Err(DomainError::Forbidden);
        }

        if !self.repo.delete(id).await? {
            return Err(DomainError::NotFound(id));
        }

        info!(%id, "wish deleted by owner");
        Ok(())
    }
}

fn display_name(raw: Option<&str>) -> String {
    raw.map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or(DEFAULT_DISPLAY_NAME)
        .to_owned()
}
