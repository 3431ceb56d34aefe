//! # ModerationService
//!
//! Administrator operations over the wish store. Every call requires an
//! [`AdminGrant`]; none of them consult ownership or the rate limiter.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use domains::{
    ClientId, DomainError, Page, Result, Visibility, Wish, WishId, WishRepository, WishTag,
};
use serde::Serialize;
use tracing::info;

use crate::admin::AdminGrant;

/// Full record as seen by an administrator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdminWishView {
    pub id: WishId,
    pub content: String,
    pub name: String,
    pub tag: WishTag,
    pub likes: u64,
    pub client_id: Option<ClientId>,
    pub is_hidden: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Wish> for AdminWishView {
    fn from(wish: Wish) -> Self {
        Self {
            id: wish.id,
            content: wish.content,
            name: wish.name,
            tag: wish.tag,
            likes: wish.likes,
            client_id: wish.client_id,
            is_hidden: wish.is_hidden,
            created_at: wish.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdminWishPage {
    pub wishes: Vec<AdminWishView>,
    pub total: u64,
}

pub struct ModerationService {
    repo: Arc<dyn WishRepository>,
}

impl ModerationService {
    pub fn new(repo: Arc<dyn WishRepository>) -> Self {
        Self { repo }
    }

    pub async fn list_all(
        &self,
        _grant: &AdminGrant,
        include_hidden: bool,
        page: Page,
    ) -> Result<AdminWishPage> {
        let visibility = if include_hidden {
            Visibility::IncludeHidden
        } else {
            Visibility::VisibleOnly
        };
        let listing = self.repo.list(visibility, page).await?;
        Ok(AdminWishPage {
            wishes: listing.wishes.into_iter().map(AdminWishView::from).collect(),
            total: listing.total,
        })
    }

    pub async fn hide(&self, grant: &AdminGrant, id: WishId) -> Result<()> {
        self.set_hidden(grant, id, true).await
    }

    pub async fn unhide(&self, grant: &AdminGrant, id: WishId) -> Result<()> {
        self.set_hidden(grant, id, false).await
    }

    /// Removes a wish regardless of who owns it.
    pub async fn delete(&self, grant: &AdminGrant, id: WishId) -> Result<()> {
        if !self.repo.delete(id).await? {
            return Err(DomainError::NotFound(id));
        }
        info!(%id, credential = ?grant.credential(), "wish deleted by admin");
        Ok(())
    }

    async fn set_hidden(&self, grant: &AdminGrant, id: WishId, hidden: bool) -> Result<()> {
        if !self.repo.set_hidden(id, hidden).await? {
            return Err(DomainError::NotFound(id));
        }
        info!(%id, hidden, credential = ?grant.credential(), "wish visibility changed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admin::grant_for_tests;
    use domains::{Listing, MockWishRepository};
    use mockall::predicate::eq;

    #[tokio::test]
    async fn hide_and_unhide_flip_only_the_flag() {
        let mut repo = MockWishRepository::new();
        repo.expect_set_hidden()
            .with(eq(WishId(1)), eq(true))
            .times(1)
            .returning(|_, _| Ok(true));
        repo.expect_set_hidden()
            .with(eq(WishId(1)), eq(false))
            .times(1)
            .returning(|_, _| Ok(true));

        let moderation = ModerationService::new(Arc::new(repo));
        let grant = grant_for_tests();
        moderation.hide(&grant, WishId(1)).await.unwrap();
        moderation.unhide(&grant, WishId(1)).await.unwrap();
    }

    #[tokio::test]
    async fn unknown_ids_are_not_found() {
        let mut repo = MockWishRepository::new();
        repo.expect_set_hidden().returning(|_, _| Ok(false));
        repo.expect_delete().returning(|_| Ok(false));

        let moderation = ModerationService::new(Arc::new(repo));
        let grant = grant_for_tests();
        for result in [
            moderation.hide(&grant, WishId(9)).await,
            moderation.unhide(&grant, WishId(9)).await,
            moderation.delete(&grant, WishId(9)).await,
        ] {
            assert_eq!(result, Err(DomainError::NotFound(WishId(9))));
        }
    }

    #[tokio::test]
    async fn list_all_honours_include_hidden() {
        let mut repo = MockWishRepository::new();
        repo.expect_list()
            .with(eq(Visibility::IncludeHidden), eq(Page { skip: 0, limit: 10 }))
            .times(1)
            .returning(|_, _| Ok(Listing::default()));
        repo.expect_list()
            .with(eq(Visibility::VisibleOnly), eq(Page { skip: 0, limit: 10 }))
            .times(1)
            .returning(|_, _| Ok(Listing::default()));

        let moderation = ModerationService::new(Arc::new(repo));
        let grant = grant_for_tests();
        let page = Page { skip: 0, limit: 10 };
        moderation.list_all(&grant, true, page).await.unwrap();
        moderation.list_all(&grant, false, page).await.unwrap();
    }
}
