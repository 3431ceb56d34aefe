//! Request and response bodies, and the boundary validation the core relies on.

use domains::{ClientId, Page};
use serde::{Deserialize, Serialize};
use services::CreateWish;
use thiserror::Error;

pub const MAX_CONTENT_CHARS: usize = 500;
pub const MAX_NAME_CHARS: usize = 50;
pub const MAX_CLIENT_ID_CHARS: usize = 64;
pub const DEFAULT_PAGE_LIMIT: u64 = 100;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct ValidationError(pub String);

fn within(field: &str, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.chars().count() > max {
        return Err(ValidationError(format!("{field} must be at most {max} characters")));
    }
    Ok(())
}

/// Validates a raw client identifier before it is trusted as a correlation key.
pub fn client_id(raw: Option<&str>) -> Result<Option<ClientId>, ValidationError> {
    if let Some(raw) = raw {
        within("client_id", raw, MAX_CLIENT_ID_CHARS)?;
    }
    Ok(ClientId::parse(raw))
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListQuery {
    pub skip: Option<u64>,
    pub limit: Option<u64>,
}

impl ListQuery {
    pub fn page(&self) -> Result<Page, ValidationError> {
        let limit = self.limit.unwrap_or(DEFAULT_PAGE_LIMIT);
        if limit == 0 {
            return Err(ValidationError("limit must be greater than 0".into()));
        }
        Ok(Page {
            skip: self.skip.unwrap_or(0),
            limit,
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdminListQuery {
    pub skip: Option<u64>,
    pub limit: Option<u64>,
    pub include_hidden: Option<bool>,
}

impl AdminListQuery {
    pub fn page(&self) -> Result<Page, ValidationError> {
        ListQuery {
            skip: self.skip,
            limit: self.limit,
        }
        .page()
    }

    pub fn include_hidden(&self) -> bool {
        self.include_hidden.unwrap_or(true)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateWishRequest {
    pub content: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub client_id: Option<String>,
}

impl CreateWishRequest {
    /// Enforces length limits and resolves the effective client id
    /// (payload first, then `header`).
    pub fn validate(self, header: Option<ClientId>) -> Result<CreateWish, ValidationError> {
        let content_chars = self.content.trim().chars().count();
        if content_chars == 0 {
            return Err(ValidationError("content must not be empty".into()));
        }
        if content_chars > MAX_CONTENT_CHARS {
            return Err(ValidationError(format!(
                "content must be at most {MAX_CONTENT_CHARS} characters"
            )));
        }
        if let Some(name) = &self.name {
            within("name", name.trim(), MAX_NAME_CHARS)?;
        }
        if let Some(raw) = &self.client_id {
            within("client_id", raw, MAX_CLIENT_ID_CHARS)?;
        }
        let client_id = ClientId::resolve(
            self.client_id.as_deref(),
            header.as_ref().map(ClientId::as_str),
        );

        Ok(CreateWish {
            content: self.content,
            name: self.name,
            tag: self.tag,
            client_id,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LikeResponse {
    pub success: bool,
    pub likes: u64,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

impl MessageResponse {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub success: bool,
    pub token: Option<String>,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(content: &str) -> CreateWishRequest {
        CreateWishRequest {
            content: content.into(),
            name: None,
            tag: None,
            client_id: None,
        }
    }

    #[test]
    fn content_bounds_are_counted_in_characters() {
        assert!(request("   ").validate(None).is_err());
        assert!(request(&"福".repeat(500)).validate(None).is_ok());
        assert!(request(&"福".repeat(501)).validate(None).is_err());
    }

    #[test]
    fn long_names_and_client_ids_are_rejected() {
        let mut long_name = request("hi");
        long_name.name = Some("n".repeat(51));
        assert!(long_name.validate(None).is_err());

        let mut long_client = request("hi");
        long_client.client_id = Some("c".repeat(65));
        assert!(long_client.validate(None).is_err());
    }

    #[test]
    fn payload_client_id_overrides_header() {
        let header = ClientId::parse(Some("header"));

        let mut with_payload = request("hi");
        with_payload.client_id = Some("payload".into());
        let create = with_payload.validate(header.clone()).unwrap();
        assert_eq!(create.client_id.unwrap().as_str(), "payload");

        let mut empty_payload = request("hi");
        empty_payload.client_id = Some(String::new());
        let create = empty_payload.validate(header.clone()).unwrap();
        assert_eq!(create.client_id.unwrap().as_str(), "header");

        let mut padded_payload = request("hi");
        padded_payload.client_id = Some(" payload ".into());
        let create = padded_payload.validate(header).unwrap();
        assert_eq!(create.client_id.unwrap().as_str(), " payload ");
    }

    #[test]
    fn zero_limit_is_invalid() {
        let query = ListQuery {
            skip: None,
            limit: Some(0),
        };
        assert!(query.page().is_err());
        assert_eq!(ListQuery::default().page().unwrap(), Page { skip: 0, limit: 100 });
    }

    #[test]
    fn admin_listing_includes_hidden_by_default() {
        assert!(AdminListQuery::default().include_hidden());
    }
}
