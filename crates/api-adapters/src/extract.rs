//! Request extractors for caller identity.

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
};
use domains::ClientId;

use crate::dto;
use crate::error::ApiError;

pub const CLIENT_ID_HEADER: &str = "x-client-id";
pub const ADMIN_TOKEN_HEADER: &str = "x-admin-token";
const AUTHORIZATION_HEADER: &str = "authorization";

/// The self-reported client identifier from `X-Client-Id`, if any.
///
/// Not authenticated; it only correlates a browser with its own wishes.
#[derive(Debug, Clone, Default)]
pub struct ClientIdentity(pub Option<ClientId>);

impl ClientIdentity {
    pub fn client_id(&self) -> Option<&ClientId> {
        self.0.as_ref()
    }
}

impl<S> FromRequestParts<S> for ClientIdentity
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(CLIENT_ID_HEADER)
            .and_then(|value| value.to_str().ok());
        Ok(Self(dto::client_id(raw)?))
    }
}

/// Admin credential from `X-Admin-Token`, falling back to
/// `Authorization: Bearer <credential>`. Verification happens in the service.
#[derive(Debug, Clone, Default)]
pub struct AdminBearer(pub Option<String>);

impl AdminBearer {
    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

impl<S> FromRequestParts<S> for AdminBearer
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = |name: &str| {
            parts
                .headers
                .get(name)
                .and_then(|value| value.to_str().ok())
                .map(str::trim)
                .filter(|value| !value.is_empty())
        };

        let credential = header(ADMIN_TOKEN_HEADER).or_else(|| {
            header(AUTHORIZATION_HEADER)
                .and_then(|value| value.strip_prefix("Bearer "))
                .map(str::trim)
        });

        Ok(Self(credential.map(str::to_owned)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts(headers: &[(&str, &str)]) -> Parts {
        let mut builder = Request::builder().uri("/");
        for (name, value) in headers {
            builder = builder.header(*name, *value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn client_identity_reads_the_header() {
        let mut with = parts(&[("X-Client-Id", "abc")]);
        let identity = ClientIdentity::from_request_parts(&mut with, &()).await.unwrap();
        assert_eq!(identity.client_id().unwrap().as_str(), "abc");

        let mut blank = parts(&[("X-Client-Id", "")]);
        let identity = ClientIdentity::from_request_parts(&mut blank, &()).await.unwrap();
        assert!(identity.client_id().is_none());
    }

    #[tokio::test]
    async fn oversized_client_identity_is_rejected() {
        let long = "c".repeat(65);
        let mut request = parts(&[("X-Client-Id", long.as_str())]);
        assert!(ClientIdentity::from_request_parts(&mut request, &()).await.is_err());
    }

    #[tokio::test]
    async fn admin_bearer_prefers_the_token_header() {
        let mut both = parts(&[("X-Admin-Token", "t1"), ("Authorization", "Bearer t2")]);
        let bearer = AdminBearer::from_request_parts(&mut both, &()).await.unwrap();
        assert_eq!(bearer.as_deref(), Some("t1"));

        let mut authorization = parts(&[("Authorization", "Bearer t2")]);
        let bearer = AdminBearer::from_request_parts(&mut authorization, &()).await.unwrap();
        assert_eq!(bearer.as_deref(), Some("t2"));

        let mut basic = parts(&[("Authorization", "Basic abc")]);
        let bearer = AdminBearer::from_request_parts(&mut basic, &()).await.unwrap();
        assert_eq!(bearer.as_deref(), None);
    }
}
