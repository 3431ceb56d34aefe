//! # AdminSession
//!
//! Password login issuing opaque bearer tokens, and the credential check
//! guarding every moderation and statistics operation.
//!
//! Two credentials are accepted by the same check:
//! - a token issued by [`AdminSession::login`] and still present in the
//!   injected [`SessionStore`];
//! - the configured password itself, for older clients.
//!
//! With no password configured nothing authorizes and login reports
//! [`DomainError::ServiceUnavailable`].

use std::sync::Arc;

use chrono::Duration;
use domains::{Clock, CredentialKind, DomainError, Result, SessionStore, TokenGenerator};
use secrecy::{ExposeSecret, SecretString};
use subtle::ConstantTimeEq;
use tracing::{info, warn};

/// Proof that a request passed [`AdminSession::authorize`]. Moderation and
/// statistics operations take one of these, so they cannot run ungated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdminGrant {
    credential: CredentialKind,
}

impl AdminGrant {
    pub fn credential(&self) -> CredentialKind {
        self.credential
    }
}

pub struct AdminSession {
    password: Option<SecretString>,
    sessions: Arc<dyn SessionStore>,
    tokens: Arc<dyn TokenGenerator>,
    clock: Arc<dyn Clock>,
    /// `None` keeps tokens until logout or restart.
    token_ttl: Option<Duration>,
}

impl AdminSession {
    pub fn new(
        password: Option<SecretString>,
        sessions: Arc<dyn SessionStore>,
        tokens: Arc<dyn TokenGenerator>,
        clock: Arc<dyn Clock>,
        token_ttl: Option<Duration>,
    ) -> Self {
        let password = password.filter(|p| !p.expose_secret().is_empty());
        if password.is_none() {
            warn!("no administrator password configured; admin login is disabled");
        }
        Self {
            password,
            sessions,
            tokens,
            clock,
            token_ttl,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.password.is_some()
    }

    /// Issues a fresh token when `password` matches the configured one.
    pub async fn login(&self, password: &str) -> Result<String> {
        let Some(expected) = &self.password else {
            return Err(DomainError::ServiceUnavailable(
                "admin password is not configured".into(),
            ));
        };

        let accepted: bool = expected.expose_secret().as_bytes().ct_eq(password.as_bytes()).into();
        if !accepted {
            warn!("admin login rejected");
            return Err(DomainError::Unauthorized);
        }

        let token = self.tokens.generate()?;
        // A TTL past the representable range never expires.
        let expires_at = self
            .token_ttl
            .and_then(|ttl| self.clock.now().checked_add_signed(ttl));
        self.sessions.insert(token.clone(), expires_at).await?;

        info!(?expires_at, "admin logged in");
        Ok(token)
    }

    /// Discards a token. Unknown or missing tokens are not an error.
    pub async fn logout(&self, token: Option<&str>) -> Result<()> {
        if let Some(token) = token.filter(|t| !t.is_empty()) {
            if self.sessions.remove(token).await? {
                info!("admin logged out");
            }
        }
        Ok(())
    }

    /// Which credential variant, if any, `credential` satisfies.
    pub async fn check(&self, credential: &str) -> Result<Option<CredentialKind>> {
        if credential.is_empty() {
            return Ok(None);
        }
        if self.sessions.is_live(credential, self.clock.now()).await? {
            return Ok(Some(CredentialKind::IssuedToken));
        }
        let matches_password = self.password.as_ref().is_some_and(|expected| {
            expected.expose_secret().as_bytes().ct_eq(credential.as_bytes()).into()
        });
        Ok(matches_password.then_some(CredentialKind::ConfiguredPassword))
    }

    pub async fn verify(&self, credential: &str) -> Result<bool> {
        Ok(self.check(credential).await?.is_some())
    }

    /// Gate for admin operations: a grant, or [`DomainError::Unauthorized`].
    pub async fn authorize(&self, credential: Option<&str>) -> Result<AdminGrant> {
        let Some(credential) = credential else {
            return Err(DomainError::Unauthorized);
        };
        match self.check(credential).await? {
            Some(credential) => Ok(AdminGrant { credential }),
            None => Err(DomainError::Unauthorized),
        }
    }

    pub async fn purge_expired(&self) -> Result<u64> {
        self.sessions.purge_expired(self.clock.now()).await
    }
}

#[cfg(test)]
pub(crate) fn grant_for_tests() -> AdminGrant {
    AdminGrant {
        credential: CredentialKind::IssuedToken,
    }
}
