//! # Domain Models
//!
//! These structs represent the core entities of the wish board.
//! Wish ids are integers assigned monotonically by the repository.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Placeholder stored when a wish is submitted without a display name.
pub const DEFAULT_DISPLAY_NAME: &str = "Anonymous";

/// Stable identifier of a wish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WishId(pub i64);

impl fmt::Display for WishId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The fixed set of wish categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WishTag {
    Blessing,
    Reflection,
    Aspiration,
}

impl WishTag {
    pub const ALL: [WishTag; 3] = [WishTag::Blessing, WishTag::Reflection, WishTag::Aspiration];

    pub fn as_str(&self) -> &'static str {
        match self {
            WishTag::Blessing => "blessing",
            WishTag::Reflection => "reflection",
            WishTag::Aspiration => "aspiration",
        }
    }

    /// Maps a submitted tag onto the fixed set. Anything unrecognised,
    /// including a missing tag, becomes [`WishTag::Blessing`].
    pub fn normalize(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("reflection") => WishTag::Reflection,
            Some("aspiration") => WishTag::Aspiration,
            _ => WishTag::Blessing,
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tag| tag.as_str() == raw)
    }
}

impl fmt::Display for WishTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque, self-reported client identifier.
///
/// It correlates a browser with its own actions and is never treated as
/// authenticated identity. The value is kept verbatim so ownership and rate
/// limits match it exactly; only the empty string counts as absent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientId(String);

impl ClientId {
    pub fn parse(raw: Option<&str>) -> Option<Self> {
        raw.filter(|value| !value.is_empty())
            .map(|value| Self(value.to_owned()))
    }

    /// Resolves the effective identifier for a request. A value embedded in
    /// the payload wins over the header value.
    pub fn resolve(payload: Option<&str>, header: Option<&str>) -> Option<Self> {
        Self::parse(payload).or_else(|| Self::parse(header))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short prefix safe to put in log lines.
    pub fn redacted(&self) -> String {
        let prefix: String = self.0.chars().take(6).collect();
        format!("{prefix}…")
    }
}

/// The fundamental unit of content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wish {
    pub id: WishId,
    pub content: String,
    pub name: String,
    pub tag: WishTag,
    pub likes: u64,
    pub client_id: Option<ClientId>,
    pub is_hidden: bool,
    pub created_at: DateTime<Utc>,
}

impl Wish {
    /// True only when `viewer` is present and matches the owning client.
    pub fn is_owned_by(&self, viewer: Option<&ClientId>) -> bool {
        matches!((&self.client_id, viewer), (Some(owner), Some(viewer)) if owner == viewer)
    }
}

/// A normalized wish ready to be persisted. The repository assigns the id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewWish {
    pub content: String,
    pub name: String,
    pub tag: WishTag,
    pub client_id: Option<ClientId>,
    pub created_at: DateTime<Utc>,
}

/// Which wishes a listing may return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    VisibleOnly,
    IncludeHidden,
}

impl Visibility {
    pub fn admits(&self, wish: &Wish) -> bool {
        match self {
            Visibility::VisibleOnly => !wish.is_hidden,
            Visibility::IncludeHidden => true,
        }
    }
}

/// Skip/limit pagination window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub skip: u64,
    pub limit: u64,
}

impl Default for Page {
    fn default() -> Self {
        Self { skip: 0, limit: 100 }
    }
}

/// Actions subject to per-client rate limiting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Create,
    Like,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Create => "create",
            ActionKind::Like => "like",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Append-only log entry used to count actions within the trailing window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionRecord {
    pub client_id: ClientId,
    pub action: ActionKind,
    pub at: DateTime<Utc>,
}

/// How an admin request proved its authority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialKind {
    /// A token previously issued by a successful login.
    IssuedToken,
    /// The configured administrator password, accepted as a bearer value
    /// for older clients.
    ConfiguredPassword,
}
