//! # SQLite adapter
//!
//! Maps the `wishes` and `rate_limits` tables onto the domain models.
//! Timestamps are stored as UTC milliseconds so range filters compare integers.

use std::collections::HashMap;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domains::{
    ActionKind, ActionLog, ActionRecord, ClientId, DomainError, Listing, NewWish, Page, Result,
    TagTotals, Visibility, Wish, WishId, WishRepository, WishTag,
};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use tracing::info;

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS wishes (
        id         INTEGER PRIMARY KEY AUTOINCREMENT,
        content    TEXT    NOT NULL,
        name       TEXT    NOT NULL,
        tag        TEXT    NOT NULL,
        likes      INTEGER NOT NULL DEFAULT 0,
        client_id  TEXT,
        is_hidden  INTEGER NOT NULL DEFAULT 0,
        created_at INTEGER NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_wishes_created ON wishes (created_at DESC, id DESC)",
    "CREATE TABLE IF NOT EXISTS rate_limits (
        id         INTEGER PRIMARY KEY AUTOINCREMENT,
        client_id  TEXT    NOT NULL,
        action     TEXT    NOT NULL,
        created_at INTEGER NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_rate_limits_lookup ON rate_limits (client_id, action, created_at)",
];

const WISH_COLUMNS: &str = "id, content, name, tag, likes, client_id, is_hidden, created_at";

/// Both durable collections behind one pool.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Opens (creating if missing) the database at `url` and ensures the schema.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(DomainError::storage)?
            .create_if_missing(true);

        // Every connection to `:memory:` is a separate database, so pin one.
        let in_memory = url.contains(":memory:");
        let pool = SqlitePoolOptions::new()
            .max_connections(if in_memory { 1 } else { max_connections.max(1) })
            .idle_timeout(if in_memory { None } else { Some(std::time::Duration::from_secs(600)) })
            .max_lifetime(if in_memory { None } else { Some(std::time::Duration::from_secs(1800)) })
            .connect_with(options)
            .await
            .map_err(DomainError::storage)?;

        let store = Self { pool };
        store.ensure_schema().await?;
        info!(url, "sqlite store ready");
        Ok(store)
    }

    async fn ensure_schema(&self) -> Result<()> {
        for statement in SCHEMA {
            sqlx::query(*statement)
                .execute(&self.pool)
                .await
                .map_err(DomainError::storage)?;
        }
        Ok(())
    }
}

fn millis(at: DateTime<Utc>) -> i64 {
    at.timestamp_millis()
}

fn row_to_wish(row: &SqliteRow) -> Result<Wish> {
    let created_at: i64 = row.try_get("created_at").map_err(DomainError::storage)?;
    let tag: String = row.try_get("tag").map_err(DomainError::storage)?;
    let likes: i64 = row.try_get("likes").map_err(DomainError::storage)?;
    let client_id: Option<String> = row.try_get("client_id").map_err(DomainError::storage)?;

    Ok(Wish {
        id: WishId(row.try_get("id").map_err(DomainError::storage)?),
        content: row.try_get("content").map_err(DomainError::storage)?,
        name: row.try_get("name").map_err(DomainError::storage)?,
        tag: WishTag::normalize(Some(&tag)),
        likes: u64::try_from(likes).unwrap_or(0),
        client_id: ClientId::parse(client_id.as_deref()),
        is_hidden: row.try_get("is_hidden").map_err(DomainError::storage)?,
        created_at: DateTime::from_timestamp_millis(created_at).ok_or_else(|| {
            DomainError::Storage(format!("invalid created_at {created_at}"))
        })?,
    })
}

fn to_sql_int(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

#[async_trait]
impl WishRepository for SqliteStore {
    async fn insert(&self, wish: NewWish) -> Result<Wish> {
        let row = sqlx::query(&format!(
            "INSERT INTO wishes (content, name, tag, likes, client_id, is_hidden, created_at) \
             VALUES (?, ?, ?, 0, ?, 0, ?) RETURNING {WISH_COLUMNS}"
        ))
        .bind(&wish.content)
        .bind(&wish.name)
        .bind(wish.tag.as_str())
        .bind(wish.client_id.as_ref().map(ClientId::as_str))
        .bind(millis(wish.created_at))
        .fetch_one(&self.pool)
        .await
        .map_err(DomainError::storage)?;

        row_to_wish(&row)
    }

    async fn get(&self, id: WishId) -> Result<Option<Wish>> {
        let row = sqlx::query(&format!("SELECT {WISH_COLUMNS} FROM wishes WHERE id = ?"))
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await
            .map_err(DomainError::storage)?;

        row.as_ref().map(row_to_wish).transpose()
    }

    async fn list(&self, visibility: Visibility, page: Page) -> Result<Listing> {
        let include_hidden = visibility == Visibility::IncludeHidden;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM wishes WHERE (? OR is_hidden = 0)")
            .bind(include_hidden)
            .fetch_one(&self.pool)
            .await
            .map_err(DomainError::storage)?;

        let rows = sqlx::query(&format!(
            "SELECT {WISH_COLUMNS} FROM wishes WHERE (? OR is_hidden = 0) \
             ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?"
        ))
        .bind(include_hidden)
        .bind(to_sql_int(page.limit))
        .bind(to_sql_int(page.skip))
        .fetch_all(&self.pool)
        .await
        .map_err(DomainError::storage)?;

        Ok(Listing {
            wishes: rows.iter().map(row_to_wish).collect::<Result<_>>()?,
            total: u64::try_from(total).unwrap_or(0),
        })
    }

    /// Single-statement increment; concurrent likes cannot lose updates.
    async fn increment_likes(&self, id: WishId) -> Result<Option<u64>> {
        let likes: Option<i64> =
            sqlx::query_scalar("UPDATE wishes SET likes = likes + 1 WHERE id = ? RETURNING likes")
                .bind(id.0)
                .fetch_optional(&self.pool)
                .await
                .map_err(DomainError::storage)?;

        Ok(likes.map(|likes| u64::try_from(likes).unwrap_or(0)))
    }

    async fn set_hidden(&self, id: WishId, hidden: bool) -> Result<bool> {
        let result = sqlx::query("UPDATE wishes SET is_hidden = ? WHERE id = ?")
            .bind(hidden)
            .bind(id.0)
            .execute(&self.pool)
            .await
            .map_err(DomainError::storage)?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: WishId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM wishes WHERE id = ?")
            .bind(id.0)
            .execute(&self.pool)
            .await
            .map_err(DomainError::storage)?;
        Ok(result.rows_affected() > 0)
    }

    async fn aggregate(&self, since: DateTime<Utc>) -> Result<HashMap<WishTag, TagTotals>> {
        let rows = sqlx::query(
            "SELECT tag, COUNT(*) AS wishes, COALESCE(SUM(likes), 0) AS likes, \
             COALESCE(SUM(created_at >= ?), 0) AS recent FROM wishes GROUP BY tag",
        )
        .bind(millis(since))
        .fetch_all(&self.pool)
        .await
        .map_err(DomainError::storage)?;

        let mut totals: HashMap<WishTag, TagTotals> = HashMap::new();
        for row in &rows {
            let tag: String = row.try_get("tag").map_err(DomainError::storage)?;
            let count = |column: &str| -> Result<u64> {
                let value: i64 = row.try_get(column).map_err(DomainError::storage)?;
                Ok(u64::try_from(value).unwrap_or(0))
            };
            // Legacy rows with unknown tags fold into the default tag.
            let entry = totals.entry(WishTag::normalize(Some(&tag))).or_default();
            entry.wishes += count("wishes")?;
            entry.likes += count("likes")?;
            entry.recent += count("recent")?;
        }
        Ok(totals)
    }
}

#[async_trait]
impl ActionLog for SqliteStore {
    async fn append(&self, record: ActionRecord) -> Result<()> {
        sqlx::query("INSERT INTO rate_limits (client_id, action, created_at) VALUES (?, ?, ?)")
            .bind(record.client_id.as_str())
            .bind(record.action.as_str())
            .bind(millis(record.at))
            .execute(&self.pool)
            .await
            .map_err(DomainError::storage)?;
        Ok(())
    }

    async fn count_since(
        &self,
        client_id: &ClientId,
        action: ActionKind,
        since: DateTime<Utc>,
    ) -> Result<u64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM rate_limits WHERE client_id = ? AND action = ? AND created_at >= ?",
        )
        .bind(client_id.as_str())
        .bind(action.as_str())
        .bind(millis(since))
        .fetch_one(&self.pool)
        .await
        .map_err(DomainError::storage)?;

        Ok(u64::try_from(count).unwrap_or(0))
    }

    async fn purge_before(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query("DELETE FROM rate_limits WHERE created_at < ?")
            .bind(millis(cutoff))
            .execute(&self.pool)
            .await
            .map_err(DomainError::storage)?;
        Ok(result.rows_affected())
    }
}
