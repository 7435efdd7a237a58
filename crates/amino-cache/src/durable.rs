//! libSQL-backed cache that survives restarts.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use crate::backend::CacheBackend;
use crate::error::CacheError;
use crate::pattern::KeyPattern;

/// Expiry sentinel for entries written without a TTL.
const NEVER: i64 = i64::MAX;

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS cache_entries (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    stored_at INTEGER NOT NULL,
    expires_at INTEGER NOT NULL
)";

/// Cache entries in a local libSQL database, one row per key.
///
/// Expiry has one-second resolution. Expired rows read as absent and are
/// deleted on the read that discovers them.
#[derive(Clone)]
pub struct LibsqlBackend {
    conn: libsql::Connection,
}

impl LibsqlBackend {
    /// Open (or create) a cache database. `":memory:"` gives a private
    /// in-memory database.
    pub async fn open_local(path: &str) -> Result<Self, CacheError> {
        let db = libsql::Builder::new_local(path).build().await?;
        let conn = db.connect()?;
        conn.execute(SCHEMA, ()).await?;
        tracing::debug!(path, "opened cache database");
        Ok(Self { conn })
    }

    /// Delete every expired row. Returns the number removed.
    pub async fn purge_expired(&self) -> Result<u64, CacheError> {
        let now = Utc::now().timestamp();
        Ok(self
            .conn
            .execute(
                "DELETE FROM cache_entries WHERE expires_at <= ?1",
                libsql::params![now],
            )
            .await?)
    }
}

fn expiry_from(now: i64, ttl: Option<Duration>) -> i64 {
    ttl.map_or(NEVER, |ttl| {
        // Round sub-second TTLs up so a write is never born expired.
        let secs = ttl.as_secs() + u64::from(ttl.subsec_nanos() > 0);
        now.saturating_add(i64::try_from(secs).unwrap_or(NEVER))
    })
}

#[async_trait]
impl CacheBackend for LibsqlBackend {
    fn name(&self) -> &'static str {
        "libsql"
    }

    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut rows = self
            .conn
            .query(
                "SELECT value, expires_at FROM cache_entries WHERE key = ?1",
                libsql::params![key],
            )
            .await?;

        let Some(row) = rows.next().await? else {
            return Ok(None);
        };
        let value: String = row.get(0)?;
        let expires_at: i64 = row.get(1)?;

        if expires_at <= Utc::now().timestamp() {
            self.conn
                .execute(
                    "DELETE FROM cache_entries WHERE key = ?1 AND expires_at = ?2",
                    libsql::params![key, expires_at],
                )
                .await?;
            return Ok(None);
        }
        Ok(Some(value))
    }

    async fn set(&self, key: &str, value: String, ttl: Option<Duration>) -> Result<(), CacheError> {
        let now = Utc::now().timestamp();
        let expires_at = expiry_from(now, ttl);
        self.conn
            .execute(
                "INSERT INTO cache_entries (key, value, stored_at, expires_at)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(key) DO UPDATE SET
                    value = excluded.value,
                    stored_at = excluded.stored_at,
                    expires_at = excluded.expires_at",
                libsql::params![key, value, now, expires_at],
            )
            .await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool, CacheError> {
        let removed = self
            .conn
            .execute(
                "DELETE FROM cache_entries WHERE key = ?1",
                libsql::params![key],
            )
            .await?;
        Ok(removed > 0)
    }

    async fn delete_matching(&self, pattern: &KeyPattern) -> Result<u64, CacheError> {
        Ok(self
            .conn
            .execute(
                "DELETE FROM cache_entries WHERE key GLOB ?1",
                libsql::params![pattern.as_str()],
            )
            .await?)
    }
}
