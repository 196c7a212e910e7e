use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use rusqlite::params;

use super::{CacheBridge, CacheError, StoredEntry};
use crate::state::DbPool;

/// SQLite implementation backed by the `resource_cache` table.
pub struct SqliteCache {
    pool: DbPool,
}

impl SqliteCache {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CacheBridge for SqliteCache {
    async fn load_raw(&self, key: &str) -> Result<Option<StoredEntry>, CacheError> {
        let conn = self.pool.get()?;

        let result: Result<(String, String), rusqlite::Error> = conn.query_row(
            "SELECT payload_json, saved_at FROM resource_cache WHERE key = ?1",
            params![key],
            |row| Ok((row.get(0)?, row.get(1)?)),
        );

        match result {
            Ok((payload, saved_at)) => Ok(Some(StoredEntry {
                payload,
                saved_at: parse_saved_at(&saved_at),
            })),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn save_raw(&self, key: &str, payload: &str) -> Result<(), CacheError> {
        let conn = self.pool.get()?;

        conn.execute(
            "INSERT INTO resource_cache (key, payload_json, saved_at)
             VALUES (?1, ?2, datetime('now'))
             ON CONFLICT(key) DO UPDATE SET
               payload_json = excluded.payload_json,
               saved_at = excluded.saved_at",
            params![key, payload],
        )?;

        Ok(())
    }

    async fn clear(&self, key: &str) -> Result<bool, CacheError> {
        let conn = self.pool.get()?;
        let rows = conn.execute("DELETE FROM resource_cache WHERE key = ?1", params![key])?;
        Ok(rows > 0)
    }
}

fn parse_saved_at(db_time: &str) -> DateTime<Utc> {
    NaiveDateTime::parse_from_str(db_time, "%Y-%m-%d %H:%M:%S")
        .map(|dt| dt.and_utc())
        .unwrap_or_else(|_| {
            tracing::warn!("Unreadable cache timestamp: {}", db_time);
            Utc::now()
        })
}
