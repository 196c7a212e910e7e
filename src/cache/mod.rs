//! Resource cache bridge: one serialized snapshot per resource key.
//!
//! Once a snapshot exists it is the system of record for that resource;
//! the remote list endpoint is only consulted when there is none.

mod memory;
mod sqlite;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::resources::Record;

pub use memory::MemoryCache;
pub use sqlite::SqliteCache;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Database error: {0}")]
    Database(#[from] r2d2::Error),

    #[error("SQL error: {0}")]
    Sql(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Raw stored payload for a key.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredEntry {
    pub payload: String,
    pub saved_at: DateTime<Utc>,
}

/// A decoded collection snapshot.
#[derive(Debug, Clone)]
pub struct Snapshot<T> {
    pub records: Vec<T>,
    pub saved_at: DateTime<Utc>,
}

/// Key-value persistence for collection snapshots.
#[async_trait]
pub trait CacheBridge: Send + Sync {
    async fn load_raw(&self, key: &str) -> Result<Option<StoredEntry>, CacheError>;

    /// Full overwrite of the stored payload.
    async fn save_raw(&self, key: &str, payload: &str) -> Result<(), CacheError>;

    /// Returns whether anything was stored under the key.
    async fn clear(&self, key: &str) -> Result<bool, CacheError>;
}

pub async fn load<T: Record>(cache: &dyn CacheBridge) -> Result<Option<Snapshot<T>>, CacheError> {
    let key = T::RESOURCE.cache_key();
    match cache.load_raw(&key).await? {
        Some(entry) => {
            let records: Vec<T> = serde_json::from_str(&entry.payload)?;
            Ok(Some(Snapshot {
                records,
                saved_at: entry.saved_at,
            }))
        }
        None => Ok(None),
    }
}

pub async fn save<T: Record>(cache: &dyn CacheBridge, records: &[T]) -> Result<(), CacheError> {
    let payload = serde_json::to_string(records)?;
    cache.save_raw(&T::RESOURCE.cache_key(), &payload).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resources::Todo;

    #[tokio::test]
    async fn typed_roundtrip_through_memory_cache() {
        let cache = MemoryCache::new();
        assert!(load::<Todo>(&cache).await.unwrap().is_none());

        let todos = vec![Todo {
            id: 1,
            todo: "Walk".into(),
            completed: true,
            user_id: 3,
        }];
        save(&cache, &todos).await.unwrap();

        let snapshot = load::<Todo>(&cache).await.unwrap().unwrap();
        assert_eq!(snapshot.records, todos);

        let raw = cache.load_raw("dummyjson_todos").await.unwrap().unwrap();
        assert!(raw.payload.contains("\"userId\":3"));
    }

    #[tokio::test]
    async fn corrupt_payload_is_a_serialization_error() {
        let cache = MemoryCache::new();
        cache.save_raw("dummyjson_todos", "{not json").await.unwrap();
        let err = load::<Todo>(&cache).await.unwrap_err();
        assert!(matches!(err, CacheError::Serialization(_)));
    }
}
