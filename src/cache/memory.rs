use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Mutex;

use super::{CacheBridge, CacheError, StoredEntry};

/// In-memory cache for tests and `--ephemeral` runs.
#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, StoredEntry>>,
    simulate_write_error: AtomicBool,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent save fail, for exercising error paths.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        self.simulate_write_error.store(simulate, Ordering::SeqCst);
    }

    pub async fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.lock().await.keys().cloned().collect();
        keys.sort();
        keys
    }
}

#[async_trait]
impl CacheBridge for MemoryCache {
    async fn load_raw(&self, key: &str) -> Result<Option<StoredEntry>, CacheError> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn save_raw(&self, key: &str, payload: &str) -> Result<(), CacheError> {
        if self.simulate_write_error.load(Ordering::SeqCst) {
            return Err(CacheError::Unavailable("simulated write failure".into()));
        }
        self.entries.lock().await.insert(
            key.to_string(),
            StoredEntry {
                payload: payload.to_string(),
                saved_at: Utc::now(),
            },
        );
        Ok(())
    }

    async fn clear(&self, key: &str) -> Result<bool, CacheError> {
        Ok(self.entries.lock().await.remove(key).is_some())
    }
}
