// src/cache/memory.rs
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;

use crate::cache::CacheStore;
use crate::error::CacheStoreError;

/// Deadline used when `now + ttl` does not fit in an `Instant` (~30 years).
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// In-process TTL store. Expired entries are dropped lazily on access.
#[derive(Debug, Default)]
pub struct MemoryCacheStore {
    inner: Mutex<HashMap<String, Entry>>,
}

#[derive(Debug)]
struct Entry {
    value: String,
    expires_at: Instant,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn deadline(now: Instant, ttl: Duration) -> Instant {
        now.checked_add(ttl)
            .or_else(|| now.checked_add(FAR_FUTURE))
            .unwrap_or(now)
    }

    fn purge_expired(map: &mut HashMap<String, Entry>, now: Instant) {
        map.retain(|_, e| e.expires_at > now);
    }
}

#[async_trait::async_trait]
impl CacheStore for MemoryCacheStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheStoreError> {
        let now = Instant::now();
        let mut map = self.inner.lock();
        let fresh = map
            .get(key)
            .filter(|e| e.expires_at > now)
            .map(|e| e.value.clone());
        if fresh.is_none() {
            map.remove(key);
        }
        Ok(fresh)
    }

    async fn put(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheStoreError> {
        let expires_at = Self::deadline(Instant::now(), ttl);
        self.inner
            .lock()
            .insert(key.to_string(), Entry { value, expires_at });
        Ok(())
    }

    async fn ping(&self) -> Result<(), CacheStoreError> {
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>, CacheStoreError> {
        let mut map = self.inner.lock();
        Self::purge_expired(&mut map, Instant::now());
        let mut keys: Vec<String> = map.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }

    async fn ttl(&self, key: &str) -> Result<Option<Duration>, CacheStoreError> {
        let now = Instant::now();
        let map = self.inner.lock();
        Ok(map
            .get(key)
            .filter(|e| e.expires_at > now)
            .map(|e| e.expires_at - now))
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
