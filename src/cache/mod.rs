//! Result cache: a TTL key/value store holding the ranked snapshot.
//!
//! The store only deals in strings; [`ResultCache`] owns the single
//! "all cities" key and the JSON encoding of the ranked list. Store
//! failures never reach callers: a failed read is a miss, a failed
//! write is logged.

pub mod memory;
pub mod redis_store;

use metrics::counter;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

use crate::error::CacheStoreError;
use crate::pipeline::RankedCity;

pub use self::memory::MemoryCacheStore;
pub use self::redis_store::RedisCacheStore;

/// Key of the one aggregate the service caches.
pub const ALL_CITIES_KEY: &str = "weather:all-cities";

#[async_trait::async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheStoreError>;
    async fn put(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheStoreError>;

    /// Connectivity check for the debug surface.
    async fn ping(&self) -> Result<(), CacheStoreError>;
    async fn keys(&self) -> Result<Vec<String>, CacheStoreError>;
    /// Remaining lifetime; `None` when the key is absent or never expires.
    async fn ttl(&self, key: &str) -> Result<Option<Duration>, CacheStoreError>;

    fn name(&self) -> &'static str;
}

#[derive(Clone)]
pub struct ResultCache {
    store: Arc<dyn CacheStore>,
    ttl: Duration,
}

impl ResultCache {
    pub fn new(store: Arc<dyn CacheStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn store(&self) -> &Arc<dyn CacheStore> {
        &self.store
    }

    /// Cached snapshot, or `None` on miss, outage, or unreadable payload.
    pub async fn get_snapshot(&self) -> Option<Vec<RankedCity>> {
        let raw = match self.store.get(ALL_CITIES_KEY).await {
            Ok(v) => v?,
            Err(e) => {
                warn!(store = self.store.name(), error = %e, "cache read failed; treating as miss");
                counter!("weather_cache_store_errors_total").increment(1);
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(list) => Some(list),
            Err(e) => {
                warn!(store = self.store.name(), error = %e, "cached snapshot unreadable; treating as miss");
                None
            }
        }
    }

    pub async fn put_snapshot(&self, ranked: &[RankedCity]) {
        let payload = match serde_json::to_string(ranked) {
            Ok(p) => p,
            Err(e) => {
                warn!(error = %e, "could not encode snapshot for cache");
                return;
            }
        };
        if let Err(e) = self.store.put(ALL_CITIES_KEY, payload, self.ttl).await {
            warn!(store = self.store.name(), error = %e, "cache write failed");
            counter!("weather_cache_store_errors_total").increment(1);
        }
    }
}
