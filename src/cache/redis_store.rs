// src/cache/redis_store.rs
use deadpool_redis::{Config as RedisConfig, Pool, Runtime};
use redis::AsyncCommands;
use std::time::Duration;

use crate::cache::CacheStore;
use crate::error::CacheStoreError;

/// Redis-backed store; expiry is delegated to `SET EX`.
pub struct RedisCacheStore {
    pool: Pool,
}

impl RedisCacheStore {
    /// Build the pool. No connection is opened until first use.
    pub fn new(redis_url: &str) -> anyhow::Result<Self> {
        let cfg = RedisConfig::from_url(redis_url);
        let pool = cfg.create_pool(Some(Runtime::Tokio1))?;
        Ok(Self { pool })
    }
}

/// Map a `TTL` reply to a remaining lifetime.
/// -2 means no such key, -1 means no expiry; both have none.
fn ttl_from_reply(secs: i64) -> Option<Duration> {
    u64::try_from(secs).ok().map(Duration::from_secs)
}

#[async_trait::async_trait]
impl CacheStore for RedisCacheStore {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheStoreError> {
        let mut conn = self.pool.get().await?;
        let v: Option<String> = conn.get(key).await?;
        Ok(v)
    }

    async fn put(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheStoreError> {
        let mut conn = self.pool.get().await?;
        // SET EX rejects 0; sub-second TTLs round up to one second.
        let secs = ttl.as_secs().max(1);
        let _: () = conn.set_ex(key, value, secs).await?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), CacheStoreError> {
        let mut conn = self.pool.get().await?;
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }

    async fn keys(&self) -> Result<Vec<String>, CacheStoreError> {
        let mut conn = self.pool.get().await?;
        let mut keys: Vec<String> = conn.keys("*").await?;
        keys.sort();
        Ok(keys)
    }

    async fn ttl(&self, key: &str) -> Result<Option<Duration>, CacheStoreError> {
        let mut conn = self.pool.get().await?;
        let secs: i64 = conn.ttl(key).await?;
        Ok(ttl_from_reply(secs))
    }

    fn name(&self) -> &'static str {
        "redis"
    }
}
