// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod api;
pub mod cache;
pub mod catalog;
pub mod comfort;
pub mod config;
pub mod error;
pub mod history;
pub mod metrics;
pub mod pipeline;
pub mod weather;

// ---- Re-exports for stable public API ----
pub use crate::api::router;
pub use crate::config::AppConfig;
pub use crate::pipeline::{AggregationPipeline, RankedCity};

use anyhow::Context;
use axum::Router;
use std::sync::Arc;
use tracing::info;

use crate::cache::{CacheStore, MemoryCacheStore, RedisCacheStore, ResultCache};
use crate::catalog::CityCatalog;
use crate::history::{HistorySink, JsonlHistory, MemoryHistory};
use crate::weather::{WeatherClient, WeatherSource};

/// Wire catalog, provider client, history sink and cache store from config.
pub fn build_pipeline(config: &AppConfig) -> anyhow::Result<AggregationPipeline> {
    let catalog = Arc::new(CityCatalog::load(&config.cities_path));

    let client = WeatherClient::new(
        config.base_url.clone(),
        config.api_key.clone(),
        config.fetch_timeout,
    )
    .context("building weather provider client")?;
    let source: Arc<dyn WeatherSource> = Arc::new(client);

    let history: Arc<dyn HistorySink> = match &config.history_path {
        Some(p) => {
            info!(path = %p.display(), "history: jsonl file");
            Arc::new(JsonlHistory::new(p))
        }
        None => {
            info!("history: in-memory");
            Arc::new(MemoryHistory::default())
        }
    };

    let store: Arc<dyn CacheStore> = match &config.redis_url {
        Some(url) => {
            info!("result cache: redis");
            Arc::new(RedisCacheStore::new(url).context("building redis pool")?)
        }
        None => {
            info!("result cache: in-memory");
            Arc::new(MemoryCacheStore::new())
        }
    };
    let cache = ResultCache::new(store, config.cache_ttl);

    Ok(AggregationPipeline::new(catalog, source, history, cache))
}

/// Full application router, including `/metrics` when enabled.
pub async fn app(config: AppConfig) -> anyhow::Result<Router> {
    let pipeline = Arc::new(build_pipeline(&config)?);
    let mut router = api::router(api::AppState::new(pipeline));

    if config.metrics {
        let m = metrics::Metrics::init(config.cache_ttl.as_secs())?;
        router = router.merge(m.router());
    }

    info!(
        ttl_secs = config.cache_ttl.as_secs(),
        metrics = config.metrics,
        "router ready"
    );
    Ok(router)
}
