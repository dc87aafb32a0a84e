use std::sync::Arc;

use axum::{
    extract::State,
    http::{HeaderName, HeaderValue},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tower_http::cors::CorsLayer;

use crate::cache::CacheStore;
use crate::pipeline::AggregationPipeline;

/// Response header reporting whether the ranking came from cache.
pub const CACHE_HEADER: &str = "x-weather-cache";

const VALUE_PREVIEW_CHARS: usize = 80;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<AggregationPipeline>,
}

impl AppState {
    pub fn new(pipeline: Arc<AggregationPipeline>) -> Self {
        Self { pipeline }
    }

    fn store(&self) -> &Arc<dyn CacheStore> {
        self.pipeline.cache().store()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/api/weather/cities", get(ranked_cities))
        .route("/api/weather/debug/cache", get(debug_cache))
        .layer(CorsLayer::very_permissive())
        .with_state(state)
}

async fn ranked_cities(State(state): State<AppState>) -> impl IntoResponse {
    tracing::info!("GET /api/weather/cities");
    let snap = state.pipeline.run_with_status().await;
    (
        [(
            HeaderName::from_static(CACHE_HEADER),
            HeaderValue::from_static(snap.cache.as_str()),
        )],
        Json(snap.cities),
    )
}

#[derive(Debug, Serialize)]
pub struct CacheDebug {
    pub cache_status: &'static str,
    pub store: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keys_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keys: Option<Vec<CacheKeyInfo>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CacheKeyInfo {
    pub key: String,
    pub ttl_seconds: Option<u64>,
    pub value_preview: Option<String>,
}

async fn debug_cache(State(state): State<AppState>) -> Json<CacheDebug> {
    let store = state.store();
    match inspect_store(store.as_ref()).await {
        Ok(keys) => Json(CacheDebug {
            cache_status: "CONNECTED",
            store: store.name(),
            keys_count: Some(keys.len()),
            keys: Some(keys),
            error: None,
        }),
        Err(e) => {
            tracing::warn!(store = store.name(), error = %e, "cache store unreachable");
            Json(CacheDebug {
                cache_status: "DISCONNECTED",
                store: store.name(),
                keys_count: None,
                keys: None,
                error: Some(e.to_string()),
            })
        }
    }
}

async fn inspect_store(
    store: &dyn CacheStore,
) -> Result<Vec<CacheKeyInfo>, crate::error::CacheStoreError> {
    store.ping().await?;
    let mut out = Vec::new();
    for key in store.keys().await? {
        let ttl = store.ttl(&key).await?;
        let value = store.get(&key).await?;
        out.push(CacheKeyInfo {
            ttl_seconds: ttl.map(|d| d.as_secs()),
            value_preview: value.map(|v| v.chars().take(VALUE_PREVIEW_CHARS).collect()),
            key,
        });
    }
    Ok(out)
}
