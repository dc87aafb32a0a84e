//! Error taxonomy for the aggregation pipeline.
//!
//! Every variant here is recoverable at the smallest unit it concerns:
//! a catalog failure empties the catalog, a fetch failure drops one city,
//! a persist failure drops one history row, and a cache store failure
//! turns into a cache miss. None of them abort a request.

use std::path::PathBuf;

use thiserror::Error;

/// The static city document could not be read or understood.
#[derive(Debug, Error)]
pub enum CatalogLoadError {
    #[error("reading city list from {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parsing city list: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("city '{name}' has a non-numeric code '{code}'")]
    InvalidCode { code: String, name: String },
}

/// One city's current weather could not be obtained.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("provider request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("provider answered with status {0}")]
    Status(u16),
    #[error("provider body is not valid weather json: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("provider body has no `{0}` object")]
    MissingSection(&'static str),
}

/// An observation could not be appended to the history sink.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("history io: {0}")]
    Io(#[from] std::io::Error),
    #[error("history encode: {0}")]
    Encode(#[from] serde_json::Error),
}

/// The result cache backend is unreachable or misbehaving.
#[derive(Debug, Error)]
pub enum CacheStoreError {
    #[error("cache store unavailable: {0}")]
    Unavailable(String),
}

impl From<redis::RedisError> for CacheStoreError {
    fn from(e: redis::RedisError) -> Self {
        Self::Unavailable(e.to_string())
    }
}

impl From<deadpool_redis::PoolError> for CacheStoreError {
    fn from(e: deadpool_redis::PoolError) -> Self {
        Self::Unavailable(e.to_string())
    }
}
