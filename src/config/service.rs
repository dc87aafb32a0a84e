// src/config/service.rs
//! Service configuration: optional TOML file, then environment overrides.
//!
//! Lookup order for the file:
//! 1) $WEATHER_CONFIG_PATH (must exist when set)
//! 2) config/weather.toml (skipped if absent)
//!
//! The API key and cache TTL have no defaults; startup fails without them.

use anyhow::{anyhow, bail, Context, Result};
use serde::Deserialize;
use std::{
    env, fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::catalog::DEFAULT_CITIES_PATH;
use crate::weather::client::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT};

pub const DEFAULT_CONFIG_PATH: &str = "config/weather.toml";
/// Upper bound on the result cache TTL (30 days).
pub const MAX_CACHE_TTL_SECS: u64 = 30 * 24 * 60 * 60;

pub const ENV_CONFIG_PATH: &str = "WEATHER_CONFIG_PATH";
pub const ENV_API_KEY: &str = "OPENWEATHER_API_KEY";
pub const ENV_BASE_URL: &str = "OPENWEATHER_BASE_URL";
pub const ENV_CITIES_PATH: &str = "WEATHER_CITIES_PATH";
pub const ENV_CACHE_TTL_SECS: &str = "WEATHER_CACHE_TTL_SECS";
pub const ENV_FETCH_TIMEOUT_SECS: &str = "WEATHER_FETCH_TIMEOUT_SECS";
pub const ENV_REDIS_URL: &str = "WEATHER_REDIS_URL";
pub const ENV_HISTORY_PATH: &str = "WEATHER_HISTORY_PATH";
pub const ENV_METRICS: &str = "WEATHER_METRICS";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_key: String,
    pub base_url: String,
    pub cities_path: PathBuf,
    pub cache_ttl: Duration,
    pub fetch_timeout: Duration,
    /// Redis cache store when set, in-process store otherwise.
    pub redis_url: Option<String>,
    /// JSONL history file when set, bounded in-memory history otherwise.
    pub history_path: Option<PathBuf>,
    pub metrics: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct FileConfig {
    provider: ProviderSection,
    catalog: CatalogSection,
    cache: CacheSection,
    history: HistorySection,
    metrics: MetricsSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ProviderSection {
    api_key: Option<String>,
    base_url: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CatalogSection {
    path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CacheSection {
    ttl_secs: Option<u64>,
    redis_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct HistorySection {
    path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct MetricsSection {
    enabled: Option<bool>,
}

impl AppConfig {
    /// Load from file (if any) and the process environment.
    pub fn load() -> Result<Self> {
        let file = match env::var(ENV_CONFIG_PATH) {
            Ok(p) => {
                let pb = PathBuf::from(p);
                if !pb.exists() {
                    bail!("{ENV_CONFIG_PATH} points to non-existent path {}", pb.display());
                }
                read_file(&pb)?
            }
            Err(_) => {
                let pb = PathBuf::from(DEFAULT_CONFIG_PATH);
                if pb.exists() {
                    read_file(&pb)?
                } else {
                    FileConfig::default()
                }
            }
        };
        Self::resolve(file, |k| env::var(k).ok())
    }

    /// Parse a TOML document and apply overrides from `lookup`.
    pub fn from_toml_str(s: &str, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let file: FileConfig = toml::from_str(s).context("parsing weather config toml")?;
        Self::resolve(file, lookup)
    }

    fn resolve(file: FileConfig, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |k: &str| lookup(k).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let api_key = var(ENV_API_KEY)
            .or(file.provider.api_key)
            .ok_or_else(|| anyhow!("missing provider API key (set {ENV_API_KEY})"))?;

        let base_url = var(ENV_BASE_URL)
            .or(file.provider.base_url)
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let cities_path = var(ENV_CITIES_PATH)
            .map(PathBuf::from)
            .or(file.catalog.path)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CITIES_PATH));

        let ttl_secs = match var(ENV_CACHE_TTL_SECS) {
            Some(v) => parse_secs(ENV_CACHE_TTL_SECS, &v)?,
            None => file.cache.ttl_secs.ok_or_else(|| {
                anyhow!("missing cache TTL (set {ENV_CACHE_TTL_SECS} or [cache].ttl_secs)")
            })?,
        };
        if ttl_secs == 0 {
            bail!("cache TTL must be greater than zero");
        }
        if ttl_secs > MAX_CACHE_TTL_SECS {
            bail!("cache TTL of {ttl_secs}s exceeds the {MAX_CACHE_TTL_SECS}s limit");
        }

        let fetch_timeout = match var(ENV_FETCH_TIMEOUT_SECS) {
            Some(v) => Duration::from_secs(parse_secs(ENV_FETCH_TIMEOUT_SECS, &v)?),
            None => file
                .provider
                .timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_TIMEOUT),
        };

        let redis_url = var(ENV_REDIS_URL).or(file.cache.redis_url);
        let history_path = var(ENV_HISTORY_PATH)
            .map(PathBuf::from)
            .or(file.history.path);

        let metrics = match var(ENV_METRICS) {
            Some(v) => matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"),
            None => file.metrics.enabled.unwrap_or(false),
        };

        Ok(Self {
            api_key,
            base_url,
            cities_path,
            cache_ttl: Duration::from_secs(ttl_secs),
            fetch_timeout,
            redis_url,
            history_path,
            metrics,
        })
    }
}

fn read_file(path: &Path) -> Result<FileConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading weather config from {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))
}

fn parse_secs(key: &str, v: &str) -> Result<u64> {
    v.parse::<u64>()
        .with_context(|| format!("{key} must be a whole number of seconds, got '{v}'"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let m: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| m.get(k).cloned()
    }

    #[test]
    fn file_values_with_defaults() {
        let toml = r#"
            [provider]
            api_key = "file-key"

            [cache]
            ttl_secs = 300
        "#;
        let c = AppConfig::from_toml_str(toml, env_of(&[])).unwrap();
        assert_eq!(c.api_key, "file-key");
        assert_eq!(c.base_url, DEFAULT_BASE_URL);
        assert_eq!(c.cities_path, PathBuf::from(DEFAULT_CITIES_PATH));
        assert_eq!(c.cache_ttl, Duration::from_secs(300));
        assert_eq!(c.fetch_timeout, DEFAULT_TIMEOUT);
        assert!(c.redis_url.is_none());
        assert!(c.history_path.is_none());
        assert!(!c.metrics);
    }

    #[test]
    fn env_overrides_file() {
        let toml = r#"
            [provider]
            api_key = "file-key"
            timeout_secs = 3
            [cache]
            ttl_secs = 300
        "#;
        let c = AppConfig::from_toml_str(
            toml,
            env_of(&[
                (ENV_API_KEY, "env-key"),
                (ENV_CACHE_TTL_SECS, "60"),
                (ENV_REDIS_URL, "redis://127.0.0.1/"),
                (ENV_METRICS, "1"),
            ]),
        )
        .unwrap();
        assert_eq!(c.api_key, "env-key");
        assert_eq!(c.cache_ttl, Duration::from_secs(60));
        assert_eq!(c.fetch_timeout, Duration::from_secs(3));
        assert_eq!(c.redis_url.as_deref(), Some("redis://127.0.0.1/"));
        assert!(c.metrics);
    }

    #[test]
    fn ttl_is_required() {
        let err = AppConfig::from_toml_str("", env_of(&[(ENV_API_KEY, "k")])).unwrap_err();
        assert!(err.to_string().contains("cache TTL"), "{err}");
    }

    #[test]
    fn api_key_is_required() {
        let err = AppConfig::from_toml_str("", env_of(&[(ENV_CACHE_TTL_SECS, "10")])).unwrap_err();
        assert!(err.to_string().contains("API key"), "{err}");
    }

    #[test]
    fn zero_or_garbage_ttl_rejected() {
        assert!(AppConfig::from_toml_str(
            "",
            env_of(&[(ENV_API_KEY, "k"), (ENV_CACHE_TTL_SECS, "0")])
        )
        .is_err());
        assert!(AppConfig::from_toml_str(
            "",
            env_of(&[(ENV_API_KEY, "k"), (ENV_CACHE_TTL_SECS, "soon")])
        )
        .is_err());
    }

    #[test]
    fn oversized_ttl_rejected() {
        let err = AppConfig::from_toml_str(
            "[cache]\nttl_secs = 9223372036854775807\n",
            env_of(&[(ENV_API_KEY, "k")]),
        )
        .unwrap_err();
        assert!(err.to_string().contains("exceeds"), "{err}");
        let err = AppConfig::from_toml_str(
            "",
            env_of(&[(ENV_API_KEY, "k"), (ENV_CACHE_TTL_SECS, "18446744073709551615")]),
        )
        .unwrap_err();
        assert!(err.to_string().contains("exceeds"), "{err}");

        let max = MAX_CACHE_TTL_SECS.to_string();
        let c = AppConfig::from_toml_str(
            "",
            env_of(&[(ENV_API_KEY, "k"), (ENV_CACHE_TTL_SECS, max.as_str())]),
        )
        .unwrap();
        assert_eq!(c.cache_ttl, Duration::from_secs(MAX_CACHE_TTL_SECS));
        assert!(AppConfig::from_toml_str(
            "",
            env_of(&[(ENV_API_KEY, "k"), (ENV_CACHE_TTL_SECS, "2592001")])
        )
        .is_err());
    }

    #[test]
    fn blank_env_values_are_ignored() {
        let c = AppConfig::from_toml_str(
            "[cache]\nttl_secs = 5\n",
            env_of(&[(ENV_API_KEY, "k"), (ENV_REDIS_URL, "  ")]),
        )
        .unwrap();
        assert!(c.redis_url.is_none());
    }
}
