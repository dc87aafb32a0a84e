// tests/common/mod.rs
//
// Shared test doubles for pipeline and HTTP tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use city_comfort::cache::{CacheStore, MemoryCacheStore, ResultCache};
use city_comfort::catalog::{City, CityCatalog};
use city_comfort::error::{CacheStoreError, FetchError, PersistError};
use city_comfort::history::{HistorySink, MemoryHistory};
use city_comfort::weather::{Observation, WeatherSource};
use city_comfort::AggregationPipeline;

pub fn obs(city_id: u64, temp: f64, humidity: u32, wind: f64, clouds: u32) -> Observation {
    Observation {
        city_id,
        temperature: temp,
        humidity,
        wind_speed: wind,
        cloudiness: clouds,
        description: Some("scattered clouds".into()),
        observed_at: Utc::now(),
    }
}

/// Scripted provider: readings per city id; unknown ids fail with 404.
#[derive(Default)]
pub struct StubSource {
    readings: HashMap<u64, (f64, u32, f64, u32)>,
    calls: AtomicUsize,
}

impl StubSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, id: u64, temp: f64, humidity: u32, wind: f64, clouds: u32) -> Self {
        self.readings.insert(id, (temp, humidity, wind, clouds));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl WeatherSource for StubSource {
    async fn fetch_current(&self, city: &City) -> Result<Observation, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.readings.get(&city.id) {
            Some(&(t, h, w, c)) => Ok(obs(city.id, t, h, w, c)),
            None => Err(FetchError::Status(404)),
        }
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}

pub struct FailingHistory;

#[async_trait::async_trait]
impl HistorySink for FailingHistory {
    async fn append(&self, _obs: &Observation) -> Result<(), PersistError> {
        Err(PersistError::Io(std::io::Error::new(
            std::io::ErrorKind::Other,
            "disk full",
        )))
    }
}

/// Store that is always down.
pub struct DownStore;

#[async_trait::async_trait]
impl CacheStore for DownStore {
    async fn get(&self, _key: &str) -> Result<Option<String>, CacheStoreError> {
        Err(CacheStoreError::Unavailable("connection refused".into()))
    }
    async fn put(&self, _key: &str, _value: String, _ttl: Duration) -> Result<(), CacheStoreError> {
        Err(CacheStoreError::Unavailable("connection refused".into()))
    }
    async fn ping(&self) -> Result<(), CacheStoreError> {
        Err(CacheStoreError::Unavailable("connection refused".into()))
    }
    async fn keys(&self) -> Result<Vec<String>, CacheStoreError> {
        Err(CacheStoreError::Unavailable("connection refused".into()))
    }
    async fn ttl(&self, _key: &str) -> Result<Option<Duration>, CacheStoreError> {
        Err(CacheStoreError::Unavailable("connection refused".into()))
    }
    fn name(&self) -> &'static str {
        "down"
    }
}

pub struct Harness {
    pub source: Arc<StubSource>,
    pub history: Arc<MemoryHistory>,
    pub store: Arc<MemoryCacheStore>,
    pub pipeline: Arc<AggregationPipeline>,
}

pub fn catalog(cities: &[(u64, &str)]) -> Arc<CityCatalog> {
    Arc::new(CityCatalog::from_cities(
        cities.iter().map(|&(id, name)| City::new(id, name)).collect(),
    ))
}

pub fn harness(cities: &[(u64, &str)], source: StubSource, ttl: Duration) -> Harness {
    let source = Arc::new(source);
    let history = Arc::new(MemoryHistory::default());
    let store = Arc::new(MemoryCacheStore::new());
    let pipeline = Arc::new(AggregationPipeline::new(
        catalog(cities),
        source.clone(),
        history.clone(),
        ResultCache::new(store.clone(), ttl),
    ));
    Harness {
        source,
        history,
        store,
        pipeline,
    }
}
