//! # Aggregation Pipeline
//! catalog → per-city fetch + score → rank → cache.
//!
//! Policy:
//! - one city's fetch failure drops that city only,
//! - a history append failure drops that row only,
//! - ranking is a stable descending sort on the comfort index, so equal
//!   scores keep catalog order; ranks are dense 1..N over the survivors,
//! - the whole ranked list is cached under one key; a hit skips every fetch.
//!
//! The check-then-compute-then-store sequence is not locked. Two concurrent
//! misses both compute and both write, which is harmless here.

use metrics::{counter, gauge, histogram};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::cache::ResultCache;
use crate::catalog::{City, CityCatalog};
use crate::comfort;
use crate::history::HistorySink;
use crate::weather::{Observation, WeatherSource};

/// Exported unit of the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedCity {
    pub city_id: u64,
    pub city_name: String,
    #[serde(rename = "weatherData")]
    pub observation: Observation,
    pub comfort_index: f64,
    pub rank: u32,
}

/// A successfully fetched and scored city awaiting its rank.
#[derive(Debug, Clone)]
pub struct ScoredCity {
    pub city: City,
    pub observation: Observation,
    pub comfort_index: f64,
}

impl ScoredCity {
    pub fn new(city: City, observation: Observation) -> Self {
        let comfort_index = comfort::score(&observation);
        Self {
            city,
            observation,
            comfort_index,
        }
    }

    fn with_rank(self, rank: u32) -> RankedCity {
        RankedCity {
            city_id: self.city.id,
            city_name: self.city.name,
            observation: self.observation,
            comfort_index: self.comfort_index,
            rank,
        }
    }
}

/// Stable sort by comfort index (descending), then dense ranks from 1.
pub fn rank(mut scored: Vec<ScoredCity>) -> Vec<RankedCity> {
    scored.sort_by(|a, b| {
        b.comfort_index
            .partial_cmp(&a.comfort_index)
            .unwrap_or(Ordering::Equal)
    });
    scored
        .into_iter()
        .zip(1u32..)
        .map(|(s, r)| s.with_rank(r))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Miss,
}

impl CacheStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheStatus::Hit => "HIT",
            CacheStatus::Miss => "MISS",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Snapshot {
    pub cities: Vec<RankedCity>,
    pub cache: CacheStatus,
}

pub struct AggregationPipeline {
    catalog: Arc<CityCatalog>,
    source: Arc<dyn WeatherSource>,
    history: Arc<dyn HistorySink>,
    cache: ResultCache,
}

impl AggregationPipeline {
    pub fn new(
        catalog: Arc<CityCatalog>,
        source: Arc<dyn WeatherSource>,
        history: Arc<dyn HistorySink>,
        cache: ResultCache,
    ) -> Self {
        Self {
            catalog,
            source,
            history,
            cache,
        }
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    pub fn catalog(&self) -> &CityCatalog {
        &self.catalog
    }

    /// Ranked cities, from cache when fresh. Never fails.
    pub async fn run(&self) -> Vec<RankedCity> {
        self.run_with_status().await.cities
    }

    pub async fn run_with_status(&self) -> Snapshot {
        if let Some(cities) = self.cache.get_snapshot().await {
            counter!("weather_cache_hits_total").increment(1);
            debug!(count = cities.len(), "serving ranked cities from cache");
            return Snapshot {
                cities,
                cache: CacheStatus::Hit,
            };
        }

        counter!("weather_cache_misses_total").increment(1);
        let cities = self.compute().await;
        self.cache.put_snapshot(&cities).await;
        Snapshot {
            cities,
            cache: CacheStatus::Miss,
        }
    }

    /// Full uncached pass over the catalog.
    pub async fn compute(&self) -> Vec<RankedCity> {
        let t0 = Instant::now();
        let cities = self.catalog.list();
        let mut scored = Vec::with_capacity(cities.len());
        let mut failed = 0usize;

        for city in cities {
            match self.source.fetch_current(city).await {
                Ok(obs) => {
                    counter!("weather_fetch_total", "outcome" => "ok").increment(1);
                    self.persist(&obs).await;
                    scored.push(ScoredCity::new(city.clone(), obs));
                }
                Err(e) => {
                    counter!("weather_fetch_total", "outcome" => "error").increment(1);
                    failed += 1;
                    warn!(
                        city_id = city.id,
                        city = %city.name,
                        provider = self.source.name(),
                        error = %e,
                        "weather fetch failed; skipping city"
                    );
                }
            }
        }

        let ranked = rank(scored);

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("weather_pipeline_duration_ms").record(ms);
        gauge!("weather_ranked_cities").set(ranked.len() as f64);
        info!(
            ranked = ranked.len(),
            failed,
            elapsed_ms = ms as u64,
            "computed comfort ranking"
        );

        ranked
    }

    async fn persist(&self, obs: &Observation) {
        if let Err(e) = self.history.append(obs).await {
            counter!("weather_history_persist_errors_total").increment(1);
            warn!(city_id = obs.city_id, error = %e, "history append failed");
        }
    }
}
