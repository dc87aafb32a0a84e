// src/weather/types.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::City;
use crate::error::FetchError;

/// One current-weather snapshot for one city. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Observation {
    pub city_id: u64,
    pub temperature: f64, // °C
    pub humidity: u32,    // %
    pub wind_speed: f64,  // m/s
    pub cloudiness: u32,  // %
    pub description: Option<String>,
    pub observed_at: DateTime<Utc>,
}

/// Anything that can produce the current observation for a city.
#[async_trait::async_trait]
pub trait WeatherSource: Send + Sync {
    async fn fetch_current(&self, city: &City) -> Result<Observation, FetchError>;
    fn name(&self) -> &'static str;
}
