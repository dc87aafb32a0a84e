//! Upstream weather provider: observation model, response schema, HTTP client.

pub mod client;
pub mod types;

pub use client::{parse_observation, WeatherClient, DEFAULT_BASE_URL};
pub use types::{Observation, WeatherSource};
