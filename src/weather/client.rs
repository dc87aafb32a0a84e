//! OpenWeather "current weather" client.
//!
//! The provider body is decoded into a typed schema. `main`, `wind` and
//! `clouds` must be present as objects; numeric leaves inside them default
//! to 0 when missing. `weather` is optional and only its first element's
//! `description` is used.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::catalog::City;
use crate::error::FetchError;
use crate::weather::types::{Observation, WeatherSource};

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5/weather";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct CurrentWeatherBody {
    main: Option<MainSection>,
    wind: Option<WindSection>,
    clouds: Option<CloudsSection>,
    weather: Option<Vec<ConditionEntry>>,
}

#[derive(Debug, Deserialize)]
struct MainSection {
    temp: Option<f64>,
    humidity: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct WindSection {
    speed: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct CloudsSection {
    all: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ConditionEntry {
    description: Option<String>,
}

/// Decode a provider body into an [`Observation`] for `city_id`.
pub fn parse_observation(city_id: u64, body: &str) -> Result<Observation, FetchError> {
    let raw: CurrentWeatherBody = serde_json::from_str(body)?;

    let main = raw.main.ok_or(FetchError::MissingSection("main"))?;
    let wind = raw.wind.ok_or(FetchError::MissingSection("wind"))?;
    let clouds = raw.clouds.ok_or(FetchError::MissingSection("clouds"))?;
    let description = raw
        .weather
        .and_then(|w| w.into_iter().next())
        .and_then(|w| w.description);

    Ok(Observation {
        city_id,
        temperature: main.temp.unwrap_or_default(),
        humidity: main.humidity.unwrap_or_default(),
        wind_speed: wind.speed.unwrap_or_default(),
        cloudiness: clouds.all.unwrap_or_default(),
        description,
        observed_at: Utc::now(),
    })
}

#[derive(Debug, Clone)]
pub struct WeatherClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl WeatherClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        })
    }
}

#[async_trait]
impl WeatherSource for WeatherClient {
    async fn fetch_current(&self, city: &City) -> Result<Observation, FetchError> {
        let resp = self
            .client
            .get(&self.base_url)
            .query(&[
                ("id", city.id.to_string()),
                ("appid", self.api_key.clone()),
                ("units", "metric".to_string()),
            ])
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = resp.text().await?;
        parse_observation(city.id, &body)
    }

    fn name(&self) -> &'static str {
        "openweather"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_full_body() {
        let body = r#"{
            "weather":[{"id":803,"main":"Clouds","description":"broken clouds"}],
            "main":{"temp":28.4,"feels_like":31.0,"humidity":74},
            "wind":{"speed":4.6,"deg":250},
            "clouds":{"all":75},
            "name":"Colombo"
        }"#;
        let o = parse_observation(1248991, body).unwrap();
        assert_eq!(o.city_id, 1248991);
        assert!((o.temperature - 28.4).abs() < 1e-9);
        assert_eq!(o.humidity, 74);
        assert!((o.wind_speed - 4.6).abs() < 1e-9);
        assert_eq!(o.cloudiness, 75);
        assert_eq!(o.description.as_deref(), Some("broken clouds"));
    }

    #[test]
    fn missing_leaves_default_to_zero() {
        let body = r#"{"main":{"humidity":null},"wind":{},"clouds":{}}"#;
        let o = parse_observation(7, body).unwrap();
        assert_eq!(o.temperature, 0.0);
        assert_eq!(o.humidity, 0);
        assert_eq!(o.wind_speed, 0.0);
        assert_eq!(o.cloudiness, 0);
        assert_eq!(o.description, None);
    }

    #[test]
    fn missing_section_is_an_error() {
        let body = r#"{"main":{"temp":10},"clouds":{"all":5}}"#;
        match parse_observation(7, body) {
            Err(FetchError::MissingSection(s)) => assert_eq!(s, "wind"),
            other => panic!("expected MissingSection, got {other:?}"),
        }
    }

    #[test]
    fn non_object_section_is_a_decode_error() {
        let body = r#"{"main":"hot","wind":{},"clouds":{}}"#;
        assert!(matches!(
            parse_observation(7, body),
            Err(FetchError::Decode(_))
        ));
    }

    #[test]
    fn empty_weather_array_has_no_description() {
        let body = r#"{"main":{"temp":1},"wind":{"speed":1},"clouds":{"all":1},"weather":[]}"#;
        assert_eq!(parse_observation(7, body).unwrap().description, None);
    }
}
