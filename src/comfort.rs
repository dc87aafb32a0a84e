//! Comfort index scoring.
//!
//! Four sub-scores measure distance from an ideal reading, each floored at 0:
//! - temperature : 22 °C, -4 per degree
//! - humidity    : 50 %, -1.2 per point
//! - wind        : calm, -10 per m/s
//! - cloudiness  : 40 %, -1.5 per point
//!
//! Index = 0.4*temperature + 0.3*humidity + 0.2*wind + 0.1*cloud,
//! clamped to [0,100]. Pure, no I/O.

use serde::Serialize;

use crate::weather::Observation;

const IDEAL_TEMP_C: f64 = 22.0;
const IDEAL_HUMIDITY: f64 = 50.0;
const IDEAL_CLOUDINESS: f64 = 40.0;

const W_TEMPERATURE: f64 = 0.4;
const W_HUMIDITY: f64 = 0.3;
const W_WIND: f64 = 0.2;
const W_CLOUD: f64 = 0.1;

/// Sub-scores behind one comfort index.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ComfortBreakdown {
    pub temperature: f64,
    pub humidity: f64,
    pub wind: f64,
    pub cloud: f64,
}

impl ComfortBreakdown {
    pub fn of(o: &Observation) -> Self {
        Self::from_readings(
            o.temperature,
            f64::from(o.humidity),
            o.wind_speed,
            f64::from(o.cloudiness),
        )
    }

    pub fn from_readings(temp: f64, humidity: f64, wind_speed: f64, cloudiness: f64) -> Self {
        fn floor0(x: f64) -> f64 {
            x.max(0.0)
        }
        Self {
            temperature: floor0(100.0 - (temp - IDEAL_TEMP_C).abs() * 4.0),
            humidity: floor0(100.0 - (humidity - IDEAL_HUMIDITY).abs() * 1.2),
            wind: floor0(100.0 - wind_speed * 10.0),
            cloud: floor0(100.0 - (cloudiness - IDEAL_CLOUDINESS).abs() * 1.5),
        }
    }

    /// Weighted blend, clamped to [0,100].
    pub fn index(&self) -> f64 {
        let raw = self.temperature * W_TEMPERATURE
            + self.humidity * W_HUMIDITY
            + self.wind * W_WIND
            + self.cloud * W_CLOUD;
        raw.clamp(0.0, 100.0)
    }
}

/// Comfort index of one observation, in [0,100].
pub fn score(o: &Observation) -> f64 {
    ComfortBreakdown::of(o).index()
}
