pub mod client;

pub use client::HttpEnrichment;

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EnrichmentError {
    #[error("{service} request timed out")]
    Timeout { service: &'static str },

    #[error("Network error: {0}")]
    Network(String),

    #[error("{service} returned status {status}")]
    Api { service: &'static str, status: u16 },

    #[error("Malformed {service} response: {detail}")]
    Decode {
        service: &'static str,
        detail: String,
    },
}

/// A public holiday as reported by the holiday provider. `date` is kept in
/// the provider's `YYYY-MM-DD` form and compared as a string.
#[derive(Debug, Clone, Deserialize)]
pub struct Holiday {
    pub date: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Wind10m {
    pub direction: String,
    pub speed: i32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeatherPoint {
    pub timepoint: i64,
    pub weather: String,
    pub temp2m: i32,
    pub rh2m: String,
    pub wind10m: Wind10m,
}

/// Forecast series as returned by the 7Timer civil product. `init` is the
/// model initialisation time (`YYYYMMDDHH`); points are offsets from it.
#[derive(Debug, Clone, Deserialize)]
pub struct WeatherForecast {
    pub init: String,
    pub dataseries: Vec<WeatherPoint>,
}

/// External holiday + weather lookups consulted on single-event fetch.
/// Injected behind this trait so tests can substitute a canned double.
#[async_trait]
pub trait EnrichmentProvider: Send + Sync {
    async fn public_holidays(
        &self,
        year: i32,
        country: &str,
    ) -> Result<Vec<Holiday>, EnrichmentError>;

    async fn current_weather(&self, lat: f64, lng: f64)
        -> Result<WeatherForecast, EnrichmentError>;
}

/// The `_metadata` block of a single-event response.
#[derive(Debug, Clone, Serialize)]
pub struct EventMetadata {
    #[serde(rename = "wind-speed")]
    pub wind_speed: String,
    pub weather: String,
    pub humidity: String,
    pub temperature: String,
    pub holiday: String,
    pub weekend: bool,
}

impl EventMetadata {
    /// Combines the current weather snapshot with the year's holiday list
    /// for the given date. The first forecast point is the current one.
    pub fn build(
        forecast: &WeatherForecast,
        holidays: &[Holiday],
        date: NaiveDate,
    ) -> Result<Self, EnrichmentError> {
        let point = forecast
            .dataseries
            .first()
            .ok_or_else(|| EnrichmentError::Decode {
                service: "weather",
                detail: "empty dataseries".to_string(),
            })?;

        let iso_date = date.format("%Y-%m-%d").to_string();
        let holiday = holidays
            .iter()
            .find(|h| h.date == iso_date)
            .map(|h| h.name.clone())
            .unwrap_or_default();

        Ok(Self {
            wind_speed: format!("{} KM", point.wind10m.speed),
            weather: point.weather.clone(),
            humidity: point.rh2m.clone(),
            temperature: format!("{} C", point.temp2m),
            holiday,
            weekend: date.weekday().num_days_from_monday() >= 5,
        })
    }
}
