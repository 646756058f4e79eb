use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::{EnrichmentError, EnrichmentProvider, Holiday, WeatherForecast};

/// HTTP-backed provider: Nager.Date for public holidays, 7Timer for weather.
pub struct HttpEnrichment {
    client: reqwest::Client,
    holiday_base: String,
    weather_base: String,
}

impl HttpEnrichment {
    pub fn new(
        holiday_base: &str,
        weather_base: &str,
        timeout: Duration,
    ) -> Result<Self, EnrichmentError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| EnrichmentError::Network(e.to_string()))?;

        Ok(Self {
            client,
            holiday_base: holiday_base.trim_end_matches('/').to_string(),
            weather_base: weather_base.trim_end_matches('/').to_string(),
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        service: &'static str,
        url: &str,
    ) -> Result<T, EnrichmentError> {
        debug!(service, url, "Enrichment request");

        let resp = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                EnrichmentError::Timeout { service }
            } else {
                EnrichmentError::Network(e.to_string())
            }
        })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(EnrichmentError::Api {
                service,
                status: status.as_u16(),
            });
        }

        resp.json::<T>().await.map_err(|e| EnrichmentError::Decode {
            service,
            detail: e.to_string(),
        })
    }
}

#[async_trait]
impl EnrichmentProvider for HttpEnrichment {
    async fn public_holidays(
        &self,
        year: i32,
        country: &str,
    ) -> Result<Vec<Holiday>, EnrichmentError> {
        let url = format!("{}/api/v2/publicholidays/{year}/{country}", self.holiday_base);
        self.get_json("holiday", &url).await
    }

    async fn current_weather(
        &self,
        lat: f64,
        lng: f64,
    ) -> Result<WeatherForecast, EnrichmentError> {
        let url = format!(
            "{}/bin/civil.php?lat={lat}&lng={lng}&ac=1&unit=metric&output=json&product=two",
            self.weather_base
        );
        self.get_json("weather", &url).await
    }
}
