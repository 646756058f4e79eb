use std::env;
use std::time::Duration;

pub mod cors;
pub mod security;

pub use cors::create_cors_layer;
pub use security::apply_security_headers;

/// Reference location for weather lookups (Sydney, Australia).
const DEFAULT_REF_LAT: f64 = -33.865143;
const DEFAULT_REF_LNG: f64 = 151.209_900;

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub holiday_api_url: String,
    pub weather_api_url: String,
    pub holiday_country: String,
    pub ref_lat: f64,
    pub ref_lng: f64,
    pub enrichment_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3001".to_string()),
            holiday_api_url: env::var("HOLIDAY_API_URL")
                .unwrap_or_else(|_| "https://date.nager.at".to_string()),
            weather_api_url: env::var("WEATHER_API_URL")
                .unwrap_or_else(|_| "https://www.7timer.info".to_string()),
            holiday_country: env::var("HOLIDAY_COUNTRY").unwrap_or_else(|_| "AU".to_string()),
            ref_lat: env_f64("REF_LAT", DEFAULT_REF_LAT),
            ref_lng: env_f64("REF_LNG", DEFAULT_REF_LNG),
            enrichment_timeout: Duration::from_secs(env_u64("ENRICHMENT_TIMEOUT_SECS", 10)),
        }
    }
}

fn env_f64(key: &str, default: f64) -> f64 {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_u64(key: &str, default: u64) -> u64 {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
