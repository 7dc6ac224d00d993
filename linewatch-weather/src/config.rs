//! Configuration for the weather poller.

use std::time::Duration;

use linewatch_common::{Error, LoggingConfig, PollerConfig, Result};
use linewatch_exporter::PrometheusConfig;
use serde::{Deserialize, Serialize};

/// Complete weather poller configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherPollerConfig {
    /// Forecast API settings.
    #[serde(default)]
    pub weather: WeatherConfig,

    /// Metrics endpoint settings.
    #[serde(default)]
    pub prometheus: PrometheusConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Pirate Weather API settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// Forecast endpoint without a trailing key or location.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// API key. Usually supplied through `PIRATE_WEATHER_API_KEY`.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Location as `"lat,long"`. Usually supplied through `LAT_LONG`.
    #[serde(default)]
    pub lat_long: Option<String>,

    /// Request timeout in seconds. No timeout when unset.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_endpoint() -> String {
    "https://api.pirateweather.net/forecast".to_string()
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            api_key: None,
            lat_long: None,
            timeout_secs: None,
        }
    }
}

impl WeatherConfig {
    /// Replace the key and location with any values given on the command
    /// line or in the environment.
    pub fn apply_overrides(&mut self, api_key: Option<String>, lat_long: Option<String>) {
        if api_key.is_some() {
            self.api_key = api_key;
        }
        if lat_long.is_some() {
            self.lat_long = lat_long;
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// The request URL, `{endpoint}/{api_key}/{lat_long}`.
    ///
    /// Fails if the key or location has not been set.
    pub fn forecast_url(&self) -> Result<String> {
        let api_key = self
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                Error::validation("No API key set (weather.api_key or PIRATE_WEATHER_API_KEY)")
            })?;
        let lat_long = self
            .lat_long
            .as_deref()
            .filter(|l| !l.is_empty())
            .ok_or_else(|| Error::validation("No location set (weather.lat_long or LAT_LONG)"))?;

        Ok(format!(
            "{}/{}/{}",
            self.endpoint.trim_end_matches('/'),
            api_key,
            lat_long
        ))
    }
}

/// Check a `"lat,long"` location string.
fn validate_lat_long(lat_long: &str) -> Result<()> {
    let invalid = || {
        Error::validation(format!(
            "Invalid location '{}', expected \"lat,long\"",
            lat_long
        ))
    };

    let (lat, long) = lat_long.split_once(',').ok_or_else(invalid)?;
    let lat: f64 = lat.trim().parse().map_err(|_| invalid())?;
    let long: f64 = long.trim().parse().map_err(|_| invalid())?;

    if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&long) {
        return Err(invalid());
    }
    Ok(())
}

impl PollerConfig for WeatherPollerConfig {
    fn logging(&self) -> &LoggingConfig {
        &self.logging
    }

    fn validate(&self) -> Result<()> {
        reqwest::Url::parse(&self.weather.endpoint).map_err(|e| {
            Error::validation(format!(
                "Invalid weather endpoint '{}': {}",
                self.weather.endpoint, e
            ))
        })?;

        if self.weather.timeout_secs == Some(0) {
            return Err(Error::validation("weather.timeout_secs must be greater than 0"));
        }

        if let Some(lat_long) = &self.weather.lat_long {
            validate_lat_long(lat_long)?;
        }

        self.prometheus.validate()
    }
}
