//! Current-conditions record decoded from a forecast response.

use chrono::{DateTime, Utc};
use linewatch_common::PollError;
use serde::{Deserialize, Serialize};

/// Conditions from the `currently` block of a forecast.
///
/// Every field is optional. The API omits fields it has no data for, and an
/// absent field simply leaves its metric untouched for the cycle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Weather {
    /// Observation time, Unix seconds.
    #[serde(rename = "time")]
    pub timestamp: Option<i64>,
    /// Summary icon tag, e.g. `partly-cloudy-day`.
    pub icon: Option<String>,
    /// Degrees Fahrenheit.
    pub temperature: Option<f64>,
    /// Miles per hour.
    pub wind_speed: Option<f64>,
    pub wind_gust: Option<f64>,
    /// Fraction of sky covered, 0 to 1.
    pub cloud_cover: Option<f64>,
    /// Inches of liquid water per hour.
    pub precip_intensity: Option<f64>,
    /// `none`, `rain`, `snow` or `sleet`.
    pub precip_type: Option<String>,
    pub uv_index: Option<f64>,
}

impl Weather {
    /// Observation time as a UTC timestamp.
    pub fn observed_at(&self) -> Option<DateTime<Utc>> {
        self.timestamp.and_then(|secs| DateTime::from_timestamp(secs, 0))
    }
}

#[derive(Debug, Deserialize)]
struct Forecast {
    currently: Option<Weather>,
}

/// Decode the `currently` block of a forecast response body.
///
/// The body must be a JSON object with a `currently` object; anything else
/// is a [`PollError::Structural`] error.
pub fn parse_forecast(body: &str) -> Result<Weather, PollError> {
    let forecast: Forecast = serde_json::from_str(body)
        .map_err(|e| PollError::structural(format!("invalid forecast response: {}", e)))?;

    forecast
        .currently
        .ok_or_else(|| PollError::structural("forecast response has no `currently` object"))
}
