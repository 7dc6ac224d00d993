//! Metric declarations and publishing for current weather.

use linewatch_exporter::{MetricRegistryBuilder, MetricSink};

use crate::weather::Weather;

pub const OUTDOOR_ICON: &str = "outdoor_icon";
pub const OUTDOOR_TEMPERATURE_F: &str = "outdoor_temperature_f";
pub const OUTDOOR_WIND_SPEED_MPH: &str = "outdoor_wind_speed_mph";
pub const OUTDOOR_WIND_GUST_MPH: &str = "outdoor_wind_gust_mph";
pub const OUTDOOR_CLOUD_COVER_PCT: &str = "outdoor_cloud_cover_pct";
pub const OUTDOOR_PRECIPITATION_INTENSITY: &str = "outdoor_precipitation_intensity";
pub const OUTDOOR_PRECIPITATION_TYPE: &str = "outdoor_precipitation_type";
pub const OUTDOOR_UV_INDEX: &str = "outdoor_uv_index";

/// Icon tags the API documents.
pub const ICON_STATES: [&str; 10] = [
    "clear-day",
    "clear-night",
    "rain",
    "snow",
    "sleet",
    "wind",
    "fog",
    "cloudy",
    "partly-cloudy-day",
    "partly-cloudy-night",
];

pub const PRECIP_TYPE_STATES: [&str; 4] = ["none", "rain", "snow", "sleet"];

type ScalarField = fn(&Weather) -> Option<f64>;

const SCALAR_METRICS: [(&str, &str, ScalarField); 6] = [
    (OUTDOOR_TEMPERATURE_F, "Outdoor Temperature F°", |w| w.temperature),
    (OUTDOOR_WIND_SPEED_MPH, "Outdoor Wind Speed (mph)", |w| w.wind_speed),
    (OUTDOOR_WIND_GUST_MPH, "Outdoor Wind Gust (mph)", |w| w.wind_gust),
    (OUTDOOR_CLOUD_COVER_PCT, "Outdoor Cloud Coverage (%)", |w| w.cloud_cover),
    (
        OUTDOOR_PRECIPITATION_INTENSITY,
        "Outdoor Precipitation Intensity",
        |w| w.precip_intensity,
    ),
    (OUTDOOR_UV_INDEX, "Outdoor UV Index", |w| w.uv_index),
];

/// Declare every weather metric on `builder`.
pub fn register(builder: MetricRegistryBuilder) -> MetricRegistryBuilder {
    let builder = builder
        .state_set(OUTDOOR_ICON, "Outdoor icon of weather summary", &ICON_STATES)
        .state_set(
            OUTDOOR_PRECIPITATION_TYPE,
            "Type of precipitation",
            &PRECIP_TYPE_STATES,
        );

    SCALAR_METRICS
        .iter()
        .fold(builder, |builder, (name, help, _)| builder.gauge(name, help))
}

/// Forward one record to the sink. Absent fields are skipped.
pub fn publish(weather: &Weather, sink: &dyn MetricSink) {
    if let Some(icon) = &weather.icon {
        sink.set_state(OUTDOOR_ICON, icon);
    }
    if let Some(precip_type) = &weather.precip_type {
        sink.set_state(OUTDOOR_PRECIPITATION_TYPE, precip_type);
    }

    for (name, _, field) in &SCALAR_METRICS {
        if let Some(value) = field(weather) {
            sink.set_gauge(name, value);
        }
    }
}
