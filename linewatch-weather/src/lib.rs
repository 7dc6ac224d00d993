//! Weather poller.
//!
//! Polls the [Pirate Weather](https://pirateweather.net) forecast API for
//! current conditions at one location and exports them as Prometheus
//! metrics.
//!
//! Unlike the DSL poller, a partial response is still published: fields the
//! API leaves out are skipped and their series keep the last known value.
//! Only a transport failure or a response without a `currently` object skips
//! the whole cycle.

pub mod client;
pub mod config;
pub mod metrics;
pub mod weather;

pub use client::WeatherSource;
pub use config::{WeatherConfig, WeatherPollerConfig};
pub use weather::{Weather, parse_forecast};
