//! DSL modem poller.
//!
//! Scrapes the DSL statistics page of a bonded-pair modem (Arris NVG443B
//! layout) and exports per-line error counters, SN margin, uptime and the
//! WAN connection state as Prometheus metrics.
//!
//! # Pipeline
//!
//! ```text
//! status page ──> StatsTable ──> DslStats ──> MetricSink
//!  (HTML)        (lookups)      (record)     (gauges)
//! ```
//!
//! Any failure along the way skips the cycle; previously exported values
//! stay in place until the next successful poll.

pub mod assembler;
pub mod client;
pub mod config;
pub mod metrics;
pub mod stats;
pub mod table;
pub mod uptime;

pub use assembler::{assemble, parse_stats};
pub use client::DslSource;
pub use config::{DeviceConfig, DslPollerConfig};
pub use stats::{Direction, DslStats, LineStat, Link, LinkStats, WanStatus};
pub use table::StatsTable;
pub use uptime::{Uptime, parse_uptime_secs};
