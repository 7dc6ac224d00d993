//! Metrics plumbing shared by the linewatch pollers.
//!
//! Pollers implement [`Source`] and publish through a [`MetricSink`]. The
//! Prometheus-backed [`MetricRegistry`] is the production sink; it is shared
//! with the HTTP server that serves it to scrapers.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐     ┌─────────────────┐     ┌─────────────────┐
//! │  Device / API   │────>│    Poll loop    │────>│ MetricRegistry  │
//! │   (Source)      │     │  (fixed tick)   │     │   (gauges)      │
//! └─────────────────┘     └─────────────────┘     └────────┬────────┘
//!                                                          │
//!                                                 ┌────────▼────────┐
//!                                                 │   HTTP Server   │
//!                                                 │   (/metrics)    │
//!                                                 └─────────────────┘
//! ```

pub mod config;
pub mod http;
pub mod poll;
pub mod registry;
pub mod runner;
pub mod sink;

pub use config::PrometheusConfig;
pub use http::{BoundHttpServer, HttpServer};
pub use poll::{CycleOutcome, PollLoop, PollState, Source};
pub use registry::{MetricRegistry, MetricRegistryBuilder, SharedRegistry};
pub use runner::{RunOptions, run_poller, run_poller_until};
pub use sink::{MemorySink, MetricSink};
