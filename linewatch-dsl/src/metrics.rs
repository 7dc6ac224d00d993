//! Metric declarations and publishing for DSL stats.

use linewatch_exporter::{MetricRegistryBuilder, MetricSink};

use crate::stats::{Direction, DslStats, LineStat, Link, LinkStats, WanStatus};

pub const CONNECTION_STATE: &str = "connection_state";
pub const SUPERFRAME_ERROR_COUNT: &str = "superframe_error_count";
pub const HEC_ERROR_COUNT: &str = "hec_error_count";
pub const TOTAL_ERR_SECONDS: &str = "total_err_seconds";
pub const SN_MARGIN_DB: &str = "sn_margin_db";

const LINE_LABELS: [&str; 2] = ["link", "direction"];

type StatField = fn(&LinkStats) -> &LineStat;

/// Per-line, per-direction gauges: name, help, record field.
const LINE_METRICS: [(&str, &str, StatField); 4] = [
    (SUPERFRAME_ERROR_COUNT, "Super Frame Errors", |l| &l.superframe_errors),
    (HEC_ERROR_COUNT, "HEC Errors", |l| &l.hec_errors),
    (TOTAL_ERR_SECONDS, "Total ES", |l| &l.total_err_seconds),
    (SN_MARGIN_DB, "SN Margin (dB)", |l| &l.sn_margin_db),
];

/// Declare every DSL metric on `builder`.
pub fn register(builder: MetricRegistryBuilder) -> MetricRegistryBuilder {
    let wan_states: Vec<&str> = WanStatus::ALL.iter().map(WanStatus::as_str).collect();

    let builder = builder
        .gauge(Link::One.uptime_metric(), "Uptime of Link1")
        .gauge(Link::Two.uptime_metric(), "Uptime of Link2")
        .state_set(CONNECTION_STATE, "WAN Connection", &wan_states);

    LINE_METRICS
        .iter()
        .fold(builder, |builder, (name, help, _)| {
            builder.labeled_gauge(name, help, &LINE_LABELS)
        })
}

/// Forward one record to the sink.
pub fn publish(stats: &DslStats, sink: &dyn MetricSink) {
    for link in Link::ALL {
        let link_stats = stats.link(link);
        sink.set_gauge(link.uptime_metric(), link_stats.uptime_secs as f64);

        for (name, _, field) in &LINE_METRICS {
            let stat = field(link_stats);
            for direction in Direction::ALL {
                sink.set_labeled(
                    name,
                    &[("link", link.label()), ("direction", direction.label())],
                    stat.value(direction),
                );
            }
        }
    }

    sink.set_state(CONNECTION_STATE, stats.wan_status.as_str());
}
