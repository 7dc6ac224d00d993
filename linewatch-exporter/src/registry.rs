//! Prometheus-backed metric registry.
//!
//! Every metric a poller publishes is declared up front through
//! [`MetricRegistryBuilder`]. Updates for names, label sets or states that
//! were never declared are logged and dropped.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::AtomicU64;

use parking_lot::Mutex;
use prometheus_client::encoding::text::encode;
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::metrics::gauge::Gauge;
use prometheus_client::registry::Registry;
use tracing::{trace, warn};

use crate::sink::MetricSink;

type FloatGauge = Gauge<f64, AtomicU64>;
type LabelSet = Vec<(String, String)>;

/// A gauge family with a fixed, ordered set of label names.
#[derive(Debug)]
struct LabeledGauge {
    label_names: Vec<String>,
    family: Family<LabelSet, FloatGauge>,
}

impl LabeledGauge {
    fn matches(&self, labels: &[(&str, &str)]) -> bool {
        self.label_names.len() == labels.len()
            && self
                .label_names
                .iter()
                .zip(labels)
                .all(|(expected, (name, _))| expected == name)
    }
}

/// An enumerated metric: one series per state, 1 for the current state.
///
/// The state label is keyed by the exported (prefixed) metric name.
#[derive(Debug)]
struct StateSet {
    label: String,
    states: Vec<String>,
    family: Family<LabelSet, Gauge>,
    current: Mutex<Option<String>>,
}

impl StateSet {
    fn series(&self, state: &str) -> LabelSet {
        vec![(self.label.clone(), state.to_string())]
    }
}

/// Builder for a [`MetricRegistry`].
pub struct MetricRegistryBuilder {
    registry: Registry,
    prefix: Option<String>,
    names: HashSet<String>,
    gauges: HashMap<String, FloatGauge>,
    labeled: HashMap<String, LabeledGauge>,
    state_sets: HashMap<String, StateSet>,
}

impl MetricRegistryBuilder {
    /// Create a builder, optionally prefixing every metric name.
    pub fn new(prefix: Option<&str>) -> Self {
        let registry = match prefix {
            Some(prefix) => Registry::with_prefix(prefix),
            None => Registry::default(),
        };

        Self {
            registry,
            prefix: prefix.map(str::to_string),
            names: HashSet::new(),
            gauges: HashMap::new(),
            labeled: HashMap::new(),
            state_sets: HashMap::new(),
        }
    }

    fn claim(&mut self, name: &str) -> bool {
        if !self.names.insert(name.to_string()) {
            warn!(metric = %name, "Metric declared twice, ignoring redeclaration");
            return false;
        }
        true
    }

    /// Declare an unlabeled gauge.
    pub fn gauge(mut self, name: &str, help: &str) -> Self {
        if self.claim(name) {
            let gauge = FloatGauge::default();
            self.registry.register(name, help, gauge.clone());
            self.gauges.insert(name.to_string(), gauge);
        }
        self
    }

    /// Declare a gauge whose series are selected by `label_names`.
    pub fn labeled_gauge(mut self, name: &str, help: &str, label_names: &[&str]) -> Self {
        if self.claim(name) {
            let family = Family::<LabelSet, FloatGauge>::default();
            self.registry.register(name, help, family.clone());
            self.labeled.insert(
                name.to_string(),
                LabeledGauge {
                    label_names: label_names.iter().map(|l| l.to_string()).collect(),
                    family,
                },
            );
        }
        self
    }

    /// Declare an enumerated metric with a closed set of states.
    ///
    /// Every state is exported at 0 until the first update.
    pub fn state_set(mut self, name: &str, help: &str, states: &[&str]) -> Self {
        if self.claim(name) {
            let label = match &self.prefix {
                Some(prefix) => format!("{}_{}", prefix, name),
                None => name.to_string(),
            };
            let set = StateSet {
                label,
                states: states.iter().map(|s| s.to_string()).collect(),
                family: Family::default(),
                current: Mutex::new(None),
            };
            for state in &set.states {
                set.family.get_or_create(&set.series(state)).set(0);
            }
            self.registry.register(name, help, set.family.clone());
            self.state_sets.insert(name.to_string(), set);
        }
        self
    }

    /// Finish declaring metrics.
    pub fn build(mut self) -> MetricRegistry {
        let cycles = Counter::default();
        let failures = Counter::default();
        self.registry
            .register("poll_cycles", "Completed poll cycles", cycles.clone());
        self.registry.register(
            "poll_failures",
            "Poll cycles skipped because of an error",
            failures.clone(),
        );

        MetricRegistry {
            registry: self.registry,
            gauges: self.gauges,
            labeled: self.labeled,
            state_sets: self.state_sets,
            cycles,
            failures,
        }
    }
}

/// Long-lived handle to every declared metric.
pub struct MetricRegistry {
    registry: Registry,
    gauges: HashMap<String, FloatGauge>,
    labeled: HashMap<String, LabeledGauge>,
    state_sets: HashMap<String, StateSet>,
    cycles: Counter,
    failures: Counter,
}

/// Registry handle shared by the poll loop and the HTTP server.
pub type SharedRegistry = Arc<MetricRegistry>;

impl MetricRegistry {
    /// Start declaring metrics without a name prefix.
    pub fn builder() -> MetricRegistryBuilder {
        MetricRegistryBuilder::new(None)
    }

    /// Render all metrics in the OpenMetrics text format.
    pub fn render(&self) -> Result<String, std::fmt::Error> {
        let mut buffer = String::new();
        encode(&mut buffer, &self.registry)?;
        Ok(buffer)
    }

    /// Current value of an unlabeled gauge.
    pub fn gauge_value(&self, name: &str) -> Option<f64> {
        self.gauges.get(name).map(|g| g.get())
    }

    /// Current state of an enumerated metric, if one was ever set.
    pub fn current_state(&self, name: &str) -> Option<String> {
        self.state_sets
            .get(name)
            .and_then(|s| s.current.lock().clone())
    }

    /// Number of completed poll cycles.
    pub fn cycles(&self) -> u64 {
        self.cycles.get()
    }

    /// Number of poll cycles that failed.
    pub fn failures(&self) -> u64 {
        self.failures.get()
    }

    /// Whether at least one cycle has published values.
    pub fn has_published(&self) -> bool {
        self.cycles() > self.failures()
    }
}

impl MetricSink for MetricRegistry {
    fn set_gauge(&self, name: &str, value: f64) {
        match self.gauges.get(name) {
            Some(gauge) => {
                gauge.set(value);
                trace!(metric = %name, value, "Gauge updated");
            }
            None => warn!(metric = %name, "Update for undeclared gauge"),
        }
    }

    fn set_labeled(&self, name: &str, labels: &[(&str, &str)], value: f64) {
        let Some(gauge) = self.labeled.get(name) else {
            warn!(metric = %name, "Update for undeclared labeled gauge");
            return;
        };

        if !gauge.matches(labels) {
            warn!(
                metric = %name,
                expected = ?gauge.label_names,
                "Label names do not match declaration"
            );
            return;
        }

        let series: LabelSet = labels
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        gauge.family.get_or_create(&series).set(value);
        trace!(metric = %name, labels = ?labels, value, "Labeled gauge updated");
    }

    fn set_state(&self, name: &str, state: &str) {
        let Some(set) = self.state_sets.get(name) else {
            warn!(metric = %name, "Update for undeclared state set");
            return;
        };

        if !set.states.iter().any(|s| s == state) {
            warn!(metric = %name, state = %state, "Unknown state, leaving metric unchanged");
            return;
        }

        for candidate in &set.states {
            set.family
                .get_or_create(&set.series(candidate))
                .set(i64::from(candidate == state));
        }
        *set.current.lock() = Some(state.to_string());
        trace!(metric = %name, state = %state, "State updated");
    }

    fn cycle_completed(&self, success: bool) {
        self.cycles.inc();
        if !success {
            self.failures.inc();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_registry() -> MetricRegistry {
        MetricRegistry::builder()
            .gauge("link1_uptime", "Uptime of Link1")
            .labeled_gauge("hec_error_count", "HEC Errors", &["link", "direction"])
            .state_set(
                "connection_state",
                "WAN Connection",
                &["Connected", "Offline", "Down"],
            )
            .build()
    }

    #[test]
    fn test_set_gauge_and_render() {
        let registry = make_registry();
        registry.set_gauge("link1_uptime", 14184.0);

        assert_eq!(registry.gauge_value("link1_uptime"), Some(14184.0));

        let output = registry.render().unwrap();
        assert!(output.contains("# TYPE link1_uptime gauge"));
        assert!(output.contains("link1_uptime 14184"));
    }

    #[test]
    fn test_undeclared_gauge_is_ignored() {
        let registry = make_registry();
        registry.set_gauge("link3_uptime", 1.0);

        assert_eq!(registry.gauge_value("link3_uptime"), None);
        assert!(!registry.render().unwrap().contains("link3_uptime"));
    }

    #[test]
    fn test_labeled_gauge() {
        let registry = make_registry();
        registry.set_labeled(
            "hec_error_count",
            &[("link", "Link 2"), ("direction", "Upstream")],
            7.0,
        );

        let output = registry.render().unwrap();
        assert!(output.contains("hec_error_count{link=\"Link 2\",direction=\"Upstream\"} 7"));
    }

    #[test]
    fn test_labeled_gauge_rejects_wrong_labels() {
        let registry = make_registry();
        registry.set_labeled("hec_error_count", &[("link", "Link 2")], 7.0);
        registry.set_labeled(
            "hec_error_count",
            &[("direction", "Upstream"), ("link", "Link 2")],
            7.0,
        );

        let output = registry.render().unwrap();
        assert!(!output.contains("hec_error_count{"));
    }

    #[test]
    fn test_state_set_starts_at_zero() {
        let registry = make_registry();
        let output = registry.render().unwrap();

        assert!(output.contains("connection_state{connection_state=\"Connected\"} 0"));
        assert!(output.contains("connection_state{connection_state=\"Down\"} 0"));
        assert_eq!(registry.current_state("connection_state"), None);
    }

    #[test]
    fn test_state_set_transitions() {
        let registry = make_registry();
        registry.set_state("connection_state", "Down");
        registry.set_state("connection_state", "Connected");

        let output = registry.render().unwrap();
        assert!(output.contains("connection_state{connection_state=\"Connected\"} 1"));
        assert!(output.contains("connection_state{connection_state=\"Down\"} 0"));
        assert!(output.contains("connection_state{connection_state=\"Offline\"} 0"));
        assert_eq!(
            registry.current_state("connection_state").as_deref(),
            Some("Connected")
        );
    }

    #[test]
    fn test_unknown_state_leaves_metric_unchanged() {
        let registry = make_registry();
        registry.set_state("connection_state", "Offline");
        registry.set_state("connection_state", "Training");

        assert_eq!(
            registry.current_state("connection_state").as_deref(),
            Some("Offline")
        );
    }

    #[test]
    fn test_cycle_accounting() {
        let registry = make_registry();
        assert!(!registry.has_published());

        registry.cycle_completed(false);
        assert!(!registry.has_published());
        assert_eq!(registry.failures(), 1);

        registry.cycle_completed(true);
        assert!(registry.has_published());
        assert_eq!(registry.cycles(), 2);

        let output = registry.render().unwrap();
        assert!(output.contains("poll_cycles_total 2"));
        assert!(output.contains("poll_failures_total 1"));
    }

    #[test]
    fn test_prefix() {
        let registry = MetricRegistryBuilder::new(Some("home"))
            .gauge("outdoor_uv_index", "Outdoor UV Index")
            .build();
        registry.set_gauge("outdoor_uv_index", 3.0);

        let output = registry.render().unwrap();
        assert!(output.contains("home_outdoor_uv_index 3"));
    }

    #[test]
    fn test_prefixed_state_label_matches_metric_name() {
        let registry = MetricRegistryBuilder::new(Some("dsl"))
            .state_set("connection_state", "WAN Connection", &["Connected", "Down"])
            .build();
        registry.set_state("connection_state", "Connected");

        assert_eq!(
            registry.current_state("connection_state").as_deref(),
            Some("Connected")
        );

        let output = registry.render().unwrap();
        assert!(output.contains(r#"dsl_connection_state{dsl_connection_state="Connected"} 1"#));
        assert!(output.contains(r#"dsl_connection_state{dsl_connection_state="Down"} 0"#));
        assert!(!output.contains(r#"{connection_state="#));
    }

    #[test]
    fn test_duplicate_declaration_ignored() {
        let registry = MetricRegistry::builder()
            .gauge("outdoor_temperature_f", "Outdoor Temperature F")
            .gauge("outdoor_temperature_f", "Duplicate")
            .build();

        let output = registry.render().unwrap();
        assert_eq!(output.matches("# TYPE outdoor_temperature_f gauge").count(), 1);
    }
}
