//! The metric sink abstraction pollers publish through.

use std::collections::BTreeMap;

use parking_lot::Mutex;

/// Destination for the values produced by a poll cycle.
///
/// Metrics are addressed by name. Labeled metrics take their label pairs in
/// declaration order; state metrics take one of their declared states.
pub trait MetricSink: Send + Sync {
    /// Set an unlabeled gauge.
    fn set_gauge(&self, name: &str, value: f64);

    /// Set one series of a labeled gauge.
    fn set_labeled(&self, name: &str, labels: &[(&str, &str)], value: f64);

    /// Mark `state` as the current state of an enumerated metric.
    fn set_state(&self, name: &str, state: &str);

    /// Called once at the end of every poll cycle.
    fn cycle_completed(&self, _success: bool) {}
}

/// In-memory sink that keeps the latest value of every series.
///
/// Useful for tests and dry runs where no Prometheus endpoint is wanted.
#[derive(Debug, Default)]
pub struct MemorySink {
    gauges: Mutex<BTreeMap<String, f64>>,
    states: Mutex<BTreeMap<String, String>>,
    cycles: Mutex<Vec<bool>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest value of an unlabeled gauge.
    pub fn gauge(&self, name: &str) -> Option<f64> {
        self.gauges.lock().get(name).copied()
    }

    /// Latest value of one series of a labeled gauge.
    pub fn labeled(&self, name: &str, labels: &[(&str, &str)]) -> Option<f64> {
        self.gauges.lock().get(&series_name(name, labels)).copied()
    }

    /// Current state of an enumerated metric.
    pub fn state(&self, name: &str) -> Option<String> {
        self.states.lock().get(name).cloned()
    }

    /// Number of distinct series written so far (gauges and states).
    pub fn series_count(&self) -> usize {
        self.gauges.lock().len() + self.states.lock().len()
    }

    /// Outcomes passed to [`MetricSink::cycle_completed`], in order.
    pub fn cycles(&self) -> Vec<bool> {
        self.cycles.lock().clone()
    }
}

impl MetricSink for MemorySink {
    fn set_gauge(&self, name: &str, value: f64) {
        self.gauges.lock().insert(name.to_string(), value);
    }

    fn set_labeled(&self, name: &str, labels: &[(&str, &str)], value: f64) {
        self.gauges.lock().insert(series_name(name, labels), value);
    }

    fn set_state(&self, name: &str, state: &str) {
        self.states
            .lock()
            .insert(name.to_string(), state.to_string());
    }

    fn cycle_completed(&self, success: bool) {
        self.cycles.lock().push(success);
    }
}

fn series_name(name: &str, labels: &[(&str, &str)]) -> String {
    if labels.is_empty() {
        return name.to_string();
    }

    let parts: Vec<String> = labels
        .iter()
        .map(|(k, v)| format!("{}=\"{}\"", k, v))
        .collect();

    format!("{}{{{}}}", name, parts.join(","))
}
