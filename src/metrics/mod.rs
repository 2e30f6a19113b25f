// Private module declaration
mod server;

use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry};

// Re-export for public API
pub use server::start_metrics_server;

// ============================================================================
// Metrics Module - Prometheus metrics for the order flow
// ============================================================================
//
// Provides metrics for:
// - Admissions and rejections (by reason)
// - Lifecycle transitions (from -> to)
// - Edits (by outcome) and deletions
// - Per-operation latency
//
// All metrics are registered with Prometheus and can be scraped via /metrics
// ============================================================================

pub struct Metrics {
    registry: Registry,

    pub orders_admitted: IntCounter,
    pub orders_rejected: IntCounterVec,
    pub order_transitions: IntCounterVec,
    pub order_edits: IntCounterVec,
    pub orders_deleted: IntCounter,
    pub operation_duration: HistogramVec,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let orders_admitted = IntCounter::new("orders_admitted_total", "Total orders admitted")?;
        registry.register(Box::new(orders_admitted.clone()))?;

        let orders_rejected = IntCounterVec::new(
            Opts::new("orders_rejected_total", "Total order operations rejected"),
            &["operation", "reason"],
        )?;
        registry.register(Box::new(orders_rejected.clone()))?;

        let order_transitions = IntCounterVec::new(
            Opts::new("order_transitions_total", "Order lifecycle transitions"),
            &["from_state", "to_state"],
        )?;
        registry.register(Box::new(order_transitions.clone()))?;

        let order_edits = IntCounterVec::new(
            Opts::new("order_edits_total", "Order field edits"),
            &["outcome"],
        )?;
        registry.register(Box::new(order_edits.clone()))?;

        let orders_deleted = IntCounter::new("orders_deleted_total", "Total orders deleted")?;
        registry.register(Box::new(orders_deleted.clone()))?;

        let operation_duration = HistogramVec::new(
            HistogramOpts::new("order_operation_duration_seconds", "Order operation duration")
                .buckets(vec![0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0]),
            &["operation"],
        )?;
        registry.register(Box::new(operation_duration.clone()))?;

        Ok(Self {
            registry,
            orders_admitted,
            orders_rejected,
            order_transitions,
            order_edits,
            orders_deleted,
            operation_duration,
        })
    }

    /// Get the Prometheus registry for exposing metrics via HTTP
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn record_admitted(&self) {
        self.orders_admitted.inc();
    }

    pub fn record_rejected(&self, operation: &str, reason: &str) {
        self.orders_rejected.with_label_values(&[operation, reason]).inc();
    }

    pub fn record_transition(&self, from_state: &str, to_state: &str) {
        self.order_transitions.with_label_values(&[from_state, to_state]).inc();
    }

    pub fn record_edit(&self, success: bool) {
        let outcome = if success { "applied" } else { "rejected" };
        self.order_edits.with_label_values(&[outcome]).inc();
    }

    pub fn record_deleted(&self) {
        self.orders_deleted.inc();
    }

    pub fn observe_duration(&self, operation: &str, duration_secs: f64) {
        self.operation_duration.with_label_values(&[operation]).observe(duration_secs);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counter_value(metrics: &Metrics, name: &str) -> Option<f64> {
        metrics
            .registry
            .gather()
            .iter()
            .find(|m| m.name() == name)
            .and_then(|m| m.metric.first().and_then(|m| m.counter.value))
    }

    #[test]
    fn test_metrics_creation() {
        let metrics = Metrics::new().unwrap();
        // Vec metrics only show up once a label set is used.
        assert!(metrics.registry.gather().len() >= 2);
    }

    #[test]
    fn test_record_admitted() {
        let metrics = Metrics::new().unwrap();
        metrics.record_admitted();
        metrics.record_admitted();

        assert_eq!(counter_value(&metrics, "orders_admitted_total"), Some(2.0));
    }

    #[test]
    fn test_record_rejections_by_reason() {
        let metrics = Metrics::new().unwrap();
        metrics.record_rejected("admit", "commerce_at_capacity");
        metrics.record_rejected("admit", "commerce_not_found");
        metrics.record_rejected("admit", "commerce_at_capacity");

        let gathered = metrics.registry.gather();
        let rejected = gathered.iter().find(|m| m.name() == "orders_rejected_total").unwrap();
        assert_eq!(rejected.metric.len(), 2);
    }

    #[test]
    fn test_record_transition() {
        let metrics = Metrics::new().unwrap();
        metrics.record_transition("created", "in_progress");

        assert_eq!(counter_value(&metrics, "order_transitions_total"), Some(1.0));
    }
}
