//! Metrics collection for observability

use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec_with_registry, register_histogram_vec_with_registry, CounterVec,
    HistogramVec, Opts, Registry, TextEncoder,
};
use std::sync::Arc;

/// Global metrics registry
pub static METRICS: Lazy<Arc<Metrics>> = Lazy::new(|| {
    Arc::new(Metrics::new().expect("Failed to initialize metrics"))
});

/// Metrics collector
pub struct Metrics {
    registry: Registry,

    // Knowledge API metrics
    pub recall_requests: CounterVec,
    pub remember_requests: CounterVec,
    pub correct_requests: CounterVec,
    pub request_duration: HistogramVec,

    // Router metrics
    pub graph_registrations: CounterVec,
    pub fan_out_chain_length: HistogramVec,
}

impl Metrics {
    /// Create a new metrics collector
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let recall_requests = register_counter_vec_with_registry!(
            Opts::new("knowledge_recall_requests_total", "Total recall requests"),
            &["status"],
            registry
        )?;

        let remember_requests = register_counter_vec_with_registry!(
            Opts::new("knowledge_remember_requests_total", "Total remember requests"),
            &["status"],
            registry
        )?;

        let correct_requests = register_counter_vec_with_registry!(
            Opts::new("knowledge_correct_requests_total", "Total correct requests"),
            &["status"],
            registry
        )?;

        let request_duration = register_histogram_vec_with_registry!(
            "knowledge_request_duration_seconds",
            "Knowledge API request duration in seconds",
            &["endpoint"],
            registry
        )?;

        let graph_registrations = register_counter_vec_with_registry!(
            Opts::new(
                "knowledge_graph_registrations_total",
                "Graph register/unregister calls"
            ),
            &["operation"],
            registry
        )?;

        let fan_out_chain_length = register_histogram_vec_with_registry!(
            "knowledge_fan_out_chain_length",
            "Number of graphs consulted per search",
            &["graph"],
            registry
        )?;

        Ok(Self {
            registry,
            recall_requests,
            remember_requests,
            correct_requests,
            request_duration,
            graph_registrations,
            fan_out_chain_length,
        })
    }

    /// Render the registry in Prometheus text exposition format
    pub fn gather(&self) -> String {
        let encoder = TextEncoder::new();
        encoder
            .encode_to_string(&self.registry.gather())
            .unwrap_or_default()
    }
}
