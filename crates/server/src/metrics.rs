//! Prometheus metrics for observability.
//!
//! This module provides metrics for monitoring the triage server:
//! - HTTP request metrics (latency, counts, in flight)
//! - Pipeline counters mirrored from the shared snapshot on scrape
//! - Processing pool status (collected dynamically)

use once_cell::sync::Lazy;
use prometheus::{
    self, core::Collector, Encoder, Gauge, HistogramOpts, HistogramVec, IntCounterVec, IntGauge,
    IntGaugeVec, Opts, Registry, TextEncoder,
};
use regex_lite::Regex;
use tracing::warn;

use crate::state::AppState;

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

// =============================================================================
// HTTP Request Metrics
// =============================================================================

/// HTTP request duration in seconds.
pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "triage_http_request_duration_seconds",
            "HTTP request duration in seconds",
        )
        .buckets(vec![
            0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0,
        ]),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests total count.
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("triage_http_requests_total", "Total HTTP requests"),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests currently in flight.
pub static HTTP_REQUESTS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "triage_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
    )
    .unwrap()
});

// =============================================================================
// Pipeline Metrics (collected dynamically)
// =============================================================================

/// Pipeline counters by name, copied from the snapshot.
pub static PIPELINE_COUNTERS: Lazy<IntGaugeVec> = Lazy::new(|| {
    IntGaugeVec::new(
        Opts::new(
            "triage_pipeline_counter",
            "Pipeline counters since startup",
        ),
        &["counter"],
    )
    .unwrap()
});

/// `(processed - failed) / processed`.
pub static PIPELINE_SUCCESS_RATE: Lazy<Gauge> = Lazy::new(|| {
    Gauge::new(
        "triage_pipeline_success_rate",
        "Share of processed tickets that ended OK",
    )
    .unwrap()
});

/// Processing pool active jobs.
pub static POOL_ACTIVE: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new("triage_pool_active", "Number of tickets holding a permit").unwrap()
});

/// Processing pool queued jobs.
pub static POOL_QUEUED: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new("triage_pool_queued", "Number of tickets waiting for a permit").unwrap()
});

// =============================================================================
// Registration
// =============================================================================

fn register_metrics(registry: &Registry) {
    let server: Vec<Box<dyn Collector>> = vec![
        // HTTP
        Box::new(HTTP_REQUEST_DURATION.clone()),
        Box::new(HTTP_REQUESTS_TOTAL.clone()),
        Box::new(HTTP_REQUESTS_IN_FLIGHT.clone()),
        // Pipeline
        Box::new(PIPELINE_COUNTERS.clone()),
        Box::new(PIPELINE_SUCCESS_RATE.clone()),
        Box::new(POOL_ACTIVE.clone()),
        Box::new(POOL_QUEUED.clone()),
    ];

    // Core metrics (notifier, dead-letter, classification)
    let core = triage_core::metrics::all_metrics();

    for metric in server.into_iter().chain(core) {
        if let Err(e) = registry.register(metric) {
            warn!(error = %e, "Failed to register metric");
        }
    }
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        warn!(error = %e, "Failed to encode metrics");
    }
    String::from_utf8(buffer).unwrap_or_default()
}

/// Collect dynamic metrics from current application state.
///
/// Called before encoding so gauges reflect the live counters and pool.
pub fn collect_dynamic_metrics(state: &AppState) {
    let snapshot = state.metrics().snapshot();
    let c = snapshot.counters;
    for (name, value) in [
        ("processed", c.processed),
        ("failed", c.failed),
        ("dead_lettered", c.dead_lettered),
        ("notify_success", c.notify_success),
        ("notify_failed", c.notify_failed),
        ("notify_not_configured", c.notify_not_configured),
        ("retries_total", c.retries_total),
        ("retry_exhausted_cases", c.retry_exhausted_cases),
    ] {
        PIPELINE_COUNTERS
            .with_label_values(&[name])
            .set(value as i64);
    }
    PIPELINE_SUCCESS_RATE.set(snapshot.success_rate);

    let pool = state.batch().status();
    POOL_ACTIVE.set(pool.active_jobs as i64);
    POOL_QUEUED.set(pool.queued_jobs as i64);
}

static UUID_SEGMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}")
        .unwrap()
});

static NUMERIC_SEGMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"/\d+(/|$)").unwrap());

/// Normalize a path for metric labels (replace IDs with placeholders).
pub fn normalize_path(path: &str) -> String {
    let result = UUID_SEGMENT.replace_all(path, "{id}");
    let result = NUMERIC_SEGMENT.replace_all(&result, "/{id}$1");
    result.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use triage_core::{testing::MockNotifier, Config, RuleClassifier};

    #[test]
    fn test_normalize_path_uuid() {
        let path = "/api/v1/dead-letters/550e8400-e29b-41d4-a716-446655440000";
        assert_eq!(normalize_path(path), "/api/v1/dead-letters/{id}");
    }

    #[test]
    fn test_normalize_path_numeric() {
        let path = "/api/v1/tickets/12345";
        assert_eq!(normalize_path(path), "/api/v1/tickets/{id}");
    }

    #[test]
    fn test_normalize_path_no_ids() {
        assert_eq!(normalize_path("/api/v1/health"), "/api/v1/health");
        assert_eq!(normalize_path("/api/v1/dead-letters/prune"), "/api/v1/dead-letters/prune");
    }

    #[test]
    fn test_encode_metrics_returns_prometheus_format() {
        HTTP_REQUESTS_TOTAL
            .with_label_values(&["GET", "/test", "200"])
            .inc();

        let output = encode_metrics();
        assert!(output.contains("triage_http_requests_total"));
        assert!(output.contains("# HELP"));
        assert!(output.contains("# TYPE"));
    }

    #[test]
    fn test_collect_dynamic_metrics() {
        let temp = tempfile::TempDir::new().unwrap();
        let mut config = Config::default();
        config.dead_letter.dir = temp.path().join("dlq");
        let state = AppState::with_components(
            config,
            Arc::new(RuleClassifier::new()),
            Arc::new(MockNotifier::new()),
        )
        .unwrap();

        collect_dynamic_metrics(&state);

        let output = encode_metrics();
        assert!(output.contains("triage_pipeline_counter"));
        assert!(output.contains("triage_pipeline_success_rate"));
        assert!(output.contains("triage_pool_active"));
    }
}
