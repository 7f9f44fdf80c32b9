//! Pipeline counters and Prometheus metrics for core components.
//!
//! [`PipelineMetrics`] holds the counters the reporting endpoint reads. It is
//! created once per process and passed explicitly to whoever records outcomes.
//! All counters for one ticket are applied in a single locked update.
//!
//! The Prometheus statics below are observational only (attempt latency,
//! dead-letter writes by stage) and are registered by the server.
//! Classifications are counted at the ticket's terminal state like the
//! pipeline counters. Notify attempts are counted as they happen, so a batch
//! timeout can leave them ahead of `notify_success + notify_failed`.

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, Opts};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

// =============================================================================
// Pipeline Counters
// =============================================================================

/// Counter values. Also used as the per-ticket delta passed to
/// [`PipelineMetrics::record`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineCounters {
    pub processed: u64,
    pub failed: u64,
    pub dead_lettered: u64,
    pub notify_success: u64,
    pub notify_failed: u64,
    pub notify_not_configured: u64,
    pub retries_total: u64,
    pub retry_exhausted_cases: u64,
}

impl PipelineCounters {
    fn add(&mut self, delta: &PipelineCounters) {
        self.processed += delta.processed;
        self.failed += delta.failed;
        self.dead_lettered += delta.dead_lettered;
        self.notify_success += delta.notify_success;
        self.notify_failed += delta.notify_failed;
        self.notify_not_configured += delta.notify_not_configured;
        self.retries_total += delta.retries_total;
        self.retry_exhausted_cases += delta.retry_exhausted_cases;
    }
}

/// Read-only view of the counters plus derived rates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    #[serde(flatten)]
    pub counters: PipelineCounters,
    /// `(processed - failed) / processed`, 0.0 when nothing was processed.
    pub success_rate: f64,
    /// `failed / processed`, 0.0 when nothing was processed.
    pub error_rate: f64,
}

impl MetricsSnapshot {
    fn from_counters(counters: PipelineCounters) -> Self {
        let (success_rate, error_rate) = if counters.processed == 0 {
            (0.0, 0.0)
        } else {
            let processed = counters.processed as f64;
            let failed = counters.failed as f64;
            ((processed - failed) / processed, failed / processed)
        };
        Self {
            counters,
            success_rate,
            error_rate,
        }
    }
}

/// Process-wide pipeline counters.
#[derive(Debug, Default)]
pub struct PipelineMetrics {
    counters: Mutex<PipelineCounters>,
}

impl PipelineMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one ticket's counter delta atomically.
    pub fn record(&self, delta: &PipelineCounters) {
        let mut counters = self
            .counters
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        counters.add(delta);
    }

    /// Current counters and derived rates. Never resets anything.
    pub fn snapshot(&self) -> MetricsSnapshot {
        let counters = *self
            .counters
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        MetricsSnapshot::from_counters(counters)
    }
}

// =============================================================================
// Notifier Metrics
// =============================================================================

/// Notification attempts by result.
pub static NOTIFY_ATTEMPTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("triage_notify_attempts_total", "Total notification attempts"),
        &["channel", "result"], // "delivered" or the attempt error kind
    )
    .unwrap()
});

/// Duration of single notification attempts.
pub static NOTIFY_ATTEMPT_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "triage_notify_attempt_duration_seconds",
            "Duration of single notification attempts",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
        &["channel"],
    )
    .unwrap()
});

// =============================================================================
// Dead-Letter Metrics
// =============================================================================

/// Dead-letter records written by stage.
pub static DEAD_LETTER_WRITES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "triage_dead_letter_writes_total",
            "Total dead-letter records written",
        ),
        &["stage"], // "classify", "notify"
    )
    .unwrap()
});

// =============================================================================
// Classification Metrics
// =============================================================================

/// Tickets classified by priority.
pub static CLASSIFICATIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("triage_classifications_total", "Tickets classified"),
        &["topic", "priority"],
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(NOTIFY_ATTEMPTS.clone()),
        Box::new(NOTIFY_ATTEMPT_DURATION.clone()),
        Box::new(DEAD_LETTER_WRITES.clone()),
        Box::new(CLASSIFICATIONS.clone()),
    ]
}
