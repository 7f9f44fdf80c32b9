//! Reconciliation integration tests.
//!
//! Runs the full job against JSON files in a temp directory:
//! - Re-running over identical input is a no-op (no notify, no dead-letter)
//! - The output file is byte-identical across re-runs
//! - New input rows are merged into the existing dataset

use std::path::PathBuf;
use std::sync::Arc;

use serde_json::json;
use tempfile::TempDir;

use triage_core::{
    testing::MockNotifier, BatchProcessor, DeadLetterSink, FsDeadLetterSink, JsonDataset,
    JsonTicketSource, PipelineMetrics, ProcessorConfig, ReconcileJob, RuleClassifier,
    TicketProcessor,
};

struct TestHarness {
    job: ReconcileJob,
    notifier: Arc<MockNotifier>,
    sink: Arc<FsDeadLetterSink>,
    metrics: Arc<PipelineMetrics>,
    input_path: PathBuf,
    output_path: PathBuf,
    _temp_dir: TempDir,
}

impl TestHarness {
    fn new(input: serde_json::Value) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let input_path = temp_dir.path().join("tickets.json");
        let output_path = temp_dir.path().join("outputs").join("classified.json");
        std::fs::write(&input_path, input.to_string()).expect("write input");

        let sink = Arc::new(FsDeadLetterSink::new(temp_dir.path().join("dlq")));
        let notifier = Arc::new(MockNotifier::new());
        let metrics = Arc::new(PipelineMetrics::new());
        let processor = Arc::new(TicketProcessor::new(
            Arc::new(RuleClassifier),
            notifier.clone(),
            sink.clone(),
            metrics.clone(),
        ));
        let batch = Arc::new(BatchProcessor::new(ProcessorConfig::default(), processor));
        let job = ReconcileJob::new(
            Arc::new(JsonTicketSource::new(&input_path)),
            JsonDataset::new(&output_path),
            batch,
        );

        Self {
            job,
            notifier,
            sink,
            metrics,
            input_path,
            output_path,
            _temp_dir: temp_dir,
        }
    }

    fn output(&self) -> String {
        std::fs::read_to_string(&self.output_path).expect("read output")
    }
}

fn sample_input() -> serde_json::Value {
    json!([
        {
            "id": 101,
            "created_at": "2024-06-03T09:00:00Z",
            "channel": "email",
            "subject": "URGENT login outage",
            "description": "cannot log in, 500 errors"
        },
        {
            "id": "102",
            "created_at": "2024-06-03T10:00:00Z",
            "channel": "chat",
            "subject": "Pricing question",
            "description": "thanks, great service"
        },
        {
            "id": 103,
            "created_at": "2024-06-02T08:00:00Z",
            "channel": "email",
            "subject": "Invoice mismatch",
            "description": "I was charged twice this month"
        }
    ])
}

#[tokio::test]
async fn test_first_run_processes_everything() {
    let h = TestHarness::new(sample_input());

    let report = h.job.run().await.unwrap();

    assert_eq!(report.total, 3);
    assert_eq!(report.new, 3);
    assert_eq!(report.skipped, 0);
    assert_eq!(report.p1_total, 1);
    assert_eq!(report.output_path, h.output_path);
    assert_eq!(h.notifier.call_count().await, 1);

    let rows: Vec<serde_json::Value> = serde_json::from_str(&h.output()).unwrap();
    let ids: Vec<&str> = rows.iter().filter_map(|r| r["id"].as_str()).collect();
    assert_eq!(ids, vec!["102", "101", "103"]);
    assert!(rows.iter().all(|r| r["is_new"] == json!(true)));
}

#[tokio::test]
async fn test_rerun_is_idempotent() {
    let h = TestHarness::new(sample_input());
    h.notifier.set_fail_always(3).await;

    h.job.run().await.unwrap();
    let first_output = h.output();
    let first_notifies = h.notifier.call_count().await;
    let first_dead_letters = h.sink.list().await.unwrap().len();
    let first_counters = h.metrics.snapshot().counters;
    assert_eq!(first_notifies, 1);
    assert_eq!(first_dead_letters, 1);

    let report = h.job.run().await.unwrap();

    assert_eq!(report.new, 0);
    assert_eq!(report.skipped, 3);
    assert_eq!(report.total, 3);
    assert_eq!(h.notifier.call_count().await, first_notifies);
    assert_eq!(h.sink.list().await.unwrap().len(), first_dead_letters);
    assert_eq!(h.metrics.snapshot().counters, first_counters);
    assert_eq!(h.output(), first_output);
}

#[tokio::test]
async fn test_new_rows_are_merged() {
    let h = TestHarness::new(sample_input());
    h.job.run().await.unwrap();

    let mut input = sample_input();
    if let Some(rows) = input.as_array_mut() {
        rows.push(json!({
            "id": 104,
            "created_at": "2024-06-04T09:00:00Z",
            "channel": "app",
            "subject": "Suspicious access",
            "description": "unauthorized login from another country"
        }));
    }
    std::fs::write(&h.input_path, input.to_string()).unwrap();

    let report = h.job.run().await.unwrap();

    assert_eq!(report.new, 1);
    assert_eq!(report.skipped, 3);
    assert_eq!(report.total, 4);
    assert_eq!(report.p1_total, 2);
    assert_eq!(h.notifier.call_count().await, 2);

    let rows: Vec<serde_json::Value> = serde_json::from_str(&h.output()).unwrap();
    assert_eq!(rows[0]["id"], json!("104"));
}

#[tokio::test]
async fn test_missing_input_fails_without_writing_output() {
    let h = TestHarness::new(sample_input());
    std::fs::remove_file(&h.input_path).unwrap();

    let result = h.job.run().await;

    assert!(result.is_err());
    assert!(!h.output_path.exists());
    assert_eq!(h.notifier.call_count().await, 0);
}
