//! End-to-end reconciliation run.

use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::processor::{BatchProcessor, BatchSummary};
use crate::summarizer::Summarizer;
use crate::ticket::TicketRecord;

use super::dataset::{DatasetError, JsonDataset};
use super::reconciler::{known_ids, merge, partition, Partition};
use super::source::{SourceError, TicketSource};

#[derive(Debug, Error)]
pub enum JobError {
    #[error("Failed to load input: {0}")]
    Source(#[from] SourceError),

    #[error("Dataset error: {0}")]
    Dataset(#[from] DatasetError),
}

/// What one run did.
#[derive(Debug, Clone, Serialize)]
pub struct JobReport {
    /// Rows in the merged output.
    pub total: usize,
    /// Rows added by this run.
    pub new: usize,
    /// Input tickets skipped as already handled.
    pub skipped: usize,
    /// P1 rows in the merged output.
    pub p1_total: usize,
    pub output_path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    pub batch: BatchSummary,
    pub elapsed_ms: u64,
}

/// Loads input, processes only unseen tickets and rewrites the output.
///
/// Runs are serialized: the output dataset has exactly one writer at a time.
/// Tickets that were abandoned or whose dead-letter write failed get no row,
/// so the next run picks them up again.
pub struct ReconcileJob {
    source: Arc<dyn TicketSource>,
    dataset: JsonDataset,
    batch: Arc<BatchProcessor>,
    summarizer: Option<Summarizer>,
    run_lock: Mutex<()>,
}

impl ReconcileJob {
    pub fn new(source: Arc<dyn TicketSource>, dataset: JsonDataset, batch: Arc<BatchProcessor>) -> Self {
        Self {
            source,
            dataset,
            batch,
            summarizer: None,
            run_lock: Mutex::new(()),
        }
    }

    pub fn with_summarizer(mut self, summarizer: Summarizer) -> Self {
        self.summarizer = Some(summarizer);
        self
    }

    pub async fn run(&self) -> Result<JobReport, JobError> {
        let _guard = self.run_lock.lock().await;
        let started = Instant::now();

        let input = self.source.load().await?;
        let previous = self.dataset.load().await?;
        let known = known_ids(&previous);
        let Partition { seen, new } = partition(&known, input);

        info!(
            source = self.source.name(),
            previous = previous.len(),
            new = new.len(),
            skipped = seen.len(),
            "Reconciling input"
        );

        let batch = self.batch.run(new).await;
        let fresh: Vec<TicketRecord> = batch
            .results
            .iter()
            .map(|p| TicketRecord::from_processed(p.payload.clone(), &p.outcome))
            .collect();
        let added = fresh.len();

        let merged = merge(previous, fresh);
        self.dataset.save(&merged).await?;

        let p1_total = merged.iter().filter(|r| r.is_p1()).count();
        let summary = self.summarize(&merged).await;

        let report = JobReport {
            total: merged.len(),
            new: added,
            skipped: seen.len(),
            p1_total,
            output_path: self.dataset.path().to_path_buf(),
            summary,
            batch,
            elapsed_ms: started.elapsed().as_millis() as u64,
        };
        info!(
            total = report.total,
            new = report.new,
            p1_total = report.p1_total,
            failed = report.batch.failed,
            "Reconciliation complete"
        );
        Ok(report)
    }

    async fn summarize(&self, records: &[TicketRecord]) -> Option<String> {
        let summarizer = self.summarizer.as_ref()?;
        match summarizer.summarize(records).await {
            Ok(text) => Some(text),
            Err(e) => {
                warn!(provider = summarizer.provider(), error = %e, "Summary unavailable");
                None
            }
        }
    }
}
