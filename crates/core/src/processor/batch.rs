//! Bounded-concurrency batch runner.

use futures::stream::{FuturesUnordered, StreamExt};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tracing::{info, warn};

use crate::ticket::Ticket;

use super::config::ProcessorConfig;
use super::ticket_processor::{ProcessError, TicketProcessor};
use super::types::{BatchSummary, PoolStatus, ProcessedTicket, TicketError};

/// Tracks statistics for the processing pool.
#[derive(Default)]
struct PoolStats {
    active: AtomicU64,
    queued: AtomicU64,
    total_processed: AtomicU64,
    total_failed: AtomicU64,
}

impl PoolStats {
    fn to_status(&self, max_concurrent: usize) -> PoolStatus {
        PoolStatus {
            active_jobs: self.active.load(Ordering::Relaxed) as usize,
            max_concurrent,
            queued_jobs: self.queued.load(Ordering::Relaxed) as usize,
            total_processed: self.total_processed.load(Ordering::Relaxed),
            total_failed: self.total_failed.load(Ordering::Relaxed),
        }
    }
}

/// Increments a gauge for as long as it lives. Futures dropped at the batch
/// deadline still decrement.
struct GaugeGuard<'a>(&'a AtomicU64);

impl<'a> GaugeGuard<'a> {
    fn enter(gauge: &'a AtomicU64) -> Self {
        gauge.fetch_add(1, Ordering::Relaxed);
        Self(gauge)
    }
}

impl Drop for GaugeGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::Relaxed);
    }
}

impl BatchSummary {
    fn absorb(&mut self, result: Result<ProcessedTicket, ProcessError>) {
        self.processed += 1;
        match result {
            Ok(processed) => {
                if !processed.outcome.is_ok() {
                    self.failed += 1;
                    self.dead_lettered += 1;
                }
                self.results.push(processed);
            }
            Err(e) => {
                self.failed += 1;
                self.errors.push(TicketError {
                    ticket_id: e.ticket_id().to_string(),
                    error: e.to_string(),
                });
            }
        }
    }
}

/// Runs tickets through a [`TicketProcessor`] with bounded concurrency.
///
/// The semaphore is shared by all runs on this instance, so concurrent
/// batches together never exceed `max_concurrency` in-flight tickets.
pub struct BatchProcessor {
    config: ProcessorConfig,
    processor: Arc<TicketProcessor>,
    semaphore: Arc<Semaphore>,
    stats: Arc<PoolStats>,
}

impl BatchProcessor {
    pub fn new(config: ProcessorConfig, processor: Arc<TicketProcessor>) -> Self {
        let semaphore = Arc::new(Semaphore::new(config.max_concurrency.max(1)));
        Self {
            config,
            processor,
            semaphore,
            stats: Arc::new(PoolStats::default()),
        }
    }

    pub fn status(&self) -> PoolStatus {
        self.stats.to_status(self.config.max_concurrency.max(1))
    }

    /// Process every ticket. Never aborts on a single ticket's failure.
    ///
    /// When the batch deadline expires, unfinished tickets are dropped; they
    /// contribute nothing to the summary or the pipeline counters.
    pub async fn run(&self, tickets: Vec<Ticket>) -> BatchSummary {
        let started = Instant::now();
        let mut summary = BatchSummary {
            total: tickets.len(),
            ..Default::default()
        };
        if tickets.is_empty() {
            return summary;
        }

        let mut pending: FuturesUnordered<_> =
            tickets.into_iter().map(|t| self.process_one(t)).collect();

        let collect = async {
            while let Some(result) = pending.next().await {
                summary.absorb(result);
            }
        };

        let timed_out = match self.config.batch_timeout() {
            Some(limit) => tokio::time::timeout(limit, collect).await.is_err(),
            None => {
                collect.await;
                false
            }
        };
        let abandoned = pending.len();
        drop(pending);

        summary.timed_out = timed_out;
        if timed_out {
            warn!(
                total = summary.total,
                completed = summary.processed,
                abandoned,
                "Batch deadline expired"
            );
        }

        info!(
            total = summary.total,
            processed = summary.processed,
            failed = summary.failed,
            dead_lettered = summary.dead_lettered,
            errors = summary.errors.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Batch complete"
        );
        summary
    }

    async fn process_one(&self, ticket: Ticket) -> Result<ProcessedTicket, ProcessError> {
        let queued = GaugeGuard::enter(&self.stats.queued);
        // acquire only fails if the semaphore is closed, which never happens here
        let _permit = self.semaphore.acquire().await.ok();
        drop(queued);

        let active = GaugeGuard::enter(&self.stats.active);
        let result = self.processor.process(ticket).await;
        drop(active);

        self.stats.total_processed.fetch_add(1, Ordering::Relaxed);
        let ok = matches!(&result, Ok(processed) if processed.outcome.is_ok());
        if !ok {
            self.stats.total_failed.fetch_add(1, Ordering::Relaxed);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::RuleClassifier;
    use crate::metrics::PipelineMetrics;
    use crate::testing::fixtures::{billing_ticket, routine_ticket, urgent_ticket};
    use crate::testing::{MockClassifier, MockDeadLetterSink, MockNotifier};
    use std::time::Duration;

    fn batch_with(
        classifier: Arc<dyn crate::classifier::Classifier>,
        notifier: Arc<MockNotifier>,
        sink: Arc<MockDeadLetterSink>,
        config: ProcessorConfig,
    ) -> (BatchProcessor, Arc<PipelineMetrics>) {
        let metrics = Arc::new(PipelineMetrics::new());
        let processor = Arc::new(TicketProcessor::new(
            classifier,
            notifier,
            sink,
            metrics.clone(),
        ));
        (BatchProcessor::new(config, processor), metrics)
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let (batch, metrics) = batch_with(
            Arc::new(RuleClassifier),
            Arc::new(MockNotifier::new()),
            Arc::new(MockDeadLetterSink::new()),
            ProcessorConfig::default(),
        );
        let summary = batch.run(Vec::new()).await;
        assert_eq!(summary.total, 0);
        assert_eq!(summary.processed, 0);
        assert_eq!(metrics.snapshot().success_rate, 0.0);
    }

    #[tokio::test]
    async fn test_mixed_batch_counts_are_consistent() {
        let notifier = Arc::new(MockNotifier::new());
        notifier.set_fail_always(3).await;
        let (batch, metrics) = batch_with(
            Arc::new(MockClassifier::failing_when_contains("invoice", "boom")),
            notifier.clone(),
            Arc::new(MockDeadLetterSink::new()),
            ProcessorConfig::default().with_max_concurrency(2),
        );

        let tickets = vec![
            urgent_ticket("a"),
            routine_ticket("b"),
            billing_ticket("c"),
            routine_ticket("d"),
        ];
        let summary = batch.run(tickets).await;

        // a: notify exhausted, c: classification failed
        assert_eq!(summary.processed, 4);
        assert_eq!(summary.failed, 2);
        assert_eq!(summary.dead_lettered, 2);
        assert!(summary.errors.is_empty());
        assert_eq!(summary.outcomes().count(), 4);
        assert_eq!(notifier.call_count().await, 1);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.counters.processed, 4);
        assert_eq!(snapshot.counters.failed, 2);
        assert_eq!(snapshot.success_rate, 0.5);

        let status = batch.status();
        assert_eq!(status.total_processed, 4);
        assert_eq!(status.total_failed, 2);
        assert_eq!(status.active_jobs, 0);
    }

    #[tokio::test]
    async fn test_max_concurrency_caps_in_flight_tickets() {
        let delay = Duration::from_millis(100);
        let notifier = Arc::new(MockNotifier::new());
        notifier.set_delay(delay).await;
        let (batch, metrics) = batch_with(
            Arc::new(RuleClassifier),
            notifier.clone(),
            Arc::new(MockDeadLetterSink::new()),
            ProcessorConfig::default().with_max_concurrency(2),
        );

        let tickets = (0..6).map(|i| urgent_ticket(&format!("u{}", i))).collect();
        let started = std::time::Instant::now();
        let summary = batch.run(tickets).await;
        let elapsed = started.elapsed();

        assert_eq!(summary.processed, 6);
        assert_eq!(notifier.call_count().await, 6);
        assert_eq!(notifier.peak_concurrency(), 2);
        // three waves of two
        assert!(elapsed >= delay * 3, "finished in {:?}", elapsed);
        assert_eq!(metrics.snapshot().counters.notify_success, 6);
        assert_eq!(batch.status().active_jobs, 0);
    }

    #[tokio::test]
    async fn test_dead_letter_failure_does_not_abort_batch() {
        let notifier = Arc::new(MockNotifier::new());
        notifier.set_fail_always(3).await;
        let sink = Arc::new(MockDeadLetterSink::new());
        sink.set_fail(true).await;
        let (batch, _metrics) = batch_with(
            Arc::new(RuleClassifier),
            notifier,
            sink,
            ProcessorConfig::default(),
        );

        let summary = batch
            .run(vec![urgent_ticket("a"), routine_ticket("b")])
            .await;

        assert_eq!(summary.processed, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.dead_lettered, 0);
        assert_eq!(summary.errors.len(), 1);
        assert_eq!(summary.errors[0].ticket_id, "a");
        assert_eq!(summary.results.len(), 1);
    }

    #[tokio::test]
    async fn test_timeout_abandons_unfinished_tickets() {
        let notifier = Arc::new(MockNotifier::new());
        notifier.set_delay(Duration::from_secs(30)).await;
        let config = ProcessorConfig::default()
            .with_max_concurrency(4)
            .with_batch_timeout(Duration::from_secs(1));
        let (batch, metrics) = batch_with(
            Arc::new(RuleClassifier),
            notifier,
            Arc::new(MockDeadLetterSink::new()),
            config,
        );

        let summary = batch
            .run(vec![urgent_ticket("slow"), routine_ticket("fast")])
            .await;

        assert!(summary.timed_out);
        assert_eq!(summary.total, 2);
        assert_eq!(summary.processed, 1);
        // the abandoned P1 ticket left no partial counts
        let counters = metrics.snapshot().counters;
        assert_eq!(counters.processed, 1);
        assert_eq!(counters.notify_success, 0);
        assert_eq!(counters.notify_failed, 0);

        let status = batch.status();
        assert_eq!(status.active_jobs, 0);
        assert_eq!(status.queued_jobs, 0);
    }
}
