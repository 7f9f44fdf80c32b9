//! Per-ticket state machine.

use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::classifier::Classifier;
use crate::dead_letter::{DeadLetterError, DeadLetterSink, DeadLetterStage};
use crate::metrics::{PipelineCounters, PipelineMetrics, CLASSIFICATIONS};
use crate::notifier::{format_p1_alert, Notifier};
use crate::ticket::{ClassifiedTicket, ProcessingOutcome, Ticket, TicketPayload};

use super::types::ProcessedTicket;

/// Error type for ticket processing.
///
/// Classification and notification failures are not errors here: they end
/// in a dead-lettered outcome. Only a failed dead-letter write escapes.
#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error("Dead-letter write failed for ticket {ticket_id}: {source}")]
    DeadLetterWrite {
        ticket_id: String,
        source: DeadLetterError,
    },
}

impl ProcessError {
    pub fn ticket_id(&self) -> &str {
        match self {
            ProcessError::DeadLetterWrite { ticket_id, .. } => ticket_id,
        }
    }
}

/// Drives one ticket from RECEIVED to OK or DEAD_LETTERED.
///
/// Counters are accumulated locally and applied to the shared metrics in a
/// single update once the terminal state is known, so an abandoned ticket
/// leaves no partial counts.
pub struct TicketProcessor {
    classifier: Arc<dyn Classifier>,
    notifier: Arc<dyn Notifier>,
    dead_letters: Arc<dyn DeadLetterSink>,
    metrics: Arc<PipelineMetrics>,
}

impl TicketProcessor {
    pub fn new(
        classifier: Arc<dyn Classifier>,
        notifier: Arc<dyn Notifier>,
        dead_letters: Arc<dyn DeadLetterSink>,
        metrics: Arc<PipelineMetrics>,
    ) -> Self {
        Self {
            classifier,
            notifier,
            dead_letters,
            metrics,
        }
    }

    pub fn metrics(&self) -> &Arc<PipelineMetrics> {
        &self.metrics
    }

    /// Process one ticket to its terminal state.
    pub async fn process(&self, ticket: Ticket) -> Result<ProcessedTicket, ProcessError> {
        let mut delta = PipelineCounters {
            processed: 1,
            ..Default::default()
        };

        let classified = match self.classifier.classify_ticket(ticket) {
            Ok(classified) => classified,
            Err((ticket, e)) => {
                warn!(
                    ticket_id = %ticket.id,
                    classifier = self.classifier.name(),
                    error = %e,
                    "Classification failed"
                );
                delta.failed = 1;
                let reason = format!("classify_failed: {}", e);
                return self
                    .dead_letter(ticket.into(), &reason, DeadLetterStage::Classify, delta)
                    .await;
            }
        };

        debug!(
            ticket_id = %classified.id(),
            topic = %classified.topic,
            priority = %classified.priority,
            sentiment = classified.sentiment.as_str(),
            "Ticket classified"
        );

        if !classified.is_urgent() {
            count_classification(&classified);
            self.metrics.record(&delta);
            let outcome = ProcessingOutcome::ok(classified.id());
            return Ok(ProcessedTicket {
                payload: classified.into(),
                outcome,
            });
        }

        let message = format_p1_alert(&classified);
        match self.notifier.notify(&message).await {
            Ok(delivery) => {
                count_classification(&classified);
                delta.notify_success = 1;
                delta.retries_total = u64::from(delivery.retries);
                self.metrics.record(&delta);
                info!(
                    ticket_id = %classified.id(),
                    channel = self.notifier.name(),
                    retries = delivery.retries,
                    "P1 alert sent"
                );
                let outcome = ProcessingOutcome::ok(classified.id());
                Ok(ProcessedTicket {
                    payload: classified.into(),
                    outcome,
                })
            }
            Err(e) => {
                delta.failed = 1;
                delta.notify_failed = 1;
                delta.retries_total = u64::from(e.retries());
                if e.is_exhausted() {
                    delta.retry_exhausted_cases = 1;
                }
                if e.is_not_configured() {
                    delta.notify_not_configured = 1;
                }
                let reason = format!("notify_failed: {}", e);
                count_classification(&classified);
                self.dead_letter(classified.into(), &reason, DeadLetterStage::Notify, delta)
                    .await
            }
        }
    }

    async fn dead_letter(
        &self,
        payload: TicketPayload,
        reason: &str,
        stage: DeadLetterStage,
        mut delta: PipelineCounters,
    ) -> Result<ProcessedTicket, ProcessError> {
        match self.dead_letters.write(&payload, reason, stage).await {
            Ok(path) => {
                delta.dead_lettered = 1;
                self.metrics.record(&delta);
                let outcome = ProcessingOutcome::dead_lettered(payload.ticket_id(), path);
                Ok(ProcessedTicket { payload, outcome })
            }
            Err(source) => {
                self.metrics.record(&delta);
                error!(
                    ticket_id = %payload.ticket_id(),
                    stage = %stage,
                    error = %source,
                    "Dead-letter write failed"
                );
                Err(ProcessError::DeadLetterWrite {
                    ticket_id: payload.ticket_id().to_string(),
                    source,
                })
            }
        }
    }
}

/// Counted at the terminal state so an abandoned ticket is not counted.
fn count_classification(classified: &ClassifiedTicket) {
    CLASSIFICATIONS
        .with_label_values(&[classified.topic.as_str(), classified.priority.as_str()])
        .inc();
}
