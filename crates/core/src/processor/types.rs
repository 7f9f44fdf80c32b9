//! Types for the processor module.

use serde::{Deserialize, Serialize};

use crate::ticket::{ProcessingOutcome, TicketPayload};

/// A ticket that reached a terminal state.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessedTicket {
    /// Classified ticket, or the raw ticket when classification failed.
    #[serde(skip)]
    pub payload: TicketPayload,
    #[serde(flatten)]
    pub outcome: ProcessingOutcome,
}

/// A ticket whose processing could not be completed or recorded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TicketError {
    pub ticket_id: String,
    pub error: String,
}

/// Result of one batch run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchSummary {
    /// Tickets submitted.
    pub total: usize,
    /// Tickets that reached a terminal state or a fatal error.
    pub processed: usize,
    pub failed: usize,
    pub dead_lettered: usize,
    /// Terminal outcomes in completion order.
    pub results: Vec<ProcessedTicket>,
    pub errors: Vec<TicketError>,
    /// The batch deadline expired; unfinished tickets were abandoned.
    pub timed_out: bool,
}

impl BatchSummary {
    pub fn outcomes(&self) -> impl Iterator<Item = &ProcessingOutcome> {
        self.results.iter().map(|r| &r.outcome)
    }
}

/// Status of the processing pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PoolStatus {
    /// Tickets holding a permit.
    pub active_jobs: usize,
    pub max_concurrent: usize,
    /// Tickets waiting for a permit.
    pub queued_jobs: usize,
    /// Total tickets processed since startup.
    pub total_processed: u64,
    /// Total tickets that did not end OK since startup.
    pub total_failed: u64,
}
