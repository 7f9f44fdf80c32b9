//! Ticket processing pipeline.
//!
//! [`TicketProcessor`] is the per-ticket state machine:
//! classify, page the on-call channel for P1 tickets, dead-letter on failure,
//! and record counters once the ticket reaches OK or DEAD_LETTERED.
//!
//! [`BatchProcessor`] fans a batch out over a bounded pool and collects a
//! [`BatchSummary`]. One ticket's failure never aborts the batch.
//!
//! # Example
//!
//! ```ignore
//! use triage_core::processor::{BatchProcessor, ProcessorConfig, TicketProcessor};
//!
//! let processor = Arc::new(TicketProcessor::new(classifier, notifier, sink, metrics));
//! let batch = BatchProcessor::new(ProcessorConfig::default(), processor);
//!
//! let summary = batch.run(tickets).await;
//! println!("{} processed, {} dead-lettered", summary.processed, summary.dead_lettered);
//! ```

mod batch;
mod config;
mod ticket_processor;
mod types;

pub use batch::BatchProcessor;
pub use config::ProcessorConfig;
pub use ticket_processor::{ProcessError, TicketProcessor};
pub use types::{BatchSummary, PoolStatus, ProcessedTicket, TicketError};
