//! Batch reconciliation.
//!
//! Re-running over the same input is idempotent: tickets whose identity is
//! already in the output dataset are carried forward untouched and never
//! classified, notified or dead-lettered again.

mod dataset;
mod job;
mod reconciler;
mod source;

pub use dataset::{DatasetError, JsonDataset};
pub use job::{JobError, JobReport, ReconcileJob};
pub use reconciler::{known_ids, merge, partition, Partition};
pub use source::{JsonTicketSource, SourceError, TicketSource};
