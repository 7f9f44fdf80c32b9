use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::error::DeadLetterError;
use super::types::{DeadLetterEntry, DeadLetterRecord, DeadLetterStage};
use crate::ticket::TicketPayload;

/// Append-only store for tickets that could not complete processing.
#[async_trait]
pub trait DeadLetterSink: Send + Sync {
    /// Persist a failure and return where it was written.
    ///
    /// Never overwrites an existing record.
    async fn write(
        &self,
        payload: &TicketPayload,
        reason: &str,
        stage: DeadLetterStage,
    ) -> Result<PathBuf, DeadLetterError>;

    /// All readable records, newest first.
    async fn list(&self) -> Result<Vec<DeadLetterEntry>, DeadLetterError>;

    /// Load a single record.
    async fn read(&self, path: &Path) -> Result<DeadLetterRecord, DeadLetterError>;

    /// Delete records older than `max_age`. Returns the number removed.
    async fn prune_older_than(&self, max_age: Duration) -> Result<usize, DeadLetterError>;
}
