//! Mock dead-letter sink for testing.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::dead_letter::{
    DeadLetterEntry, DeadLetterError, DeadLetterRecord, DeadLetterSink, DeadLetterStage,
};
use crate::ticket::TicketPayload;

/// A recorded dead-letter write for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedWrite {
    pub path: PathBuf,
    pub ticket: TicketPayload,
    pub error_reason: String,
    pub stage: DeadLetterStage,
    pub ts: DateTime<Utc>,
}

impl RecordedWrite {
    fn to_record(&self) -> DeadLetterRecord {
        DeadLetterRecord {
            ticket: self.ticket.clone(),
            error_reason: self.error_reason.clone(),
            stage: self.stage,
            ts: self.ts,
        }
    }
}

/// In-memory implementation of the DeadLetterSink trait.
#[derive(Debug)]
pub struct MockDeadLetterSink {
    writes: Arc<RwLock<Vec<RecordedWrite>>>,
    /// When true, every write fails.
    fail: Arc<RwLock<bool>>,
}

impl Default for MockDeadLetterSink {
    fn default() -> Self {
        Self::new()
    }
}

impl MockDeadLetterSink {
    pub fn new() -> Self {
        Self {
            writes: Arc::new(RwLock::new(Vec::new())),
            fail: Arc::new(RwLock::new(false)),
        }
    }

    /// All writes, in call order.
    pub async fn writes(&self) -> Vec<RecordedWrite> {
        self.writes.read().await.clone()
    }

    pub async fn write_count(&self) -> usize {
        self.writes.read().await.len()
    }

    /// Make subsequent writes fail (or succeed again).
    pub async fn set_fail(&self, fail: bool) {
        *self.fail.write().await = fail;
    }
}

#[async_trait]
impl DeadLetterSink for MockDeadLetterSink {
    async fn write(
        &self,
        payload: &TicketPayload,
        reason: &str,
        stage: DeadLetterStage,
    ) -> Result<PathBuf, DeadLetterError> {
        if *self.fail.read().await {
            return Err(DeadLetterError::Unavailable(
                "mock sink rejects writes".to_string(),
            ));
        }

        let mut writes = self.writes.write().await;
        let path = PathBuf::from(format!(
            "mock-dlq/{:04}_{}_{}.json",
            writes.len(),
            payload.ticket_id(),
            stage
        ));
        writes.push(RecordedWrite {
            path: path.clone(),
            ticket: payload.clone(),
            error_reason: reason.to_string(),
            stage,
            ts: Utc::now(),
        });
        Ok(path)
    }

    async fn list(&self) -> Result<Vec<DeadLetterEntry>, DeadLetterError> {
        let writes = self.writes.read().await;
        Ok(writes
            .iter()
            .rev()
            .map(|w| DeadLetterEntry {
                path: w.path.clone(),
                record: w.to_record(),
            })
            .collect())
    }

    async fn read(&self, path: &Path) -> Result<DeadLetterRecord, DeadLetterError> {
        self.writes
            .read()
            .await
            .iter()
            .find(|w| w.path == path)
            .map(RecordedWrite::to_record)
            .ok_or_else(|| {
                DeadLetterError::io(
                    path,
                    std::io::Error::new(std::io::ErrorKind::NotFound, "no such record"),
                )
            })
    }

    async fn prune_older_than(&self, max_age: Duration) -> Result<usize, DeadLetterError> {
        let max_age = chrono::Duration::from_std(max_age)
            .map_err(|e| DeadLetterError::Unavailable(e.to_string()))?;
        let cutoff = Utc::now() - max_age;
        let mut writes = self.writes.write().await;
        let before = writes.len();
        writes.retain(|w| w.ts >= cutoff);
        Ok(before - writes.len())
    }
}
