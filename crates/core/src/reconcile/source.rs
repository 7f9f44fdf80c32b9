//! Input ticket sources.

use async_trait::async_trait;
use serde_json::Value;
use std::io::ErrorKind;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, warn};

use crate::ticket::Ticket;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Input not found: {0}")]
    NotFound(PathBuf),

    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Input {path} is not a JSON array of tickets: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Supplies the input batch for a reconciliation run.
#[async_trait]
pub trait TicketSource: Send + Sync {
    fn name(&self) -> &str;

    async fn load(&self) -> Result<Vec<Ticket>, SourceError>;
}

/// Reads a JSON array of ticket objects from a file.
///
/// Rows that cannot be read as a ticket (no usable id, wrong shape) are
/// skipped with a warning; the rest of the file still loads.
pub struct JsonTicketSource {
    path: PathBuf,
}

impl JsonTicketSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl TicketSource for JsonTicketSource {
    fn name(&self) -> &str {
        "json"
    }

    async fn load(&self) -> Result<Vec<Ticket>, SourceError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(SourceError::NotFound(self.path.clone()))
            }
            Err(source) => {
                return Err(SourceError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let rows: Vec<Value> =
            serde_json::from_slice(&bytes).map_err(|source| SourceError::Parse {
                path: self.path.clone(),
                source,
            })?;

        let total = rows.len();
        let mut tickets = Vec::with_capacity(total);
        for (index, row) in rows.into_iter().enumerate() {
            match serde_json::from_value::<Ticket>(row) {
                Ok(ticket) => tickets.push(ticket),
                Err(e) => warn!(index, error = %e, "Skipping unreadable input row"),
            }
        }
        debug!(path = %self.path.display(), total, loaded = tickets.len(), "Input loaded");
        Ok(tickets)
    }
}
