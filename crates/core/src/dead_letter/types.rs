//! Types for the dead-letter module.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::ticket::TicketPayload;

/// Pipeline stage at which a ticket failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeadLetterStage {
    Classify,
    Notify,
}

impl DeadLetterStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeadLetterStage::Classify => "classify",
            DeadLetterStage::Notify => "notify",
        }
    }
}

impl fmt::Display for DeadLetterStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A persisted failure. Written once, never updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeadLetterRecord {
    /// The ticket as it was when it failed (raw or classified).
    pub ticket: TicketPayload,
    pub error_reason: String,
    pub stage: DeadLetterStage,
    pub ts: DateTime<Utc>,
}

/// A record together with where it is stored.
#[derive(Debug, Clone, Serialize)]
pub struct DeadLetterEntry {
    pub path: PathBuf,
    #[serde(flatten)]
    pub record: DeadLetterRecord,
}
