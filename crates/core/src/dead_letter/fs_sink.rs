//! Filesystem dead-letter sink: one pretty-printed JSON document per failure.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tokio::io::AsyncWriteExt;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::error::DeadLetterError;
use super::traits::DeadLetterSink;
use super::types::{DeadLetterEntry, DeadLetterRecord, DeadLetterStage};
use crate::metrics::DEAD_LETTER_WRITES;
use crate::ticket::TicketPayload;

const MAX_ID_LEN: usize = 64;

/// Writes records as `{ts}_{ticket_id}_{stage}.json` under a directory.
pub struct FsDeadLetterSink {
    dir: PathBuf,
}

impl FsDeadLetterSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn file_name(ts: &DateTime<Utc>, ticket_id: &str, stage: DeadLetterStage) -> String {
        format!(
            "{}_{}_{}.json",
            ts.format("%Y%m%dT%H%M%S%.6f"),
            sanitize_id(ticket_id),
            stage
        )
    }

    async fn json_files(&self) -> Result<Vec<PathBuf>, DeadLetterError> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(DeadLetterError::io(&self.dir, e)),
        };

        let mut files = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| DeadLetterError::io(&self.dir, e))?
        {
            let path = entry.path();
            if path.extension().and_then(|ext| ext.to_str()) == Some("json") {
                files.push(path);
            }
        }
        Ok(files)
    }
}

/// Keeps ids filesystem-safe: anything outside `[A-Za-z0-9_-]` becomes `_`.
fn sanitize_id(id: &str) -> String {
    let cleaned: String = id
        .chars()
        .take(MAX_ID_LEN)
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "unknown".to_string()
    } else {
        cleaned
    }
}

async fn create_exclusive(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = tokio::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await?;
    file.write_all(bytes).await?;
    file.sync_all().await
}

#[async_trait]
impl DeadLetterSink for FsDeadLetterSink {
    async fn write(
        &self,
        payload: &TicketPayload,
        reason: &str,
        stage: DeadLetterStage,
    ) -> Result<PathBuf, DeadLetterError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| DeadLetterError::io(&self.dir, e))?;

        let record = DeadLetterRecord {
            ticket: payload.clone(),
            error_reason: reason.to_string(),
            stage,
            ts: Utc::now(),
        };
        let bytes = serde_json::to_vec_pretty(&record)?;

        let file_name = Self::file_name(&record.ts, payload.ticket_id(), stage);
        let mut path = self.dir.join(&file_name);
        match create_exclusive(&path, &bytes).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                let stem = file_name.trim_end_matches(".json");
                path = self
                    .dir
                    .join(format!("{}_{}.json", stem, Uuid::new_v4().simple()));
                debug!(path = %path.display(), "Dead-letter name taken, using suffixed name");
                create_exclusive(&path, &bytes)
                    .await
                    .map_err(|e| DeadLetterError::io(&path, e))?;
            }
            Err(e) => return Err(DeadLetterError::io(&path, e)),
        }

        DEAD_LETTER_WRITES.with_label_values(&[stage.as_str()]).inc();
        error!(
            ticket_id = %payload.ticket_id(),
            stage = %stage,
            reason = %reason,
            path = %path.display(),
            "Ticket dead-lettered"
        );
        Ok(path)
    }

    async fn list(&self) -> Result<Vec<DeadLetterEntry>, DeadLetterError> {
        let mut entries = Vec::new();
        for path in self.json_files().await? {
            match self.read(&path).await {
                Ok(record) => entries.push(DeadLetterEntry { path, record }),
                Err(e) => warn!(error = %e, "Skipping unreadable dead-letter record"),
            }
        }
        entries.sort_by(|a, b| {
            b.record
                .ts
                .cmp(&a.record.ts)
                .then_with(|| b.path.cmp(&a.path))
        });
        Ok(entries)
    }

    async fn read(&self, path: &Path) -> Result<DeadLetterRecord, DeadLetterError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| DeadLetterError::io(path, e))?;
        serde_json::from_slice(&bytes).map_err(|source| DeadLetterError::Decode {
            path: path.to_path_buf(),
            source,
        })
    }

    async fn prune_older_than(&self, max_age: Duration) -> Result<usize, DeadLetterError> {
        let Some(cutoff) = SystemTime::now().checked_sub(max_age) else {
            return Ok(0);
        };

        let mut removed = 0;
        for path in self.json_files().await? {
            let modified = match tokio::fs::metadata(&path).await.and_then(|m| m.modified()) {
                Ok(modified) => modified,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Cannot stat dead-letter record");
                    continue;
                }
            };
            if modified >= cutoff {
                continue;
            }
            match tokio::fs::remove_file(&path).await {
                Ok(()) => removed += 1,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Failed to remove dead-letter record")
                }
            }
        }

        info!(
            dir = %self.dir.display(),
            removed,
            max_age_secs = max_age.as_secs(),
            "Pruned dead-letter records"
        );
        Ok(removed)
    }
}
