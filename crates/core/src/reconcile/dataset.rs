//! Merged output dataset, stored as a JSON array.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::ticket::TicketRecord;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The previous output exists but cannot be read. Treating it as empty
    /// would re-notify every ticket, so this is an error.
    #[error("Corrupt dataset {path}: {source}")]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Failed to encode dataset: {0}")]
    Encode(#[from] serde_json::Error),
}

/// The output dataset. Rewritten wholesale by a single writer per run.
pub struct JsonDataset {
    path: PathBuf,
}

impl JsonDataset {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Previous rows; empty when the file does not exist yet.
    pub async fn load(&self) -> Result<Vec<TicketRecord>, DatasetError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No previous dataset");
                return Ok(Vec::new());
            }
            Err(source) => {
                return Err(DatasetError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }
        serde_json::from_slice(&bytes).map_err(|source| DatasetError::Corrupt {
            path: self.path.clone(),
            source,
        })
    }

    /// Replace the dataset: write a sibling temp file, then rename over.
    pub async fn save(&self, records: &[TicketRecord]) -> Result<(), DatasetError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| DatasetError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        let bytes = serde_json::to_vec_pretty(records)?;
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, &bytes)
            .await
            .map_err(|source| DatasetError::Io {
                path: tmp.clone(),
                source,
            })?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|source| DatasetError::Io {
                path: self.path.clone(),
                source,
            })?;

        debug!(path = %self.path.display(), rows = records.len(), "Dataset written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ticket::{ProcessingOutcome, Ticket, TicketPayload};
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_missing_dataset_is_empty() {
        let temp = TempDir::new().unwrap();
        let dataset = JsonDataset::new(temp.path().join("out/classified.json"));
        assert!(dataset.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let temp = TempDir::new().unwrap();
        let dataset = JsonDataset::new(temp.path().join("out/classified.json"));
        let record = TicketRecord::from_processed(
            TicketPayload::Raw(Ticket::new("7", "s", "d")),
            &ProcessingOutcome::ok("7"),
        );

        dataset.save(std::slice::from_ref(&record)).await.unwrap();
        let loaded = dataset.load().await.unwrap();
        assert_eq!(loaded, vec![record]);
        assert!(!temp.path().join("out/classified.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_corrupt_dataset_is_an_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("classified.json");
        std::fs::write(&path, "[{").unwrap();
        assert!(matches!(
            JsonDataset::new(&path).load().await,
            Err(DatasetError::Corrupt { .. })
        ));
    }
}
