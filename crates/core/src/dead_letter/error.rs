use std::path::PathBuf;
use thiserror::Error;

/// Dead-letter storage errors. There is no fallback sink, so a failed write is
/// fatal for the ticket being recorded.
#[derive(Debug, Error)]
pub enum DeadLetterError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to encode dead-letter record: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Invalid dead-letter record at {path}: {source}")]
    Decode {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Dead-letter sink unavailable: {0}")]
    Unavailable(String),
}

impl DeadLetterError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
