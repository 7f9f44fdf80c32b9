//! Error types for the notifier module.

use thiserror::Error;

/// Why a notification was not delivered.
#[derive(Debug, Error)]
pub enum NotifyError {
    /// Channel credentials are missing. No attempt was made.
    #[error("Notifier not configured: {0}")]
    NotConfigured(String),

    /// Every attempt failed.
    #[error("Notification failed after {attempts} attempts: {last_error}")]
    RetriesExhausted { attempts: u32, last_error: String },

    /// The notifier itself failed outside the attempt loop.
    #[error("Notifier error: {0}")]
    Internal(String),
}

impl NotifyError {
    /// Attempts beyond the first that were consumed before giving up.
    pub fn retries(&self) -> u32 {
        match self {
            Self::RetriesExhausted { attempts, .. } => attempts.saturating_sub(1),
            Self::NotConfigured(_) | Self::Internal(_) => 0,
        }
    }

    /// Whether the full attempt budget was used.
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::RetriesExhausted { .. })
    }

    pub fn is_not_configured(&self) -> bool {
        matches!(self, Self::NotConfigured(_))
    }
}

/// Failure of a single delivery attempt. Always retryable.
#[derive(Debug, Error)]
pub enum AttemptError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Not acknowledged: {0}")]
    NotAcknowledged(String),

    #[error("Malformed response: {0}")]
    Malformed(String),
}

impl AttemptError {
    /// Short label for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Transport(_) => "transport",
            Self::Status { .. } => "status",
            Self::NotAcknowledged(_) => "rejected",
            Self::Malformed(_) => "malformed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retries_convention() {
        let exhausted = NotifyError::RetriesExhausted {
            attempts: 3,
            last_error: "HTTP 500".to_string(),
        };
        assert_eq!(exhausted.retries(), 2);
        assert!(exhausted.is_exhausted());

        let unconfigured = NotifyError::NotConfigured("missing bot token".to_string());
        assert_eq!(unconfigured.retries(), 0);
        assert!(!unconfigured.is_exhausted());
        assert!(unconfigured.is_not_configured());
    }

    #[test]
    fn test_error_display() {
        let err = AttemptError::Status {
            status: 502,
            body: "Bad Gateway".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 502: Bad Gateway");
        assert_eq!(err.kind(), "status");
    }
}
