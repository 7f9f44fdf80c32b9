//! Trait definitions for the notifier module.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::error::NotifyError;

/// A delivered notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delivery {
    /// Attempts beyond the first. Zero means the first attempt succeeded.
    pub retries: u32,
}

/// Sends alerts to an external messaging channel.
///
/// Implementations own their retry policy: `notify` returns only once the
/// message is delivered or the attempt budget is spent.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Channel name for logging and metrics.
    fn name(&self) -> &str;

    /// Deliver a formatted message.
    async fn notify(&self, message: &str) -> Result<Delivery, NotifyError>;
}
