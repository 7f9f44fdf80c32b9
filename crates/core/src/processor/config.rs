//! Configuration for the processor module.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for batch processing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessorConfig {
    /// Maximum tickets processed concurrently.
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Overall deadline for one batch run. Unset means no deadline.
    #[serde(default)]
    pub batch_timeout_secs: Option<u64>,
}

fn default_max_concurrency() -> usize {
    4
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            max_concurrency: default_max_concurrency(),
            batch_timeout_secs: None,
        }
    }
}

impl ProcessorConfig {
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency;
        self
    }

    pub fn with_batch_timeout(mut self, timeout: Duration) -> Self {
        self.batch_timeout_secs = Some(timeout.as_secs());
        self
    }

    pub fn batch_timeout(&self) -> Option<Duration> {
        self.batch_timeout_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ProcessorConfig::default();
        assert_eq!(config.max_concurrency, 4);
        assert!(config.batch_timeout().is_none());
    }

    #[test]
    fn test_deserialize_partial() {
        let config: ProcessorConfig = toml::from_str("batch_timeout_secs = 30").unwrap();
        assert_eq!(config.max_concurrency, 4);
        assert_eq!(config.batch_timeout(), Some(Duration::from_secs(30)));
    }
}
