use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use triage_core::{
    BatchProcessor, Classifier, Config, DeadLetterError, DeadLetterSink, FsDeadLetterSink,
    JsonDataset, JsonTicketSource, Notifier, PipelineMetrics, ReconcileJob, RuleClassifier,
    SanitizedConfig, Summarizer, TelegramNotifier, TicketProcessor,
};

/// Shared application state
pub struct AppState {
    config: Config,
    batch: Arc<BatchProcessor>,
    job: Arc<ReconcileJob>,
    metrics: Arc<PipelineMetrics>,
    dead_letters: Arc<dyn DeadLetterSink>,
}

impl AppState {
    /// Wire the pipeline from configuration: keyword classifier, Telegram
    /// notifier and the dead-letter directory.
    pub fn from_config(config: Config) -> Result<Self> {
        let notifier = TelegramNotifier::new(config.notifier.clone())
            .context("Failed to create Telegram notifier")?;
        if notifier.is_configured() {
            info!(api_base = %config.notifier.api_base, "Telegram notifier configured");
        } else {
            warn!("TELEGRAM_BOT_TOKEN/TELEGRAM_CHAT_ID not set, P1 alerts will be dead-lettered");
        }

        Self::with_components(config, Arc::new(RuleClassifier::new()), Arc::new(notifier))
    }

    /// Wire the pipeline around the given classifier and notifier.
    pub fn with_components(
        config: Config,
        classifier: Arc<dyn Classifier>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        let metrics = Arc::new(PipelineMetrics::new());
        let dead_letters: Arc<dyn DeadLetterSink> =
            Arc::new(FsDeadLetterSink::new(config.dead_letter.dir.clone()));

        let processor = Arc::new(TicketProcessor::new(
            classifier,
            notifier,
            Arc::clone(&dead_letters),
            Arc::clone(&metrics),
        ));
        let batch = Arc::new(BatchProcessor::new(config.processor.clone(), processor));

        let mut job = ReconcileJob::new(
            Arc::new(JsonTicketSource::new(config.dataset.input_path.clone())),
            JsonDataset::new(config.dataset.output_path.clone()),
            Arc::clone(&batch),
        );
        if let Some(summarizer_config) = &config.summarizer {
            let summarizer = Summarizer::from_config(summarizer_config)
                .context("Failed to create summarizer")?;
            info!(provider = summarizer.provider(), "Weekly summary enabled");
            job = job.with_summarizer(summarizer);
        }

        Ok(Self {
            config,
            batch,
            job: Arc::new(job),
            metrics,
            dead_letters,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn batch(&self) -> &Arc<BatchProcessor> {
        &self.batch
    }

    pub fn job(&self) -> &Arc<ReconcileJob> {
        &self.job
    }

    pub fn metrics(&self) -> &Arc<PipelineMetrics> {
        &self.metrics
    }

    pub fn dead_letters(&self) -> &Arc<dyn DeadLetterSink> {
        &self.dead_letters
    }

    /// Remove dead-letter records older than `max_age`.
    pub async fn prune_dead_letters(&self, max_age: Duration) -> Result<usize, DeadLetterError> {
        self.dead_letters.prune_older_than(max_age).await
    }
}

/// Short SHA-256 fingerprint of the effective config, logged at startup so
/// deployments can be told apart. Computed over the sanitized form.
pub fn config_fingerprint(config: &Config) -> String {
    let json = serde_json::to_string(&SanitizedConfig::from(config)).unwrap_or_default();
    let hash = format!("{:x}", Sha256::digest(json.as_bytes()));
    hash[..16].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_fingerprint_is_stable() {
        let config = Config::default();
        let a = config_fingerprint(&config);
        let b = config_fingerprint(&config);
        assert_eq!(a, b);
        assert_eq!(a.len(), 16);

        let mut other = Config::default();
        other.server.port = 9999;
        assert_ne!(config_fingerprint(&other), a);
    }

    #[test]
    fn test_fingerprint_ignores_secret_values() {
        let mut a = Config::default();
        a.notifier.telegram.bot_token = Some("one".to_string());
        let mut b = Config::default();
        b.notifier.telegram.bot_token = Some("two".to_string());
        assert_eq!(config_fingerprint(&a), config_fingerprint(&b));
    }

    #[tokio::test]
    async fn test_from_config_without_credentials() {
        let temp = tempfile::TempDir::new().unwrap();
        let mut config = Config::default();
        config.dead_letter.dir = temp.path().join("dlq");

        let state = AppState::from_config(config).unwrap();
        assert_eq!(state.metrics().snapshot().counters.processed, 0);
        assert_eq!(state.prune_dead_letters(Duration::from_secs(1)).await.unwrap(), 0);
    }
}
