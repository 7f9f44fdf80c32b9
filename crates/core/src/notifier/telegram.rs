//! Telegram Bot API notifier.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

use super::config::NotifierConfig;
use super::error::{AttemptError, NotifyError};
use super::traits::{Delivery, Notifier};
use crate::metrics::{NOTIFY_ATTEMPTS, NOTIFY_ATTEMPT_DURATION};

const CHANNEL: &str = "telegram";

/// Delivers alerts through `sendMessage`, retrying with linear backoff.
pub struct TelegramNotifier {
    client: reqwest::Client,
    config: NotifierConfig,
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct SendMessageResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

impl TelegramNotifier {
    pub fn new(config: NotifierConfig) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(|e| NotifyError::Internal(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client, config })
    }

    /// Whether both credentials are present.
    pub fn is_configured(&self) -> bool {
        self.config.telegram.credentials().is_some()
    }

    async fn attempt(&self, url: &str, request: &SendMessageRequest<'_>) -> Result<(), AttemptError> {
        // The URL carries the bot token; strip it from transport errors.
        let response = self
            .client
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(|e| AttemptError::Transport(e.without_url().to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| AttemptError::Transport(e.without_url().to_string()))?;

        if status != 200 {
            return Err(AttemptError::Status { status, body });
        }

        let parsed: SendMessageResponse =
            serde_json::from_str(&body).map_err(|e| AttemptError::Malformed(e.to_string()))?;

        if parsed.ok {
            Ok(())
        } else {
            Err(AttemptError::NotAcknowledged(
                parsed.description.unwrap_or_else(|| "ok=false".to_string()),
            ))
        }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    fn name(&self) -> &str {
        CHANNEL
    }

    async fn notify(&self, message: &str) -> Result<Delivery, NotifyError> {
        let Some((token, chat_id)) = self.config.telegram.credentials() else {
            warn!("Telegram credentials missing, alert not sent");
            return Err(NotifyError::NotConfigured(
                "bot_token and chat_id are required".to_string(),
            ));
        };

        let url = format!(
            "{}/bot{}/sendMessage",
            self.config.api_base.trim_end_matches('/'),
            token
        );
        let request = SendMessageRequest {
            chat_id,
            text: message,
            parse_mode: self.config.parse_mode.as_deref(),
        };
        let policy = self.config.retry_policy();
        let mut last_error = String::new();

        for attempt in 1..=policy.max_attempts() {
            let start = Instant::now();
            let result = self.attempt(&url, &request).await;
            NOTIFY_ATTEMPT_DURATION
                .with_label_values(&[CHANNEL])
                .observe(start.elapsed().as_secs_f64());

            match result {
                Ok(()) => {
                    NOTIFY_ATTEMPTS
                        .with_label_values(&[CHANNEL, "delivered"])
                        .inc();
                    info!(attempt, "Alert delivered");
                    return Ok(Delivery {
                        retries: attempt - 1,
                    });
                }
                Err(e) => {
                    NOTIFY_ATTEMPTS.with_label_values(&[CHANNEL, e.kind()]).inc();
                    warn!(
                        attempt,
                        max_attempts = policy.max_attempts(),
                        error = %e,
                        "Alert attempt failed"
                    );
                    last_error = e.to_string();
                }
            }

            if let Some(delay) = policy.delay_after(attempt) {
                debug!(delay_ms = delay.as_millis() as u64, "Backing off before retry");
                tokio::time::sleep(delay).await;
            }
        }

        error!(
            attempts = policy.max_attempts(),
            error = %last_error,
            "Alert delivery exhausted all attempts"
        );
        Err(NotifyError::RetriesExhausted {
            attempts: policy.max_attempts(),
            last_error,
        })
    }
}
