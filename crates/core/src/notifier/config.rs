//! Configuration for the notifier module.

use serde::{Deserialize, Deserializer, Serialize};
use std::time::Duration;

/// Configuration for urgent-ticket notifications.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifierConfig {
    /// Maximum delivery attempts per message (including the first).
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Base backoff delay in milliseconds; attempt k waits `base * k`.
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Connect timeout in seconds.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Bot API base URL.
    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Optional message formatting mode ("HTML", "MarkdownV2").
    #[serde(default)]
    pub parse_mode: Option<String>,

    /// Channel credentials. Missing values disable delivery.
    #[serde(default)]
    pub telegram: TelegramConfig,
}

/// Telegram bot credentials.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TelegramConfig {
    #[serde(default, deserialize_with = "string_or_number")]
    pub bot_token: Option<String>,
    /// Numeric in the Bot API; environment overrides arrive as integers.
    #[serde(default, deserialize_with = "string_or_number")]
    pub chat_id: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    Number(i64),
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(
        Option::<StringOrNumber>::deserialize(deserializer)?.map(|value| match value {
            StringOrNumber::String(s) => s,
            StringOrNumber::Number(n) => n.to_string(),
        }),
    )
}

impl TelegramConfig {
    /// Both credentials, if present and non-blank.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        let token = self.bot_token.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
        let chat_id = self.chat_id.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
        Some((token, chat_id))
    }
}

fn default_max_attempts() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    1500
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_connect_timeout_secs() -> u64 {
    5
}

fn default_api_base() -> String {
    "https://api.telegram.org".to_string()
}

impl Default for NotifierConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            api_base: default_api_base(),
            parse_mode: None,
            telegram: TelegramConfig::default(),
        }
    }
}

impl NotifierConfig {
    /// Sets the credentials.
    pub fn with_credentials(mut self, bot_token: impl Into<String>, chat_id: impl Into<String>) -> Self {
        self.telegram = TelegramConfig {
            bot_token: Some(bot_token.into()),
            chat_id: Some(chat_id.into()),
        };
        self
    }

    /// Sets the API base URL.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Sets the attempt cap.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Sets the base backoff delay.
    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.base_delay_ms = delay.as_millis() as u64;
        self
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_attempts, Duration::from_millis(self.base_delay_ms))
    }
}

/// Bounded linear backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
}

impl RetryPolicy {
    /// A zero attempt cap is raised to one; the loop always makes at least
    /// one attempt and never more than the cap.
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay after failed attempt `attempt` (1-indexed); `None` after the last.
    pub fn delay_after(&self, attempt: u32) -> Option<Duration> {
        if attempt >= self.max_attempts {
            None
        } else {
            Some(self.base_delay * attempt)
        }
    }
}
