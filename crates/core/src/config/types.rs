use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;
use std::time::Duration;

use crate::notifier::NotifierConfig;
use crate::processor::ProcessorConfig;
use crate::summarizer::SummarizerConfig;

/// Root configuration. Every section is optional.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub notifier: NotifierConfig,
    #[serde(default)]
    pub dead_letter: DeadLetterConfig,
    #[serde(default)]
    pub processor: ProcessorConfig,
    #[serde(default)]
    pub dataset: DatasetConfig,
    #[serde(default)]
    pub summarizer: Option<SummarizerConfig>,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    8080
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Logging configuration. `RUST_LOG` takes precedence over `level`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
    /// Directory for daily-rotated JSON log files, in addition to the console.
    #[serde(default)]
    pub file: Option<PathBuf>,
    /// Rotated files kept in `file`.
    #[serde(default = "default_max_log_files")]
    pub max_files: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
            file: None,
            max_files: default_max_log_files(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_log_files() -> usize {
    7
}

/// Dead-letter directory and retention.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeadLetterConfig {
    #[serde(default = "default_dead_letter_dir")]
    pub dir: PathBuf,
    /// Records older than this are removed by the prune sweep.
    #[serde(default = "default_retention_days")]
    pub retention_days: u64,
    /// Periodic prune interval while serving. Unset means startup only.
    #[serde(default)]
    pub prune_interval_secs: Option<u64>,
}

impl Default for DeadLetterConfig {
    fn default() -> Self {
        Self {
            dir: default_dead_letter_dir(),
            retention_days: default_retention_days(),
            prune_interval_secs: None,
        }
    }
}

impl DeadLetterConfig {
    pub fn retention(&self) -> Duration {
        days(self.retention_days)
    }

    pub fn prune_interval(&self) -> Option<Duration> {
        self.prune_interval_secs
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }
}

/// Whole days as a duration.
pub fn days(days: u64) -> Duration {
    Duration::from_secs(days.saturating_mul(24 * 3600))
}

fn default_dead_letter_dir() -> PathBuf {
    PathBuf::from("dlq")
}

fn default_retention_days() -> u64 {
    7
}

/// Input and output files of the reconciliation job.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatasetConfig {
    #[serde(default = "default_input_path")]
    pub input_path: PathBuf,
    #[serde(default = "default_output_path")]
    pub output_path: PathBuf,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            input_path: default_input_path(),
            output_path: default_output_path(),
        }
    }
}

fn default_input_path() -> PathBuf {
    PathBuf::from("data/tickets.json")
}

fn default_output_path() -> PathBuf {
    PathBuf::from("data/outputs/classified.json")
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub notifier: SanitizedNotifierConfig,
    pub dead_letter: DeadLetterConfig,
    pub processor: ProcessorConfig,
    pub dataset: DatasetConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summarizer: Option<SanitizedSummarizerConfig>,
}

/// Notifier config with credentials hidden.
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedNotifierConfig {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub timeout_secs: u64,
    pub api_base: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_mode: Option<String>,
    pub bot_token_configured: bool,
    pub chat_id_configured: bool,
}

/// Summarizer config with the API key hidden.
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedSummarizerConfig {
    pub provider: String,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
    pub api_key_configured: bool,
    pub timeout_secs: u64,
}

fn is_set(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        let notifier = &config.notifier;
        Self {
            server: config.server.clone(),
            logging: config.logging.clone(),
            notifier: SanitizedNotifierConfig {
                max_attempts: notifier.max_attempts,
                base_delay_ms: notifier.base_delay_ms,
                timeout_secs: notifier.timeout_secs,
                api_base: notifier.api_base.clone(),
                parse_mode: notifier.parse_mode.clone(),
                bot_token_configured: is_set(&notifier.telegram.bot_token),
                chat_id_configured: is_set(&notifier.telegram.chat_id),
            },
            dead_letter: config.dead_letter.clone(),
            processor: config.processor.clone(),
            dataset: config.dataset.clone(),
            summarizer: config
                .summarizer
                .as_ref()
                .map(|s| SanitizedSummarizerConfig {
                    provider: s.provider.as_str().to_string(),
                    model: s.model.clone(),
                    api_base: s.api_base.clone(),
                    api_key_configured: is_set(&s.api_key),
                    timeout_secs: s.timeout_secs,
                }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summarizer::LlmProvider;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host.to_string(), "0.0.0.0");
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert!(config.logging.file.is_none());
        assert_eq!(config.logging.max_files, 7);
        assert_eq!(config.notifier.max_attempts, 3);
        assert_eq!(config.dead_letter.dir, PathBuf::from("dlq"));
        assert_eq!(config.dead_letter.retention(), Duration::from_secs(7 * 86400));
        assert!(config.dead_letter.prune_interval().is_none());
        assert_eq!(config.processor.max_concurrency, 4);
        assert!(config.summarizer.is_none());
    }

    #[test]
    fn test_full_config() {
        let toml = r#"
[server]
host = "127.0.0.1"
port = 9000

[logging]
level = "debug"
format = "json"
file = "/var/log/triage"
max_files = 3

[notifier]
max_attempts = 5
base_delay_ms = 200
parse_mode = "HTML"

[notifier.telegram]
bot_token = "123:abc"
chat_id = "42"

[dead_letter]
dir = "/var/lib/triage/dlq"
retention_days = 14
prune_interval_secs = 3600

[processor]
max_concurrency = 8
batch_timeout_secs = 120

[dataset]
input_path = "in.json"
output_path = "out.json"

[summarizer]
provider = "ollama"
model = "llama3.2:3b"
api_base = "http://gpu-box:11434"
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.logging.file, Some(PathBuf::from("/var/log/triage")));
        assert_eq!(config.logging.max_files, 3);
        assert_eq!(config.notifier.max_attempts, 5);
        assert_eq!(config.notifier.telegram.credentials(), Some(("123:abc", "42")));
        assert_eq!(config.dead_letter.retention_days, 14);
        assert_eq!(
            config.dead_letter.prune_interval(),
            Some(Duration::from_secs(3600))
        );
        assert_eq!(config.processor.max_concurrency, 8);
        assert_eq!(config.dataset.output_path, PathBuf::from("out.json"));
        let summarizer = config.summarizer.unwrap();
        assert_eq!(summarizer.provider, LlmProvider::Ollama);
    }

    #[test]
    fn test_sanitized_config_hides_secrets() {
        let mut config = Config::default();
        config.notifier.telegram.bot_token = Some("123:secret".to_string());
        config.summarizer = Some(SummarizerConfig {
            api_key: Some("sk-secret".to_string()),
            ..Default::default()
        });

        let sanitized = SanitizedConfig::from(&config);
        assert!(sanitized.notifier.bot_token_configured);
        assert!(!sanitized.notifier.chat_id_configured);
        let summarizer = sanitized.summarizer.as_ref().unwrap();
        assert!(summarizer.api_key_configured);
        assert_eq!(summarizer.provider, "openai");

        let json = serde_json::to_string(&sanitized).unwrap();
        assert!(!json.contains("secret"));
    }
}
