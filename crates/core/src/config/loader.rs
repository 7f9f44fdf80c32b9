use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use std::path::Path;

use super::{types::Config, ConfigError};

/// Conventional variable names for the bot credentials.
const TELEGRAM_ENV: &[&str] = &["TELEGRAM_BOT_TOKEN", "TELEGRAM_CHAT_ID"];

/// Load configuration from file with environment variable overrides
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound(path.display().to_string()));
    }

    extract(Figment::new().merge(Toml::file(path)))
}

/// Defaults plus environment overrides, for running without a config file.
pub fn load_config_from_env() -> Result<Config, ConfigError> {
    extract(Figment::new())
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}

fn extract(figment: Figment) -> Result<Config, ConfigError> {
    with_env_overrides(figment)
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// `TELEGRAM_BOT_TOKEN` / `TELEGRAM_CHAT_ID`, then `TRIAGE_*` with `__` as
/// the nesting separator (`TRIAGE_NOTIFIER__MAX_ATTEMPTS=5`).
fn with_env_overrides(figment: Figment) -> Figment {
    figment
        .merge(Env::raw().only(TELEGRAM_ENV).map(|key| {
            if key.as_str().eq_ignore_ascii_case("TELEGRAM_BOT_TOKEN") {
                "notifier.telegram.bot_token".into()
            } else {
                "notifier.telegram.chat_id".into()
            }
        }))
        .merge(Env::prefixed("TRIAGE_").split("__"))
}
