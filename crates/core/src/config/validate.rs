use super::{types::Config, ConfigError};

/// Largest attempt cap accepted for the notifier.
pub const MAX_NOTIFY_ATTEMPTS: u32 = 10;

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Notifier attempt cap is within 1..=10
/// - Processor concurrency is at least 1
/// - Dead-letter directory and dataset paths are set
/// - File logging keeps at least one file
/// - An OpenAI summarizer has an API key
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(invalid("server.port cannot be 0"));
    }

    let attempts = config.notifier.max_attempts;
    if !(1..=MAX_NOTIFY_ATTEMPTS).contains(&attempts) {
        return Err(invalid(format!(
            "notifier.max_attempts must be between 1 and {}, got {}",
            MAX_NOTIFY_ATTEMPTS, attempts
        )));
    }

    if config.processor.max_concurrency == 0 {
        return Err(invalid("processor.max_concurrency must be at least 1"));
    }

    if config.dead_letter.dir.as_os_str().is_empty() {
        return Err(invalid("dead_letter.dir cannot be empty"));
    }

    if config.dataset.input_path.as_os_str().is_empty()
        || config.dataset.output_path.as_os_str().is_empty()
    {
        return Err(invalid("dataset.input_path and dataset.output_path are required"));
    }

    if config.logging.file.is_some() && config.logging.max_files == 0 {
        return Err(invalid("logging.max_files must be at least 1 when logging.file is set"));
    }

    if let Some(summarizer) = &config.summarizer {
        let has_key = summarizer
            .api_key
            .as_deref()
            .is_some_and(|k| !k.trim().is_empty());
        if summarizer.provider.requires_api_key() && !has_key {
            return Err(invalid(format!(
                "summarizer.api_key is required for provider '{}'",
                summarizer.provider.as_str()
            )));
        }
    }

    Ok(())
}

fn invalid(message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError(message.into())
}
