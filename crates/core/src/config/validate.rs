use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Candidate limit and poll interval are positive
/// - A configured Jackett backend carries an API key
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if config.sources.max_candidates == 0 {
        return Err(ConfigError::ValidationError(
            "sources.max_candidates cannot be 0".to_string(),
        ));
    }

    if config.lifecycle.poll_interval_ms == 0 {
        return Err(ConfigError::ValidationError(
            "lifecycle.poll_interval_ms cannot be 0".to_string(),
        ));
    }

    if let Some(jackett) = config.searcher.as_ref().and_then(|s| s.jackett.as_ref()) {
        if jackett.api_key.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "searcher.jackett.api_key cannot be empty".to_string(),
            ));
        }
    }

    Ok(())
}
