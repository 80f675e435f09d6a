//! Configuration validation utilities.

use super::ConfigError;
use super::models::*;

/// Validate the entire configuration.
pub fn validate_config(config: &RelgraphConfig) -> Result<(), ConfigError> {
    validate_auth_config(&config.auth)?;
    validate_search_config(&config.search)?;
    Ok(())
}

fn validate_auth_config(config: &AuthConfig) -> Result<(), ConfigError> {
    if config.enabled && config.secret.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "auth.secret cannot be empty when auth is enabled".to_string(),
        ));
    }
    Ok(())
}

fn validate_search_config(config: &SearchConfig) -> Result<(), ConfigError> {
    if config.default_per_page == 0 {
        return Err(ConfigError::ValidationError(
            "search.default_per_page must be greater than 0".to_string(),
        ));
    }
    if config.max_per_page < config.default_per_page {
        return Err(ConfigError::ValidationError(format!(
            "search.max_per_page ({}) cannot be below search.default_per_page ({})",
            config.max_per_page, config.default_per_page
        )));
    }
    Ok(())
}
