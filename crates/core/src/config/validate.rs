use super::{types::Config, ConfigError};
use crate::feed::MAX_PAGE_SIZE;

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Sync page size is between 1 and the feed's page maximum
/// - Feed base URL and sid are set
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    // Server validation
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    // Sync validation
    if config.sync.page_size == 0 {
        return Err(ConfigError::ValidationError(
            "sync.page_size must be at least 1".to_string(),
        ));
    }
    if config.sync.page_size > MAX_PAGE_SIZE {
        return Err(ConfigError::ValidationError(format!(
            "sync.page_size cannot exceed {} (got {})",
            MAX_PAGE_SIZE, config.sync.page_size
        )));
    }

    // Feed validation
    if config.feed.base_url.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "feed.base_url cannot be empty".to_string(),
        ));
    }
    if config.feed.sid.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "feed.sid cannot be empty".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_default_config() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_validate_port_zero_fails() {
        let mut config = Config::default();
        config.server.port = 0;
        let err = validate_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn test_validate_page_size_zero_fails() {
        let mut config = Config::default();
        config.sync.page_size = 0;
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("page_size"));
    }

    #[test]
    fn test_validate_page_size_above_feed_maximum_fails() {
        let mut config = Config::default();
        config.sync.page_size = MAX_PAGE_SIZE;
        assert!(validate_config(&config).is_ok());

        config.sync.page_size = MAX_PAGE_SIZE + 1;
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("cannot exceed 96"));
    }

    #[test]
    fn test_validate_empty_sid_fails() {
        let mut config = Config::default();
        config.feed.sid = "  ".to_string();
        let err = validate_config(&config).unwrap_err();
        assert!(err.to_string().contains("feed.sid"));
    }
}
