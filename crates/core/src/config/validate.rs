use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Site base URL is an absolute http(s) URL
/// - Crawler page size is not 0
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if !config.site.base_url.starts_with("http://") && !config.site.base_url.starts_with("https://")
    {
        return Err(ConfigError::ValidationError(format!(
            "site.base_url must be an absolute http(s) URL, got {:?}",
            config.site.base_url
        )));
    }

    if config.crawler.page_size == 0 {
        return Err(ConfigError::ValidationError(
            "crawler.page_size cannot be 0".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_valid_config() {
        let config = Config::default();
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_port_zero_fails() {
        let mut config = Config::default();
        config.server.port = 0;
        let result = validate_config(&config);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_validate_relative_base_url_fails() {
        let mut config = Config::default();
        config.site.base_url = "worldofbooks.com".to_string();
        let result = validate_config(&config);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }

    #[test]
    fn test_validate_zero_page_size_fails() {
        let mut config = Config::default();
        config.crawler.page_size = 0;
        let result = validate_config(&config);
        assert!(matches!(result, Err(ConfigError::ValidationError(_))));
    }
}
