use crate::config::Config;
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_base_url(&config.base_url)?;
    validate_limits(config)?;
    validate_fetch(config)?;
    Ok(())
}

/// Validates the catalog root URL
fn validate_base_url(base_url: &str) -> Result<(), ConfigError> {
    let parsed = Url::parse(base_url).map_err(|e| ConfigError::InvalidBaseUrl {
        url: base_url.to_string(),
        reason: e.to_string(),
    })?;

    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(ConfigError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: format!("unsupported scheme '{}'", parsed.scheme()),
        });
    }

    if base_url.ends_with('/') {
        return Err(ConfigError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: "must not end with a slash".to_string(),
        });
    }

    Ok(())
}

/// Validates the concurrency bounds
fn validate_limits(config: &Config) -> Result<(), ConfigError> {
    for (name, value) in [
        ("max_category_workers", config.limits.max_category_workers),
        ("max_product_workers", config.limits.max_product_workers),
        ("max_inflight_fetches", config.limits.max_inflight_fetches),
    ] {
        if !(1..=100).contains(&value) {
            return Err(ConfigError::Validation(format!(
                "{} must be between 1 and 100, got {}",
                name, value
            )));
        }
    }

    Ok(())
}

/// Validates the fetch settings
fn validate_fetch(config: &Config) -> Result<(), ConfigError> {
    if config.fetch.timeout.as_secs() < 1 {
        return Err(ConfigError::Validation(format!(
            "fetch timeout must be at least 1 second, got {:?}",
            config.fetch.timeout
        )));
    }

    if config.fetch.user_agent.is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = Config::new("out");
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn rejects_zero_workers() {
        let mut config = Config::new("out");
        config.limits.max_product_workers = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn rejects_excessive_workers() {
        let mut config = Config::new("out");
        config.limits.max_category_workers = 500;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn rejects_trailing_slash_base_url() {
        let mut config = Config::new("out");
        config.base_url = "https://books.toscrape.com/".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn rejects_non_http_scheme() {
        let mut config = Config::new("out");
        config.base_url = "ftp://books.toscrape.com".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn rejects_sub_second_timeout() {
        let mut config = Config::new("out");
        config.fetch.timeout = std::time::Duration::from_millis(200);
        assert!(validate(&config).is_err());
    }
}
