use crate::config::types::{Config, CrawlerConfig, SiteEntry, StorageConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_storage_config(&config.storage)?;
    validate_sites(&config.sites)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.user_agent.is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    Url::parse(&config.referrer)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid referrer: {}", e)))?;

    if config.request_delay_ms > 10_000 {
        return Err(ConfigError::Validation(format!(
            "request_delay_ms must be <= 10000ms, got {}ms",
            config.request_delay_ms
        )));
    }

    if config.request_timeout_secs < 1 || config.request_timeout_secs > 120 {
        return Err(ConfigError::Validation(format!(
            "request_timeout_secs must be between 1 and 120, got {}",
            config.request_timeout_secs
        )));
    }

    if config.workers < 1 || config.workers > 64 {
        return Err(ConfigError::Validation(format!(
            "workers must be between 1 and 64, got {}",
            config.workers
        )));
    }

    Ok(())
}

/// Validates storage configuration
fn validate_storage_config(config: &StorageConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates the configured site list
fn validate_sites(sites: &[SiteEntry]) -> Result<(), ConfigError> {
    if sites.is_empty() {
        return Err(ConfigError::Validation(
            "at least one site must be configured".to_string(),
        ));
    }

    for site in sites {
        if site.name.is_empty() {
            return Err(ConfigError::Validation(format!(
                "site '{}' must have a non-empty name",
                site.url
            )));
        }

        let url = Url::parse(&site.url)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid site URL '{}': {}", site.url, e)))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::Validation(format!(
                "site URL '{}' must use the http or https scheme",
                site.url
            )));
        }

        if url.host_str().is_none() {
            return Err(ConfigError::Validation(format!(
                "site URL '{}' has no host",
                site.url
            )));
        }
    }

    Ok(())
}
