use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use std::path::Path;
use url::Url;

/// Loads and parses a configuration file from the given path
///
/// Site URLs are normalized to trailing-slash roots after validation, so
/// downstream scope checks can rely on prefix matching.
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use sitelex::config::load_config;
///
/// let config = load_config(Path::new("config.toml")).unwrap();
/// println!("Crawling {} sites", config.sites.len());
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    // Read the configuration file
    let content = std::fs::read_to_string(path)?;

    // Parse TOML
    let mut config: Config = toml::from_str(&content)?;

    // Validate the configuration
    validate(&config)?;

    // Normalize site roots (validation guaranteed they parse)
    normalize_site_roots(&mut config)?;

    Ok(config)
}

/// Rewrites every configured site URL into its canonical trailing-slash form
fn normalize_site_roots(config: &mut Config) -> Result<(), ConfigError> {
    for site in &mut config.sites {
        let parsed = Url::parse(&site.url)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid site URL '{}': {}", site.url, e)))?;

        let mut normalized = parsed.to_string();
        if !normalized.ends_with('/') {
            normalized.push('/');
        }
        site.url = normalized;
    }

    Ok(())
}
