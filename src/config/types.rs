use serde::Deserialize;

/// Main configuration structure for sitelex
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub storage: StorageConfig,
    #[serde(default)]
    pub sites: Vec<SiteEntry>,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// User-agent header sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Referer header sent with every request
    pub referrer: String,

    /// Fixed delay before each request (milliseconds)
    #[serde(rename = "request-delay-ms", default = "default_request_delay_ms")]
    pub request_delay_ms: u64,

    /// Per-request timeout (seconds)
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Number of concurrent workers per site
    #[serde(default = "default_workers")]
    pub workers: usize,
}

/// Storage configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,
}

/// One site to crawl and index
#[derive(Debug, Clone, Deserialize)]
pub struct SiteEntry {
    /// Root URL of the site; normalized to end with a trailing slash
    pub url: String,

    /// Display name used in search results and statistics
    pub name: String,
}

fn default_request_delay_ms() -> u64 {
    150
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}
