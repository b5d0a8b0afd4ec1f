//! Sitelex: a site-scoped search engine
//!
//! This crate crawls configured sites, lemmatizes Russian and English page
//! text into a SQLite-backed index, and answers boolean AND queries with
//! ranked, snippet-highlighted results.

pub mod config;
pub mod crawler;
pub mod morphology;
pub mod search;
pub mod stats;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Sitelex operations
#[derive(Debug, Error)]
pub enum SitelexError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Lemmatizer error: {0}")]
    Morphology(#[from] morphology::MorphologyError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Search query is empty")]
    EmptyQuery,

    #[error("Page {url} is outside the sites listed in the configuration")]
    DomainNotConfigured { url: String },

    #[error("Indexing is already running")]
    AlreadyRunning,

    #[error("Indexing is not running")]
    NotRunning,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Result type alias for Sitelex operations
pub type Result<T> = std::result::Result<T, SitelexError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::CrawlControl;
pub use morphology::Morphology;
pub use search::{SearchEngine, SearchOutcome, SearchResult};
pub use stats::{gather_statistics, SiteStatistics, Statistics};
pub use storage::{IndexStore, SqliteIndexStore};
