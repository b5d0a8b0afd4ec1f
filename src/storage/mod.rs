//! Storage module for the site index
//!
//! This module owns the four persisted relations of the index, including:
//! - Site lifecycle rows (status, heartbeat, last error)
//! - Fetched pages keyed by (site, path)
//! - Lemmas with per-site document frequencies
//! - Postings linking lemmas to the pages that contain them

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteIndexStore;
pub use traits::{IndexStore, StorageError, StorageResult};

use crate::SitelexError;

use std::path::Path;

/// Initializes or opens an index database
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
///
/// # Returns
///
/// * `Ok(SqliteIndexStore)` - Successfully initialized store
/// * `Err(SitelexError)` - Failed to initialize store
pub fn open_store(path: &Path) -> Result<SqliteIndexStore, SitelexError> {
    SqliteIndexStore::new(path)
}

/// Represents a configured site in the database
#[derive(Debug, Clone)]
pub struct SiteRecord {
    pub id: i64,
    pub url: String,
    pub name: String,
    pub status: SiteStatus,
    pub status_time: String,
    pub last_error: Option<String>,
}

/// Represents a fetched page under a site
#[derive(Debug, Clone)]
pub struct PageRecord {
    pub id: i64,
    pub site_id: i64,
    pub path: String,
    pub http_status: u16,
    pub content: String,
}

/// Represents a normalized term and its per-site document frequency
///
/// `frequency` counts the distinct pages of the site that contain the
/// lemma at least once, never raw occurrences.
#[derive(Debug, Clone)]
pub struct LemmaRecord {
    pub id: i64,
    pub site_id: i64,
    pub lemma: String,
    pub frequency: i64,
}

/// Represents one lemma-in-page posting
///
/// `rank` is the raw occurrence count of the lemma on the page.
#[derive(Debug, Clone)]
pub struct PostingRecord {
    pub id: i64,
    pub page_id: i64,
    pub lemma_id: i64,
    pub rank: i64,
}

/// Indexing lifecycle status of a site
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiteStatus {
    Indexing,
    Indexed,
    Failed,
}

impl SiteStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Indexing => "indexing",
            Self::Indexed => "indexed",
            Self::Failed => "failed",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "indexing" => Some(Self::Indexing),
            "indexed" => Some(Self::Indexed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }

    /// Whether the status is terminal for a crawl run
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Indexed | Self::Failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_site_status_roundtrip() {
        for status in &[SiteStatus::Indexing, SiteStatus::Indexed, SiteStatus::Failed] {
            let db_str = status.to_db_string();
            let parsed = SiteStatus::from_db_string(db_str);
            assert_eq!(Some(*status), parsed);
        }
    }

    #[test]
    fn test_site_status_invalid() {
        assert_eq!(SiteStatus::from_db_string("unknown"), None);
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(!SiteStatus::Indexing.is_terminal());
        assert!(SiteStatus::Indexed.is_terminal());
        assert!(SiteStatus::Failed.is_terminal());
    }
}
