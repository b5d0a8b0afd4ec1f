//! Storage traits and error types
//!
//! This module defines the trait interface for index store backends and
//! associated error types.

use crate::storage::{LemmaRecord, PageRecord, PostingRecord, SiteRecord, SiteStatus};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Site not found: {0}")]
    SiteNotFound(String),

    #[error("Page not found: {0}")]
    PageNotFound(i64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for index store backend implementations
///
/// This trait defines all database operations needed by the crawler and
/// the search engine. All write operations must be atomic with respect to
/// the uniqueness constraints on (site, path), (site, lemma) and
/// (page, lemma): concurrent callers racing on the same key must resolve
/// to a single row, never two.
pub trait IndexStore {
    // ===== Site Management =====

    /// Creates a site row in `Indexing` status with a fresh status time
    fn create_site(&mut self, url: &str, name: &str) -> StorageResult<SiteRecord>;

    /// Gets a site by ID
    fn get_site(&self, site_id: i64) -> StorageResult<SiteRecord>;

    /// Gets a site by its root URL
    fn find_site_by_url(&self, url: &str) -> StorageResult<Option<SiteRecord>>;

    /// Gets all site rows
    fn all_sites(&self) -> StorageResult<Vec<SiteRecord>>;

    /// Deletes a site and, transitively, its pages, lemmas and postings
    fn delete_site(&mut self, url: &str) -> StorageResult<()>;

    /// Sets a site's status (and optional error), refreshing its status time
    fn set_site_status(
        &mut self,
        site_id: i64,
        status: SiteStatus,
        error: Option<&str>,
    ) -> StorageResult<()>;

    /// Refreshes a site's status time without changing its status
    ///
    /// Called once per page persisted under the site, as a liveness
    /// heartbeat. Advisory only.
    fn touch_site(&mut self, site_id: i64) -> StorageResult<()>;

    // ===== Page Management =====

    /// Inserts a page, or overwrites its status/content in place if a row
    /// for `(site_id, path)` already exists
    ///
    /// On overwrite, the page's previous postings are removed and each
    /// affected lemma's document frequency is decremented (rows reaching
    /// zero are dropped), so that re-recording terms for the new content
    /// cannot double count.
    ///
    /// # Returns
    ///
    /// The resulting page row, with a stable ID usable for posting creation
    fn upsert_page(
        &mut self,
        site_id: i64,
        path: &str,
        http_status: u16,
        content: &str,
    ) -> StorageResult<PageRecord>;

    /// Checks whether a page row exists for `(site_id, path)`
    fn page_exists(&self, site_id: i64, path: &str) -> StorageResult<bool>;

    /// Gets a page by ID
    fn get_page(&self, page_id: i64) -> StorageResult<PageRecord>;

    // ===== Term Recording =====

    /// Records that `lemma` occurs `rank` times on `page_id`
    ///
    /// Creates the `(site, lemma)` row on first sight; increments its
    /// document frequency only when this call actually created the
    /// `(page, lemma)` posting, which keeps the frequency equal to the
    /// number of distinct pages containing the lemma.
    fn record_term(
        &mut self,
        site_id: i64,
        page_id: i64,
        lemma: &str,
        rank: i64,
    ) -> StorageResult<()>;

    // ===== Search Reads =====

    /// Gets lemma rows matching `text`, optionally scoped to one site
    fn find_lemmas_by_text(
        &self,
        text: &str,
        site_id: Option<i64>,
    ) -> StorageResult<Vec<LemmaRecord>>;

    /// Gets all postings for lemma rows matching `text`, optionally scoped
    /// to one site
    fn find_postings_for_lemma(
        &self,
        text: &str,
        site_id: Option<i64>,
    ) -> StorageResult<Vec<PostingRecord>>;

    // ===== Statistics =====

    /// Counts all site rows
    fn count_sites(&self) -> StorageResult<u64>;

    /// Counts pages under one site
    fn count_pages(&self, site_id: i64) -> StorageResult<u64>;

    /// Counts pages across all sites
    fn count_all_pages(&self) -> StorageResult<u64>;

    /// Counts lemma rows under one site
    fn count_lemmas(&self, site_id: i64) -> StorageResult<u64>;

    /// Counts lemma rows across all sites
    fn count_all_lemmas(&self) -> StorageResult<u64>;
}
