//! SQLite index store implementation
//!
//! This module provides a SQLite-based implementation of the IndexStore
//! trait. All multi-statement writes run inside transactions and lean on
//! the schema's UNIQUE constraints, so the create-vs-update decision for
//! a page or a lemma can never be lost to a concurrent caller.

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{IndexStore, StorageError, StorageResult};
use crate::storage::{LemmaRecord, PageRecord, PostingRecord, SiteRecord, SiteStatus};
use crate::SitelexError;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

/// SQLite index store backend
pub struct SqliteIndexStore {
    conn: Connection,
}

fn site_from_row(row: &Row) -> rusqlite::Result<SiteRecord> {
    Ok(SiteRecord {
        id: row.get(0)?,
        url: row.get(1)?,
        name: row.get(2)?,
        status: SiteStatus::from_db_string(&row.get::<_, String>(3)?)
            .unwrap_or(SiteStatus::Failed),
        status_time: row.get(4)?,
        last_error: row.get(5)?,
    })
}

fn posting_from_row(row: &Row) -> rusqlite::Result<PostingRecord> {
    Ok(PostingRecord {
        id: row.get(0)?,
        page_id: row.get(1)?,
        lemma_id: row.get(2)?,
        rank: row.get(3)?,
    })
}

impl SqliteIndexStore {
    /// Creates a new SqliteIndexStore instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteIndexStore)` - Successfully opened/created database
    /// * `Err(SitelexError)` - Failed to open database
    pub fn new(path: &Path) -> Result<Self, SitelexError> {
        let conn = Connection::open(path)?;

        // Configure SQLite for better performance
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn new_in_memory() -> Result<Self, SitelexError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

impl IndexStore for SqliteIndexStore {
    // ===== Site Management =====

    fn create_site(&mut self, url: &str, name: &str) -> StorageResult<SiteRecord> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO sites (url, name, status, status_time) VALUES (?1, ?2, ?3, ?4)",
            params![url, name, SiteStatus::Indexing.to_db_string(), now],
        )?;

        Ok(SiteRecord {
            id: self.conn.last_insert_rowid(),
            url: url.to_string(),
            name: name.to_string(),
            status: SiteStatus::Indexing,
            status_time: now,
            last_error: None,
        })
    }

    fn get_site(&self, site_id: i64) -> StorageResult<SiteRecord> {
        let mut stmt = self.conn.prepare(
            "SELECT id, url, name, status, status_time, last_error FROM sites WHERE id = ?1",
        )?;

        let site = stmt
            .query_row(params![site_id], site_from_row)
            .map_err(|_| StorageError::SiteNotFound(format!("site ID {}", site_id)))?;

        Ok(site)
    }

    fn find_site_by_url(&self, url: &str) -> StorageResult<Option<SiteRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, url, name, status, status_time, last_error FROM sites WHERE url = ?1",
        )?;

        let site = stmt.query_row(params![url], site_from_row).optional()?;

        Ok(site)
    }

    fn all_sites(&self) -> StorageResult<Vec<SiteRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, url, name, status, status_time, last_error FROM sites ORDER BY id",
        )?;

        let sites = stmt
            .query_map([], site_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(sites)
    }

    fn delete_site(&mut self, url: &str) -> StorageResult<()> {
        // Cascades through pages, lemmas and postings
        self.conn
            .execute("DELETE FROM sites WHERE url = ?1", params![url])?;
        Ok(())
    }

    fn set_site_status(
        &mut self,
        site_id: i64,
        status: SiteStatus,
        error: Option<&str>,
    ) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "UPDATE sites SET status = ?1, status_time = ?2, last_error = ?3 WHERE id = ?4",
            params![status.to_db_string(), now, error, site_id],
        )?;
        Ok(())
    }

    fn touch_site(&mut self, site_id: i64) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "UPDATE sites SET status_time = ?1 WHERE id = ?2",
            params![now, site_id],
        )?;
        Ok(())
    }

    // ===== Page Management =====

    fn upsert_page(
        &mut self,
        site_id: i64,
        path: &str,
        http_status: u16,
        content: &str,
    ) -> StorageResult<PageRecord> {
        let tx = self.conn.transaction()?;

        let existing: Option<i64> = tx
            .query_row(
                "SELECT id FROM pages WHERE site_id = ?1 AND path = ?2",
                params![site_id, path],
                |row| row.get(0),
            )
            .optional()?;

        let page_id = match existing {
            Some(id) => {
                // Postings from the previous version of this page must not
                // keep inflating document frequencies.
                tx.execute(
                    "UPDATE lemmas SET frequency = frequency - 1
                     WHERE id IN (SELECT lemma_id FROM postings WHERE page_id = ?1)",
                    params![id],
                )?;
                tx.execute("DELETE FROM postings WHERE page_id = ?1", params![id])?;
                tx.execute(
                    "DELETE FROM lemmas WHERE site_id = ?1 AND frequency <= 0",
                    params![site_id],
                )?;
                tx.execute(
                    "UPDATE pages SET http_status = ?1, content = ?2 WHERE id = ?3",
                    params![http_status, content, id],
                )?;
                id
            }
            None => {
                tx.execute(
                    "INSERT INTO pages (site_id, path, http_status, content) VALUES (?1, ?2, ?3, ?4)",
                    params![site_id, path, http_status, content],
                )?;
                tx.last_insert_rowid()
            }
        };

        tx.commit()?;

        Ok(PageRecord {
            id: page_id,
            site_id,
            path: path.to_string(),
            http_status,
            content: content.to_string(),
        })
    }

    fn page_exists(&self, site_id: i64, path: &str) -> StorageResult<bool> {
        let found: Option<i64> = self
            .conn
            .query_row(
                "SELECT id FROM pages WHERE site_id = ?1 AND path = ?2",
                params![site_id, path],
                |row| row.get(0),
            )
            .optional()?;

        Ok(found.is_some())
    }

    fn get_page(&self, page_id: i64) -> StorageResult<PageRecord> {
        let mut stmt = self.conn.prepare(
            "SELECT id, site_id, path, http_status, content FROM pages WHERE id = ?1",
        )?;

        let page = stmt
            .query_row(params![page_id], |row| {
                Ok(PageRecord {
                    id: row.get(0)?,
                    site_id: row.get(1)?,
                    path: row.get(2)?,
                    http_status: row.get(3)?,
                    content: row.get(4)?,
                })
            })
            .map_err(|_| StorageError::PageNotFound(page_id))?;

        Ok(page)
    }

    // ===== Term Recording =====

    fn record_term(
        &mut self,
        site_id: i64,
        page_id: i64,
        lemma: &str,
        rank: i64,
    ) -> StorageResult<()> {
        let tx = self.conn.transaction()?;

        tx.execute(
            "INSERT INTO lemmas (site_id, lemma, frequency) VALUES (?1, ?2, 0)
             ON CONFLICT(site_id, lemma) DO NOTHING",
            params![site_id, lemma],
        )?;

        let lemma_id: i64 = tx.query_row(
            "SELECT id FROM lemmas WHERE site_id = ?1 AND lemma = ?2",
            params![site_id, lemma],
            |row| row.get(0),
        )?;

        let inserted = tx.execute(
            "INSERT INTO postings (page_id, lemma_id, rank) VALUES (?1, ?2, ?3)
             ON CONFLICT(page_id, lemma_id) DO NOTHING",
            params![page_id, lemma_id, rank],
        )?;

        // The frequency counts distinct pages, so it moves only when the
        // posting insert actually landed.
        if inserted == 1 {
            tx.execute(
                "UPDATE lemmas SET frequency = frequency + 1 WHERE id = ?1",
                params![lemma_id],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    // ===== Search Reads =====

    fn find_lemmas_by_text(
        &self,
        text: &str,
        site_id: Option<i64>,
    ) -> StorageResult<Vec<LemmaRecord>> {
        let map_row = |row: &Row| -> rusqlite::Result<LemmaRecord> {
            Ok(LemmaRecord {
                id: row.get(0)?,
                site_id: row.get(1)?,
                lemma: row.get(2)?,
                frequency: row.get(3)?,
            })
        };

        let lemmas = match site_id {
            Some(site_id) => {
                let mut stmt = self.conn.prepare(
                    "SELECT id, site_id, lemma, frequency FROM lemmas
                     WHERE lemma = ?1 AND site_id = ?2",
                )?;
                let rows = stmt
                    .query_map(params![text, site_id], map_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                rows
            }
            None => {
                let mut stmt = self.conn.prepare(
                    "SELECT id, site_id, lemma, frequency FROM lemmas WHERE lemma = ?1",
                )?;
                let rows = stmt
                    .query_map(params![text], map_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                rows
            }
        };

        Ok(lemmas)
    }

    fn find_postings_for_lemma(
        &self,
        text: &str,
        site_id: Option<i64>,
    ) -> StorageResult<Vec<PostingRecord>> {
        let postings = match site_id {
            Some(site_id) => {
                let mut stmt = self.conn.prepare(
                    "SELECT p.id, p.page_id, p.lemma_id, p.rank
                     FROM postings p JOIN lemmas l ON p.lemma_id = l.id
                     WHERE l.lemma = ?1 AND l.site_id = ?2",
                )?;
                let rows = stmt
                    .query_map(params![text, site_id], posting_from_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                rows
            }
            None => {
                let mut stmt = self.conn.prepare(
                    "SELECT p.id, p.page_id, p.lemma_id, p.rank
                     FROM postings p JOIN lemmas l ON p.lemma_id = l.id
                     WHERE l.lemma = ?1",
                )?;
                let rows = stmt
                    .query_map(params![text], posting_from_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                rows
            }
        };

        Ok(postings)
    }

    // ===== Statistics =====

    fn count_sites(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM sites", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn count_pages(&self, site_id: i64) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM pages WHERE site_id = ?1",
            params![site_id],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn count_all_pages(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM pages", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn count_lemmas(&self, site_id: i64) -> StorageResult<u64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM lemmas WHERE site_id = ?1",
            params![site_id],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    fn count_all_lemmas(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM lemmas", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_store() -> SqliteIndexStore {
        SqliteIndexStore::new_in_memory().unwrap()
    }

    fn create_test_site(store: &mut SqliteIndexStore) -> SiteRecord {
        store
            .create_site("https://example.com/", "Example")
            .unwrap()
    }

    #[test]
    fn test_create_in_memory() {
        let store = SqliteIndexStore::new_in_memory();
        assert!(store.is_ok());
    }

    #[test]
    fn test_create_and_find_site() {
        let mut store = create_test_store();
        let site = create_test_site(&mut store);

        assert!(site.id > 0);
        assert_eq!(site.status, SiteStatus::Indexing);

        let found = store.find_site_by_url("https://example.com/").unwrap();
        assert_eq!(found.unwrap().id, site.id);
        assert!(store.find_site_by_url("https://other.com/").unwrap().is_none());
    }

    #[test]
    fn test_set_site_status() {
        let mut store = create_test_store();
        let site = create_test_site(&mut store);

        store
            .set_site_status(site.id, SiteStatus::Failed, Some("boom"))
            .unwrap();

        let reloaded = store.get_site(site.id).unwrap();
        assert_eq!(reloaded.status, SiteStatus::Failed);
        assert_eq!(reloaded.last_error.as_deref(), Some("boom"));
    }

    #[test]
    fn test_upsert_page_inserts() {
        let mut store = create_test_store();
        let site = create_test_site(&mut store);

        let page = store
            .upsert_page(site.id, "/about", 200, "<html>about</html>")
            .unwrap();

        assert!(page.id > 0);
        assert!(store.page_exists(site.id, "/about").unwrap());
        assert!(!store.page_exists(site.id, "/missing").unwrap());
    }

    #[test]
    fn test_upsert_page_overwrites_in_place() {
        let mut store = create_test_store();
        let site = create_test_site(&mut store);

        let first = store.upsert_page(site.id, "/", 200, "<html>v1</html>").unwrap();
        let second = store.upsert_page(site.id, "/", 200, "<html>v2</html>").unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(store.count_pages(site.id).unwrap(), 1);

        let reloaded = store.get_page(first.id).unwrap();
        assert_eq!(reloaded.content, "<html>v2</html>");
    }

    #[test]
    fn test_record_term_creates_lemma_and_posting() {
        let mut store = create_test_store();
        let site = create_test_site(&mut store);
        let page = store.upsert_page(site.id, "/", 200, "<html></html>").unwrap();

        store.record_term(site.id, page.id, "rust", 3).unwrap();

        let lemmas = store.find_lemmas_by_text("rust", Some(site.id)).unwrap();
        assert_eq!(lemmas.len(), 1);
        assert_eq!(lemmas[0].frequency, 1);

        let postings = store.find_postings_for_lemma("rust", Some(site.id)).unwrap();
        assert_eq!(postings.len(), 1);
        assert_eq!(postings[0].page_id, page.id);
        assert_eq!(postings[0].rank, 3);
    }

    #[test]
    fn test_record_term_counts_distinct_pages() {
        let mut store = create_test_store();
        let site = create_test_site(&mut store);
        let page_a = store.upsert_page(site.id, "/a", 200, "<html></html>").unwrap();
        let page_b = store.upsert_page(site.id, "/b", 200, "<html></html>").unwrap();

        store.record_term(site.id, page_a.id, "rust", 2).unwrap();
        store.record_term(site.id, page_b.id, "rust", 5).unwrap();

        let lemmas = store.find_lemmas_by_text("rust", Some(site.id)).unwrap();
        assert_eq!(lemmas.len(), 1);
        assert_eq!(lemmas[0].frequency, 2);
    }

    #[test]
    fn test_record_term_same_page_does_not_double_count() {
        let mut store = create_test_store();
        let site = create_test_site(&mut store);
        let page = store.upsert_page(site.id, "/", 200, "<html></html>").unwrap();

        store.record_term(site.id, page.id, "rust", 2).unwrap();
        store.record_term(site.id, page.id, "rust", 2).unwrap();

        let lemmas = store.find_lemmas_by_text("rust", Some(site.id)).unwrap();
        assert_eq!(lemmas[0].frequency, 1);

        let postings = store.find_postings_for_lemma("rust", Some(site.id)).unwrap();
        assert_eq!(postings.len(), 1);
    }

    #[test]
    fn test_upsert_existing_page_clears_old_postings() {
        let mut store = create_test_store();
        let site = create_test_site(&mut store);
        let page_a = store.upsert_page(site.id, "/a", 200, "<html></html>").unwrap();
        let page_b = store.upsert_page(site.id, "/b", 200, "<html></html>").unwrap();

        store.record_term(site.id, page_a.id, "shared", 1).unwrap();
        store.record_term(site.id, page_b.id, "shared", 1).unwrap();
        store.record_term(site.id, page_a.id, "lonely", 4).unwrap();

        // Re-fetch page A: its postings go away, frequencies come down,
        // and the lemma only page A had disappears entirely.
        store.upsert_page(site.id, "/a", 200, "<html>new</html>").unwrap();

        let shared = store.find_lemmas_by_text("shared", Some(site.id)).unwrap();
        assert_eq!(shared[0].frequency, 1);

        let lonely = store.find_lemmas_by_text("lonely", Some(site.id)).unwrap();
        assert!(lonely.is_empty());

        let postings = store.find_postings_for_lemma("shared", Some(site.id)).unwrap();
        assert_eq!(postings.len(), 1);
        assert_eq!(postings[0].page_id, page_b.id);
    }

    #[test]
    fn test_scoped_and_unscoped_lookups() {
        let mut store = create_test_store();
        let site_a = store.create_site("https://a.example/", "A").unwrap();
        let site_b = store.create_site("https://b.example/", "B").unwrap();
        let page_a = store.upsert_page(site_a.id, "/", 200, "<html></html>").unwrap();
        let page_b = store.upsert_page(site_b.id, "/", 200, "<html></html>").unwrap();

        store.record_term(site_a.id, page_a.id, "rust", 1).unwrap();
        store.record_term(site_b.id, page_b.id, "rust", 1).unwrap();

        assert_eq!(store.find_lemmas_by_text("rust", None).unwrap().len(), 2);
        assert_eq!(
            store.find_lemmas_by_text("rust", Some(site_a.id)).unwrap().len(),
            1
        );
        assert_eq!(store.find_postings_for_lemma("rust", None).unwrap().len(), 2);
        assert_eq!(
            store
                .find_postings_for_lemma("rust", Some(site_b.id))
                .unwrap()
                .len(),
            1
        );
    }

    #[test]
    fn test_counts() {
        let mut store = create_test_store();
        let site = create_test_site(&mut store);
        let page = store.upsert_page(site.id, "/", 200, "<html></html>").unwrap();
        store.upsert_page(site.id, "/a", 200, "<html></html>").unwrap();
        store.record_term(site.id, page.id, "rust", 1).unwrap();

        assert_eq!(store.count_sites().unwrap(), 1);
        assert_eq!(store.count_pages(site.id).unwrap(), 2);
        assert_eq!(store.count_all_pages().unwrap(), 2);
        assert_eq!(store.count_lemmas(site.id).unwrap(), 1);
        assert_eq!(store.count_all_lemmas().unwrap(), 1);
    }

    #[test]
    fn test_delete_site_cascades() {
        let mut store = create_test_store();
        let site = create_test_site(&mut store);
        let page = store.upsert_page(site.id, "/", 200, "<html></html>").unwrap();
        store.record_term(site.id, page.id, "rust", 1).unwrap();

        store.delete_site("https://example.com/").unwrap();

        assert_eq!(store.count_sites().unwrap(), 0);
        assert_eq!(store.count_all_pages().unwrap(), 0);
        assert_eq!(store.count_all_lemmas().unwrap(), 0);
        assert!(store.find_postings_for_lemma("rust", None).unwrap().is_empty());
    }
}
