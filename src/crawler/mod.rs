//! Crawl control and page processing
//!
//! This module contains the crawling logic, including:
//! - HTTP fetching with politeness delays
//! - HTML parsing, link extraction and text extraction
//! - The per-site bounded worker pool
//! - Run control (start/stop) and single-page indexing

mod fetcher;
mod parser;
mod site;

pub use fetcher::{FetchOutcome, FetchedPage, Fetcher};
pub use parser::{extract_links, extract_text, extract_title};

use crate::config::{Config, SiteEntry};
use crate::morphology::Morphology;
use crate::storage::{IndexStore, SiteStatus, SqliteIndexStore, StorageResult};
use crate::url::{is_under_root, site_relative_path};
use crate::{Result, SitelexError};
use site::{SiteWalk, WalkOutcome};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tokio::task::JoinHandle;
use url::Url;

/// Error text a stopped run leaves on every affected site
pub const STOP_ERROR_MESSAGE: &str = "indexing stopped by user";

/// Everything one crawl run needs, bundled per invocation
struct RunContext {
    config: Arc<Config>,
    fetcher: Arc<Fetcher>,
    morphology: Arc<Morphology>,
    store: Arc<Mutex<SqliteIndexStore>>,
    stop: Arc<AtomicBool>,
}

/// Owner of the current crawl run, if any
///
/// `start` spawns a run over all configured sites and fails with
/// `AlreadyRunning` while one is live; `stop` raises the shared stop
/// flag and fails with `NotRunning` otherwise. Single-page indexing is
/// independent of run state.
pub struct CrawlControl {
    config: Arc<Config>,
    fetcher: Arc<Fetcher>,
    morphology: Arc<Morphology>,
    store: Arc<Mutex<SqliteIndexStore>>,
    stop: Arc<AtomicBool>,
    running: Arc<AtomicBool>,
    run_handle: Mutex<Option<JoinHandle<()>>>,
}

impl CrawlControl {
    /// Creates the control with its HTTP fetcher built from the config
    pub fn new(
        config: Arc<Config>,
        store: Arc<Mutex<SqliteIndexStore>>,
        morphology: Arc<Morphology>,
    ) -> Result<Self> {
        let fetcher = Arc::new(Fetcher::new(&config.crawler)?);

        Ok(Self {
            config,
            fetcher,
            morphology,
            store,
            stop: Arc::new(AtomicBool::new(false)),
            running: Arc::new(AtomicBool::new(false)),
            run_handle: Mutex::new(None),
        })
    }

    /// Starts a full crawl over all configured sites
    pub fn start(&self) -> Result<()> {
        let mut run_handle = self.run_handle.lock().unwrap();
        if self.running.load(Ordering::SeqCst) {
            return Err(SitelexError::AlreadyRunning);
        }

        self.stop.store(false, Ordering::SeqCst);
        self.running.store(true, Ordering::SeqCst);

        let ctx = RunContext {
            config: Arc::clone(&self.config),
            fetcher: Arc::clone(&self.fetcher),
            morphology: Arc::clone(&self.morphology),
            store: Arc::clone(&self.store),
            stop: Arc::clone(&self.stop),
        };
        let running = Arc::clone(&self.running);

        *run_handle = Some(tokio::spawn(async move {
            run_crawl(ctx).await;
            running.store(false, Ordering::SeqCst);
        }));

        Ok(())
    }

    /// Requests the current run to stop
    ///
    /// Workers observe the flag within one fetch cycle; affected sites
    /// end up `Failed` with [`STOP_ERROR_MESSAGE`].
    pub fn stop(&self) -> Result<()> {
        if !self.running.load(Ordering::SeqCst) {
            return Err(SitelexError::NotRunning);
        }
        self.stop.store(true, Ordering::SeqCst);
        Ok(())
    }

    /// True while a crawl run is live
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Waits for the current run to finish, if one was started
    pub async fn wait(&self) {
        let handle = self.run_handle.lock().unwrap().take();
        if let Some(handle) = handle {
            if handle.await.is_err() {
                tracing::error!("Crawl run task panicked");
            }
        }
    }

    /// Fetches and indexes a single page without link discovery
    ///
    /// The URL must fall under one of the configured site roots, else
    /// this fails with `DomainNotConfigured` before any network work.
    /// Returns `Ok(false)` when the page was fetched but skipped by
    /// policy (HTTP error status or non-HTML content).
    pub async fn index_page(&self, url: &str) -> Result<bool> {
        let parsed = Url::parse(url.trim())?;
        let entry = self
            .matching_site(&parsed)
            .ok_or_else(|| SitelexError::DomainNotConfigured {
                url: parsed.to_string(),
            })?;

        let page = match self.fetcher.fetch(&parsed).await? {
            FetchOutcome::Html(page) => page,
            FetchOutcome::NotHtml { content_type } => {
                tracing::warn!("Not indexing {}: Content-Type {}", parsed, content_type);
                return Ok(false);
            }
        };

        if !page.is_success() {
            tracing::warn!("Not indexing {}: HTTP {}", parsed, page.status);
            return Ok(false);
        }

        let path = match site_relative_path(&parsed, &entry.url) {
            Some(path) => path,
            None => return Ok(false),
        };

        let text = parser::extract_text(&page.body);
        let counts = self.morphology.lemma_counts(&text);

        {
            let mut store = self.store.lock().unwrap();
            let (site_id, created) = match store.find_site_by_url(&entry.url)? {
                Some(record) => (record.id, false),
                None => (store.create_site(&entry.url, &entry.name)?.id, true),
            };

            let record = store.upsert_page(site_id, &path, page.status, &page.body)?;
            for (lemma, count) in &counts {
                store.record_term(site_id, record.id, lemma, *count)?;
            }

            if created {
                store.set_site_status(site_id, SiteStatus::Indexed, None)?;
            } else {
                store.touch_site(site_id)?;
            }
        }

        tracing::info!("Indexed page {} ({} lemmas)", parsed, counts.len());
        Ok(true)
    }

    /// Finds the configured site whose root covers `url`
    ///
    /// Prefers the longest matching root, so nested site entries resolve
    /// to the most specific one.
    fn matching_site(&self, url: &Url) -> Option<&SiteEntry> {
        let mut matched: Option<&SiteEntry> = None;
        for site in &self.config.sites {
            if is_under_root(url, &site.url) {
                match matched {
                    Some(current) if current.url.len() >= site.url.len() => {}
                    _ => matched = Some(site),
                }
            }
        }
        matched
    }
}

/// Executes one full crawl run across all configured sites
async fn run_crawl(ctx: RunContext) {
    let started = Instant::now();
    tracing::info!("Starting crawl of {} configured sites", ctx.config.sites.len());

    for site in &ctx.config.sites {
        if ctx.stop.load(Ordering::SeqCst) {
            break;
        }

        let site_started = Instant::now();
        tracing::info!("Indexing site {} ({})", site.name, site.url);

        match crawl_site(&ctx, site).await {
            Ok((site_id, outcome)) => {
                finish_site(&ctx, site, site_id, outcome, site_started);
            }
            Err(e) => {
                tracing::error!("Failed to crawl {}: {}", site.url, e);
                if let Err(mark_err) = mark_site_failed(&ctx, site, &e.to_string()) {
                    tracing::error!("Failed to mark {} as failed: {}", site.url, mark_err);
                }
            }
        }
    }

    // A stopped run leaves no configured site in a non-terminal state
    if ctx.stop.load(Ordering::SeqCst) {
        for site in &ctx.config.sites {
            if let Err(e) = sweep_stopped_site(&ctx, site) {
                tracing::error!("Failed to mark {} as failed: {}", site.url, e);
            }
        }
    }

    tracing::info!("Crawl run finished in {:.1?}", started.elapsed());
}

/// Deletes any previous copy of the site and walks it from the root
async fn crawl_site(ctx: &RunContext, site: &SiteEntry) -> Result<(i64, WalkOutcome)> {
    let root = Url::parse(&site.url)?;

    let record = {
        let mut store = ctx.store.lock().unwrap();
        store.delete_site(&site.url)?;
        store.create_site(&site.url, &site.name)?
    };

    let walk = Arc::new(SiteWalk::new(
        record.id,
        root,
        Arc::clone(&ctx.fetcher),
        Arc::clone(&ctx.morphology),
        Arc::clone(&ctx.store),
        Arc::clone(&ctx.stop),
    ));
    let outcome = walk.run(ctx.config.crawler.workers).await;

    Ok((record.id, outcome))
}

/// Records the terminal status of a walked site and logs the outcome
fn finish_site(
    ctx: &RunContext,
    site: &SiteEntry,
    site_id: i64,
    outcome: WalkOutcome,
    site_started: Instant,
) {
    let (status, error) = if let Some(failure) = outcome.failure.as_deref() {
        (SiteStatus::Failed, Some(failure))
    } else if ctx.stop.load(Ordering::SeqCst) {
        (SiteStatus::Failed, Some(STOP_ERROR_MESSAGE))
    } else {
        (SiteStatus::Indexed, None)
    };

    let updated = {
        let mut store = ctx.store.lock().unwrap();
        store.set_site_status(site_id, status, error)
    };
    if let Err(e) = updated {
        tracing::error!("Failed to finalize {}: {}", site.url, e);
        return;
    }

    match error {
        None => tracing::info!(
            "Site {} indexed: {} pages in {:.1?}",
            site.url,
            outcome.pages,
            site_started.elapsed()
        ),
        Some(message) => tracing::warn!(
            "Site {} failed after {} pages: {}",
            site.url,
            outcome.pages,
            message
        ),
    }
}

/// Marks a site `Failed`, creating its row first if it never got one
fn mark_site_failed(ctx: &RunContext, site: &SiteEntry, message: &str) -> StorageResult<()> {
    let mut store = ctx.store.lock().unwrap();
    let site_id = match store.find_site_by_url(&site.url)? {
        Some(record) => record.id,
        None => store.create_site(&site.url, &site.name)?.id,
    };
    store.set_site_status(site_id, SiteStatus::Failed, Some(message))
}

/// Marks `site` failed by the stop unless it already reached a terminal state
fn sweep_stopped_site(ctx: &RunContext, site: &SiteEntry) -> StorageResult<()> {
    let mut store = ctx.store.lock().unwrap();
    let site_id = match store.find_site_by_url(&site.url)? {
        Some(record) if record.status.is_terminal() => return Ok(()),
        Some(record) => record.id,
        None => store.create_site(&site.url, &site.name)?.id,
    };
    store.set_site_status(site_id, SiteStatus::Failed, Some(STOP_ERROR_MESSAGE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CrawlerConfig, StorageConfig};

    fn test_config(sites: Vec<SiteEntry>) -> Arc<Config> {
        Arc::new(Config {
            crawler: CrawlerConfig {
                user_agent: "TestAgent/1.0".to_string(),
                referrer: "https://example.com/".to_string(),
                request_delay_ms: 0,
                request_timeout_secs: 5,
                workers: 2,
            },
            storage: StorageConfig {
                database_path: ":memory:".to_string(),
            },
            sites,
        })
    }

    fn test_control(sites: Vec<SiteEntry>) -> CrawlControl {
        let store = Arc::new(Mutex::new(
            SqliteIndexStore::new_in_memory().expect("in-memory store"),
        ));
        let morphology = Arc::new(Morphology::new().expect("morphology"));
        CrawlControl::new(test_config(sites), store, morphology).expect("control")
    }

    #[test]
    fn test_stop_without_run_is_rejected() {
        let control = test_control(Vec::new());
        assert!(matches!(control.stop(), Err(SitelexError::NotRunning)));
    }

    #[test]
    fn test_not_running_initially() {
        let control = test_control(Vec::new());
        assert!(!control.is_running());
    }

    #[tokio::test]
    async fn test_index_page_outside_configured_sites() {
        let control = test_control(vec![SiteEntry {
            url: "https://example.com/".to_string(),
            name: "Example".to_string(),
        }]);

        let result = control.index_page("https://other.org/page").await;
        assert!(matches!(
            result,
            Err(SitelexError::DomainNotConfigured { .. })
        ));
    }

    #[tokio::test]
    async fn test_run_over_empty_site_list_terminates() {
        let control = test_control(Vec::new());
        control.start().expect("start");
        control.wait().await;
        assert!(!control.is_running());
    }
}
