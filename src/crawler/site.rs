//! Per-site crawl walk
//!
//! One `SiteWalk` crawls a single site from its root: a fixed pool of
//! workers shares a frontier of pending URLs, and every worker loops
//! pop -> fetch -> persist -> enqueue discovered links. The walk drains
//! when the frontier is empty and no worker holds an item, or as soon as
//! the shared stop flag is observed. A page is always persisted before
//! any of its links are scheduled, so a query never sees a page whose
//! parent vanished.

use crate::crawler::fetcher::{FetchOutcome, Fetcher};
use crate::crawler::parser;
use crate::morphology::Morphology;
use crate::storage::{IndexStore, SqliteIndexStore};
use crate::url::{has_skipped_extension, is_under_root, site_relative_path};
use crate::{Result, SitelexError};
use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use url::Url;

/// How long an idle worker waits before re-polling the frontier
const IDLE_POLL: Duration = Duration::from_millis(100);

/// Result of one site walk
pub(crate) struct WalkOutcome {
    /// Pages fetched and persisted
    pub pages: usize,
    /// First storage failure observed, if any; the site is marked
    /// `Failed` with this text
    pub failure: Option<String>,
}

/// Mutable walk state shared by all workers of one site
struct Frontier {
    queue: VecDeque<Url>,
    /// Every URL ever scheduled in this walk, for cycle pruning
    visited: HashSet<String>,
    /// Items popped but not yet finished; the walk is done only when the
    /// queue is empty and this reaches zero
    in_flight: usize,
    indexed: usize,
    failed: Option<String>,
}

/// Crawl of one site by a bounded worker pool
pub(crate) struct SiteWalk {
    site_id: i64,
    /// Site root URL with trailing slash; scope boundary for every link
    root: String,
    fetcher: Arc<Fetcher>,
    morphology: Arc<Morphology>,
    store: Arc<Mutex<SqliteIndexStore>>,
    stop: Arc<AtomicBool>,
    frontier: Mutex<Frontier>,
}

impl SiteWalk {
    pub fn new(
        site_id: i64,
        root: Url,
        fetcher: Arc<Fetcher>,
        morphology: Arc<Morphology>,
        store: Arc<Mutex<SqliteIndexStore>>,
        stop: Arc<AtomicBool>,
    ) -> Self {
        let mut queue = VecDeque::new();
        let mut visited = HashSet::new();
        visited.insert(root.to_string());
        queue.push_back(root.clone());

        Self {
            site_id,
            root: root.to_string(),
            fetcher,
            morphology,
            store,
            stop,
            frontier: Mutex::new(Frontier {
                queue,
                visited,
                in_flight: 0,
                indexed: 0,
                failed: None,
            }),
        }
    }

    /// Runs the walk to completion with `workers` concurrent workers
    pub async fn run(self: Arc<Self>, workers: usize) -> WalkOutcome {
        let mut handles = Vec::with_capacity(workers);
        for _ in 0..workers {
            let walk = Arc::clone(&self);
            handles.push(tokio::spawn(async move { walk.worker_loop().await }));
        }

        for handle in handles {
            if handle.await.is_err() {
                tracing::error!("Crawl worker panicked");
            }
        }

        let frontier = self.frontier.lock().unwrap();
        WalkOutcome {
            pages: frontier.indexed,
            failure: frontier.failed.clone(),
        }
    }

    async fn worker_loop(&self) {
        loop {
            if self.stop.load(Ordering::SeqCst) {
                break;
            }

            let next = {
                let mut frontier = self.frontier.lock().unwrap();
                if frontier.failed.is_some() {
                    break;
                }
                if let Some(url) = frontier.queue.pop_front() {
                    frontier.in_flight += 1;
                    Some(url)
                } else if frontier.in_flight == 0 {
                    break;
                } else {
                    None
                }
            };

            let url = match next {
                Some(url) => url,
                None => {
                    // Another worker may still discover links
                    tokio::time::sleep(IDLE_POLL).await;
                    continue;
                }
            };

            tracing::debug!("Processing URL: {}", url);
            let outcome = self.process(&url).await;

            let mut frontier = self.frontier.lock().unwrap();
            frontier.in_flight -= 1;
            match outcome {
                Ok(true) => frontier.indexed += 1,
                Ok(false) => {}
                Err(SitelexError::Storage(e)) => {
                    tracing::error!("Storage failure while indexing {}: {}", url, e);
                    if frontier.failed.is_none() {
                        frontier.failed = Some(e.to_string());
                    }
                }
                Err(e) => {
                    tracing::warn!("Skipping {}: {}", url, e);
                }
            }
        }
    }

    /// Fetches, persists and fans out one URL
    ///
    /// Returns `Ok(true)` when a page was persisted, `Ok(false)` for
    /// responses skipped by policy (error statuses, non-HTML content).
    async fn process(&self, url: &Url) -> Result<bool> {
        let page = match self.fetcher.fetch(url).await? {
            FetchOutcome::Html(page) => page,
            FetchOutcome::NotHtml { content_type } => {
                tracing::debug!("Skipping {}: Content-Type {}", url, content_type);
                return Ok(false);
            }
        };

        if !page.is_success() {
            tracing::warn!("Skipping {}: HTTP {}", url, page.status);
            return Ok(false);
        }

        let path = match site_relative_path(url, &self.root) {
            Some(path) => path,
            None => return Ok(false),
        };

        let text = parser::extract_text(&page.body);
        let counts = self.morphology.lemma_counts(&text);

        {
            let mut store = self.store.lock().unwrap();
            let record = store.upsert_page(self.site_id, &path, page.status, &page.body)?;
            for (lemma, count) in &counts {
                store.record_term(self.site_id, record.id, lemma, *count)?;
            }
            store.touch_site(self.site_id)?;
        }

        // The page is persisted; schedule its children unless stopping.
        // Relative links resolve against the post-redirect URL.
        if !self.stop.load(Ordering::SeqCst) {
            self.enqueue_links(parser::extract_links(&page.body, &page.final_url))?;
        }

        Ok(true)
    }

    /// Filters discovered links and pushes the crawlable ones
    ///
    /// A link is scheduled only when it stays under the site root, is not
    /// a known non-HTML asset, and has been neither scheduled in this
    /// walk nor already persisted as a page.
    fn enqueue_links(&self, links: Vec<Url>) -> Result<()> {
        for link in links {
            if !is_under_root(&link, &self.root) || has_skipped_extension(&link) {
                continue;
            }

            let path = match site_relative_path(&link, &self.root) {
                Some(path) => path,
                None => continue,
            };

            {
                let mut frontier = self.frontier.lock().unwrap();
                if !frontier.visited.insert(link.to_string()) {
                    continue;
                }
            }

            let already_persisted = {
                let store = self.store.lock().unwrap();
                store.page_exists(self.site_id, &path)?
            };
            if already_persisted {
                continue;
            }

            let mut frontier = self.frontier.lock().unwrap();
            frontier.queue.push_back(link);
        }

        Ok(())
    }
}
