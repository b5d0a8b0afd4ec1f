//! Query execution: lemma exclusion, intersection and ranking
//!
//! A query is lemmatized, cleared of site-specific stop-words (lemmas
//! present on at least 80% of the pages in scope), and resolved to the
//! pages containing every surviving lemma. Intersection starts from the
//! rarest lemma so the candidate set only ever shrinks. Relevance is the
//! sum of occurrence ranks, reported relative to the best page of the
//! result set.

use crate::crawler::{extract_text, extract_title};
use crate::morphology::Morphology;
use crate::search::snippet::build_snippet;
use crate::storage::{IndexStore, PageRecord, SiteRecord, SqliteIndexStore, StorageResult};
use crate::{Result, SitelexError};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

/// Share of pages in scope at which a lemma is treated as a stop-word
const STOP_WORD_PERCENT: i64 = 80;

/// One ranked search hit
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// Site root URL without its trailing slash
    pub site: String,
    pub site_name: String,
    /// Site-relative page path
    pub path: String,
    /// Text of the page's first `<title>`, empty when absent
    pub title: String,
    /// Highlighted extract of the page text
    pub snippet: String,
    /// Relevance relative to the best page of this result set
    pub relevance: f64,
}

/// A full query answer: total match count plus the requested page of
/// ranked results
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    /// Matching pages before pagination
    pub count: usize,
    pub results: Vec<SearchResult>,
}

impl SearchOutcome {
    /// Outcome with no matching pages
    pub fn empty() -> Self {
        Self {
            count: 0,
            results: Vec::new(),
        }
    }
}

/// Boolean AND search over the lemma index
pub struct SearchEngine {
    store: Arc<Mutex<SqliteIndexStore>>,
    morphology: Arc<Morphology>,
}

impl SearchEngine {
    pub fn new(store: Arc<Mutex<SqliteIndexStore>>, morphology: Arc<Morphology>) -> Self {
        Self { store, morphology }
    }

    /// Runs a query, optionally scoped to one site root URL
    ///
    /// Fails with `EmptyQuery` for blank query text. A query whose every
    /// lemma is unknown or excluded as a stop-word yields an empty
    /// outcome, as does an unknown site scope.
    pub fn search(
        &self,
        query: &str,
        site_url: Option<&str>,
        offset: usize,
        limit: usize,
    ) -> Result<SearchOutcome> {
        let query = query.trim();
        if query.is_empty() {
            return Err(SitelexError::EmptyQuery);
        }

        let query_lemmas = distinct_in_order(self.morphology.lemma_sequence(query));
        if query_lemmas.is_empty() {
            return Ok(SearchOutcome::empty());
        }

        // All index reads happen under one store lock; snippets and
        // titles are built afterwards from the collected rows.
        let (matched_lemmas, count, hits) = {
            let store = self.store.lock().unwrap();

            let site_id = match site_url {
                Some(url) => match resolve_site_scope(&store, url)? {
                    Some(id) => Some(id),
                    None => return Ok(SearchOutcome::empty()),
                },
                None => None,
            };

            let page_total = match site_id {
                Some(id) => store.count_pages(id)?,
                None => store.count_all_pages()?,
            };
            let total_pages = page_total as i64;
            if total_pages == 0 {
                return Ok(SearchOutcome::empty());
            }

            let groups = surviving_lemma_groups(&store, &query_lemmas, site_id, total_pages)?;
            if groups.is_empty() {
                return Ok(SearchOutcome::empty());
            }

            let relevance = intersect_postings(&store, &groups, site_id)?;
            if relevance.is_empty() {
                return Ok(SearchOutcome::empty());
            }

            let count = relevance.len();
            let ranked = rank_pages(relevance);

            let mut hits = Vec::new();
            for (page_id, relative) in ranked.into_iter().skip(offset).take(limit) {
                let page = store.get_page(page_id)?;
                let site = store.get_site(page.site_id)?;
                hits.push((page, site, relative));
            }

            let matched_lemmas: HashSet<String> =
                groups.into_iter().map(|(lemma, _)| lemma).collect();
            (matched_lemmas, count, hits)
        };

        let results = hits
            .into_iter()
            .map(|(page, site, relevance)| self.build_result(page, site, relevance, &matched_lemmas))
            .collect();

        Ok(SearchOutcome { count, results })
    }

    fn build_result(
        &self,
        page: PageRecord,
        site: SiteRecord,
        relevance: f64,
        matched_lemmas: &HashSet<String>,
    ) -> SearchResult {
        let title = extract_title(&page.content).unwrap_or_default();
        let text = extract_text(&page.content);
        let snippet = build_snippet(&self.morphology, &text, matched_lemmas);

        SearchResult {
            site: site.url.trim_end_matches('/').to_string(),
            site_name: site.name,
            path: page.path,
            title,
            snippet,
            relevance,
        }
    }
}

/// Deduplicates query lemmas, keeping first-occurrence order
fn distinct_in_order(lemmas: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    lemmas.into_iter().filter(|l| seen.insert(l.clone())).collect()
}

/// Resolves a site scope URL to a site id, tolerating a missing
/// trailing slash
fn resolve_site_scope(store: &SqliteIndexStore, url: &str) -> StorageResult<Option<i64>> {
    let url = url.trim();
    if let Some(record) = store.find_site_by_url(url)? {
        return Ok(Some(record.id));
    }
    if !url.ends_with('/') {
        if let Some(record) = store.find_site_by_url(&format!("{}/", url))? {
            return Ok(Some(record.id));
        }
    }
    Ok(None)
}

/// Looks up each query lemma and keeps the ones that exist in scope and
/// are not stop-words, sorted rarest first
///
/// Lemma rows from different sites with the same text form one group
/// with their document frequencies summed.
fn surviving_lemma_groups(
    store: &SqliteIndexStore,
    query_lemmas: &[String],
    site_id: Option<i64>,
    total_pages: i64,
) -> StorageResult<Vec<(String, i64)>> {
    let mut groups = Vec::new();

    for lemma in query_lemmas {
        let rows = store.find_lemmas_by_text(lemma, site_id)?;
        if rows.is_empty() {
            continue;
        }

        let frequency: i64 = rows.iter().map(|row| row.frequency).sum();
        if frequency * 100 >= STOP_WORD_PERCENT * total_pages {
            tracing::debug!(
                "Dropping stop lemma '{}' ({} of {} pages)",
                lemma,
                frequency,
                total_pages
            );
            continue;
        }

        groups.push((lemma.clone(), frequency));
    }

    // Stable sort keeps query order between equally rare lemmas
    groups.sort_by(|a, b| a.1.cmp(&b.1));
    Ok(groups)
}

/// Intersects posting page sets group by group, accumulating per-page
/// rank sums
///
/// Seeds from the first (rarest) group; every following group removes
/// the pages it does not cover, so the survivors contain all groups.
fn intersect_postings(
    store: &SqliteIndexStore,
    groups: &[(String, i64)],
    site_id: Option<i64>,
) -> StorageResult<HashMap<i64, i64>> {
    let mut relevance: HashMap<i64, i64> = HashMap::new();

    for (index, (lemma, _)) in groups.iter().enumerate() {
        let postings = store.find_postings_for_lemma(lemma, site_id)?;

        if index == 0 {
            for posting in postings {
                relevance.insert(posting.page_id, posting.rank);
            }
        } else {
            let by_page: HashMap<i64, i64> = postings
                .into_iter()
                .map(|posting| (posting.page_id, posting.rank))
                .collect();

            relevance.retain(|page_id, _| by_page.contains_key(page_id));
            for (page_id, sum) in relevance.iter_mut() {
                if let Some(rank) = by_page.get(page_id) {
                    *sum += rank;
                }
            }
        }

        if relevance.is_empty() {
            break;
        }
    }

    Ok(relevance)
}

/// Orders candidate pages by relative relevance
///
/// The divisor is the best absolute relevance of this result set, so
/// the top page always scores 1.0. Ties are broken by page id for a
/// deterministic order.
fn rank_pages(relevance: HashMap<i64, i64>) -> Vec<(i64, f64)> {
    let max_relevance = relevance.values().copied().max().unwrap_or(0).max(1);

    let mut ranked: Vec<(i64, i64)> = relevance.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

    ranked
        .into_iter()
        .map(|(page_id, absolute)| (page_id, absolute as f64 / max_relevance as f64))
        .collect()
}
