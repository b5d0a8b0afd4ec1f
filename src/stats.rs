//! Index statistics aggregation
//!
//! This module collects the totals and per-site details reported by the
//! `stats` command: site counts and states, page and lemma counts, and
//! whether a crawl run is currently live.

use crate::storage::{IndexStore, SiteStatus};
use crate::Result;

/// Index-wide statistics summary
#[derive(Debug, Clone)]
pub struct Statistics {
    /// Total number of site rows
    pub sites: u64,

    /// Total number of indexed pages across all sites
    pub pages: u64,

    /// Total number of lemma rows across all sites
    pub lemmas: u64,

    /// Whether a crawl run is live right now
    pub indexing_running: bool,

    /// Per-site breakdown, in site creation order
    pub site_details: Vec<SiteStatistics>,
}

/// Statistics of one site
#[derive(Debug, Clone)]
pub struct SiteStatistics {
    pub url: String,
    pub name: String,
    pub status: SiteStatus,
    /// Last status change or page heartbeat, RFC 3339
    pub status_time: String,
    pub last_error: Option<String>,
    pub pages: u64,
    pub lemmas: u64,
}

/// Loads statistics from the index store
pub fn gather_statistics(store: &dyn IndexStore, indexing_running: bool) -> Result<Statistics> {
    let sites = store.count_sites()?;
    let pages = store.count_all_pages()?;
    let lemmas = store.count_all_lemmas()?;

    let mut site_details = Vec::new();
    for site in store.all_sites()? {
        let pages = store.count_pages(site.id)?;
        let lemmas = store.count_lemmas(site.id)?;

        site_details.push(SiteStatistics {
            url: site.url,
            name: site.name,
            status: site.status,
            status_time: site.status_time,
            last_error: site.last_error,
            pages,
            lemmas,
        });
    }

    Ok(Statistics {
        sites,
        pages,
        lemmas,
        indexing_running,
        site_details,
    })
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &Statistics) {
    println!("=== Index Statistics ===\n");

    println!("Totals:");
    println!("  Sites: {}", stats.sites);
    println!("  Pages: {}", stats.pages);
    println!("  Lemmas: {}", stats.lemmas);
    println!(
        "  Indexing running: {}",
        if stats.indexing_running { "yes" } else { "no" }
    );
    println!();

    if stats.site_details.is_empty() {
        println!("No sites indexed yet.");
        return;
    }

    println!("Sites:");
    for site in &stats.site_details {
        println!("  {} ({})", site.url, site.name);
        println!("    status: {:?} since {}", site.status, site.status_time);
        if let Some(error) = &site.last_error {
            println!("    last error: {}", error);
        }
        println!("    pages: {}, lemmas: {}", site.pages, site.lemmas);
    }
}
