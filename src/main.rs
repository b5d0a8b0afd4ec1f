//! Sitelex main entry point
//!
//! This is the command-line interface for the Sitelex site search engine.

use clap::{Parser, Subcommand};
use sitelex::config::load_config;
use sitelex::storage::open_store;
use sitelex::{CrawlControl, Morphology, SearchEngine};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing_subscriber::EnvFilter;

/// Sitelex: a site-scoped search engine
///
/// Sitelex crawls the sites named in its configuration, reduces their page
/// text to lemmas, and answers ranked queries over the shared SQLite index.
/// Crawling, single-page indexing, search, and statistics are separate
/// subcommands over the same database.
#[derive(Parser, Debug)]
#[command(name = "sitelex")]
#[command(version = "0.1.0")]
#[command(about = "A site-scoped search engine", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl and index every configured site (Ctrl-C stops the run early)
    Crawl,

    /// Fetch and index a single page of a configured site
    IndexPage {
        /// Full URL of the page
        #[arg(value_name = "URL")]
        url: String,
    },

    /// Search the index
    Search {
        /// Query text
        #[arg(value_name = "QUERY")]
        query: String,

        /// Restrict results to the site with this root URL
        #[arg(long, value_name = "URL")]
        site: Option<String>,

        /// Number of leading results to skip
        #[arg(long, default_value_t = 0)]
        offset: usize,

        /// Maximum number of results to show
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },

    /// Show statistics from the index
    Stats,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let config = match load_config(&cli.config) {
        Ok(cfg) => {
            tracing::info!(
                "Configuration loaded successfully ({} sites)",
                cfg.sites.len()
            );
            cfg
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    match cli.command {
        Command::Crawl => handle_crawl(config).await?,
        Command::IndexPage { url } => handle_index_page(config, &url).await?,
        Command::Search {
            query,
            site,
            offset,
            limit,
        } => handle_search(&config, &query, site.as_deref(), offset, limit)?,
        Command::Stats => handle_stats(&config)?,
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("sitelex=info,warn"),
            1 => EnvFilter::new("sitelex=debug,info"),
            2 => EnvFilter::new("sitelex=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the crawl subcommand: indexes every configured site
async fn handle_crawl(config: sitelex::Config) -> anyhow::Result<()> {
    tracing::info!(
        "Sites: {}, workers per site: {}",
        config.sites.len(),
        config.crawler.workers
    );

    let store = open_store(Path::new(&config.storage.database_path))?;
    let store = Arc::new(Mutex::new(store));
    let morphology = Arc::new(Morphology::new()?);
    let control = Arc::new(CrawlControl::new(Arc::new(config), store, morphology)?);

    control.start()?;

    // Ctrl-C raises the stop flag; in-flight pages finish before the run ends
    {
        let control = Arc::clone(&control);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Stop requested, letting in-flight pages finish");
                if let Err(e) = control.stop() {
                    tracing::debug!("Stop request arrived after the run ended: {}", e);
                }
            }
        });
    }

    control.wait().await;

    tracing::info!("Crawl run finished");
    Ok(())
}

/// Handles the index-page subcommand: re-indexes one page in place
async fn handle_index_page(config: sitelex::Config, url: &str) -> anyhow::Result<()> {
    let store = open_store(Path::new(&config.storage.database_path))?;
    let store = Arc::new(Mutex::new(store));
    let morphology = Arc::new(Morphology::new()?);
    let control = CrawlControl::new(Arc::new(config), store, morphology)?;

    if control.index_page(url).await? {
        println!("✓ Page indexed: {}", url);
    } else {
        println!("Page skipped (not HTML, or the server answered an error): {}", url);
    }

    Ok(())
}

/// Handles the search subcommand: prints one page of ranked results
fn handle_search(
    config: &sitelex::Config,
    query: &str,
    site: Option<&str>,
    offset: usize,
    limit: usize,
) -> anyhow::Result<()> {
    let store = open_store(Path::new(&config.storage.database_path))?;
    let store = Arc::new(Mutex::new(store));
    let morphology = Arc::new(Morphology::new()?);
    let engine = SearchEngine::new(store, morphology);

    let outcome = engine.search(query, site, offset, limit)?;

    println!("=== Search Results ===\n");
    println!("Matching pages: {}\n", outcome.count);

    for (position, result) in outcome.results.iter().enumerate() {
        println!(
            "{}. {}{} ({:.3})",
            offset + position + 1,
            result.site,
            result.path,
            result.relevance
        );
        if !result.title.is_empty() {
            println!("   {}", result.title);
        }
        if !result.snippet.is_empty() {
            println!("   {}", result.snippet);
        }
        println!();
    }

    Ok(())
}

/// Handles the stats subcommand: shows statistics from the index
fn handle_stats(config: &sitelex::Config) -> anyhow::Result<()> {
    use sitelex::stats::print_statistics;

    println!("Database: {}\n", config.storage.database_path);

    // Open the database
    let store = open_store(Path::new(&config.storage.database_path))?;

    // Gather statistics
    let stats = sitelex::gather_statistics(&store, false)?;

    // Print statistics
    print_statistics(&stats);

    Ok(())
}
