//! HTTP fetcher for crawl and single-page indexing
//!
//! One `Fetcher` is shared by all workers. Each call:
//! - Waits the configured politeness delay
//! - Sends a GET with the configured user agent and referrer
//! - Classifies transport failures (timeout vs. other network errors)
//! - Reports non-HTML responses without downloading their bodies
//!
//! HTTP error statuses are not fetch errors: the page row keeps the
//! status code, so 4xx/5xx responses come back as a fetched page with an
//! empty body.

use crate::config::CrawlerConfig;
use crate::{Result, SitelexError};
use reqwest::{header, Client};
use std::time::Duration;
use url::Url;

/// A fetched page, successful or not at the HTTP level
#[derive(Debug)]
pub struct FetchedPage {
    /// HTTP status code of the response
    pub status: u16,
    /// URL the response came from, after any redirects
    pub final_url: Url,
    /// Response body; empty for HTTP error statuses
    pub body: String,
}

impl FetchedPage {
    /// True when the status is below the HTTP error range
    pub fn is_success(&self) -> bool {
        self.status < 400
    }
}

/// Outcome of a fetch that reached the server
#[derive(Debug)]
pub enum FetchOutcome {
    /// An HTML response (or an HTTP error recorded without a body)
    Html(FetchedPage),
    /// A response with a non-HTML Content-Type, skipped by the caller
    NotHtml { content_type: String },
}

/// Polite HTTP fetcher shared across crawl workers
pub struct Fetcher {
    client: Client,
    referrer: String,
    delay: Duration,
}

impl Fetcher {
    /// Builds the fetcher and its HTTP client from the crawler settings
    pub fn new(config: &CrawlerConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .gzip(true)
            .brotli(true)
            .build()?;

        Ok(Self {
            client,
            referrer: config.referrer.clone(),
            delay: Duration::from_millis(config.request_delay_ms),
        })
    }

    /// Fetches one URL, waiting the politeness delay first
    ///
    /// Returns `Err` only for transport failures; HTTP error statuses
    /// come back as `FetchOutcome::Html` with the status and an empty
    /// body.
    pub async fn fetch(&self, url: &Url) -> Result<FetchOutcome> {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let response = self
            .client
            .get(url.as_str())
            .header(header::REFERER, &self.referrer)
            .send()
            .await
            .map_err(|e| classify_request_error(url, e))?;

        let status = response.status().as_u16();
        let final_url = response.url().clone();
        if status >= 400 {
            return Ok(FetchOutcome::Html(FetchedPage {
                status,
                final_url,
                body: String::new(),
            }));
        }

        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        // An absent Content-Type is given the benefit of the doubt
        if !content_type.is_empty() && !content_type.contains("text/html") {
            return Ok(FetchOutcome::NotHtml { content_type });
        }

        let body = response
            .text()
            .await
            .map_err(|e| classify_request_error(url, e))?;

        Ok(FetchOutcome::Html(FetchedPage {
            status,
            final_url,
            body,
        }))
    }
}

/// Maps a reqwest error to the crate error taxonomy
fn classify_request_error(url: &Url, error: reqwest::Error) -> SitelexError {
    if error.is_timeout() {
        SitelexError::Timeout {
            url: url.to_string(),
        }
    } else {
        SitelexError::Http {
            url: url.to_string(),
            source: error,
        }
    }
}
