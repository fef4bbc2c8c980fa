//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the HTTP client with the configured user agent and timeouts
//! - GET requests returning the page body or a typed failure value
//! - The fixed politeness delay paid by the caller after each successful fetch

use crate::config::Config;
use reqwest::{redirect::Policy, Client};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;

/// A page body returned by a successful fetch
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// The URL that was requested
    pub url: String,
    /// Final URL after redirects
    pub final_url: String,
    /// HTTP status code
    pub status_code: u16,
    /// Page body content
    pub body: String,
}

/// Why a fetch failed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchFailure {
    #[error("HTTP {0}")]
    Status(u16),

    #[error("Request timeout")]
    Timeout,

    #[error("Connection failed: {0}")]
    Connect(String),

    #[error("Failed to read body: {0}")]
    Body(String),

    #[error("{0}")]
    Transport(String),
}

/// A failed fetch, returned as a value rather than raised
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Failed to fetch {url}: {cause}")]
pub struct FetchError {
    pub url: String,
    pub cause: FetchFailure,
}

impl FetchError {
    pub fn new(url: impl Into<String>, cause: FetchFailure) -> Self {
        Self {
            url: url.into(),
            cause,
        }
    }
}

/// Source of documentation pages
///
/// Implementations must be shareable across the method worker tasks.
pub trait FetchPage: Send + Sync {
    /// Retrieves a page, or describes why it could not be retrieved
    fn fetch(&self, url: &str) -> impl Future<Output = Result<FetchedPage, FetchError>> + Send;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `user_agent` - User agent header sent with every request
/// * `timeout` - Whole-request timeout
///
/// # Example
///
/// ```no_run
/// use boto_docs_crawler::crawler::build_http_client;
/// use std::time::Duration;
///
/// let client = build_http_client("DocsCrawler/1.0", Duration::from_secs(30)).unwrap();
/// ```
pub fn build_http_client(user_agent: &str, timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetcher backed by a shared reqwest client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    delay: Duration,
}

impl HttpFetcher {
    /// Creates a fetcher that sleeps `delay` after every successful fetch
    pub fn new(client: Client, delay: Duration) -> Self {
        Self { client, delay }
    }

    /// Creates a fetcher from the crawler configuration
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        let client = build_http_client(&config.user_agent.value, config.crawler.request_timeout())?;
        Ok(Self::new(client, config.crawler.request_delay()))
    }
}

impl FetchPage for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage, FetchError> {
        let page = fetch_url(&self.client, url).await?;

        // Each caller pays its own delay, so concurrent workers pace themselves
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        Ok(page)
    }
}

/// Fetches a URL and classifies any failure
///
/// Non-2xx statuses and transport errors are returned as [`FetchError`]
/// values. There is no retry at this layer.
pub async fn fetch_url(client: &Client, url: &str) -> Result<FetchedPage, FetchError> {
    tracing::debug!("Fetching: {}", url);

    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| FetchError::new(url, classify_error(&e)))?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::new(url, FetchFailure::Status(status.as_u16())));
    }

    let final_url = response.url().to_string();
    let body = response
        .text()
        .await
        .map_err(|e| FetchError::new(url, FetchFailure::Body(e.to_string())))?;

    Ok(FetchedPage {
        url: url.to_string(),
        final_url,
        status_code: status.as_u16(),
        body,
    })
}

fn classify_error(error: &reqwest::Error) -> FetchFailure {
    if error.is_timeout() {
        FetchFailure::Timeout
    } else if error.is_connect() {
        FetchFailure::Connect(error.to_string())
    } else {
        FetchFailure::Transport(error.to_string())
    }
}
