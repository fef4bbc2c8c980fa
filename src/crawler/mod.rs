//! Crawler module for the documentation traversal
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching behind the [`FetchPage`] seam
//! - HTML extraction of services, methods, and method records
//! - The bounded worker pool that processes one service's methods
//! - Overall crawl coordination and checkpointing

mod coordinator;
mod extractor;
mod fetcher;
mod pool;
#[cfg(test)]
mod test_support;

pub use coordinator::{run_crawl, Coordinator, CrawlReport};
pub use extractor::{
    extract_method_doc, extract_methods, extract_services, method_doc_from_html,
    methods_from_html, parse_document, services_from_html,
};
pub use fetcher::{
    build_http_client, fetch_url, FetchError, FetchFailure, FetchPage, FetchedPage, HttpFetcher,
};
pub use pool::{fetch_method_doc, MethodPool, MethodResult, MethodResults};

use crate::config::Config;
use crate::CrawlerError;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Build the HTTP client
/// 2. Fetch the services index
/// 3. Crawl each service's methods with the worker pool
/// 4. Checkpoint after every service and write the final output
///
/// # Returns
///
/// * `Ok(CrawlReport)` - The output file was written
/// * `Err(CrawlerError)` - The client could not be built or the final write failed
pub async fn crawl(config: &Config) -> Result<CrawlReport, CrawlerError> {
    run_crawl(config).await
}
