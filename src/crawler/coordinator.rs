//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the three-level traversal:
//! - Fetching the services index and discovering services
//! - For each service in turn: discovering its methods, running the method
//!   pool, merging results into the tree, and writing a checkpoint
//! - Writing the final output and reporting statistics
//!
//! The coordinator owns the [`ResultTree`]. Method workers never touch it;
//! they send finished records back over the pool's channel and the
//! coordinator applies them one at a time.

use crate::config::{Config, CrawlerConfig};
use crate::crawler::extractor::{methods_from_html, services_from_html};
use crate::crawler::fetcher::{FetchPage, HttpFetcher};
use crate::crawler::pool::MethodPool;
use crate::model::{MethodRef, ResultTree, ServiceRef};
use crate::output::{CheckpointWriter, CrawlStatistics};
use crate::state::CrawlPhase;
use crate::url::index_url;
use crate::CrawlerError;
use chrono::Utc;
use indexmap::IndexMap;
use std::path::PathBuf;
use std::sync::Arc;
use url::Url;

/// Outcome of a completed run
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// Counters gathered during the run
    pub stats: CrawlStatistics,

    /// The services index could not be fetched, so nothing was crawled
    pub index_unavailable: bool,

    /// Where the output was written
    pub output_file: PathBuf,
}

impl CrawlReport {
    /// Returns true unless the run could not discover anything at all
    pub fn is_success(&self) -> bool {
        !self.index_unavailable
    }
}

/// Main crawler coordinator structure
pub struct Coordinator<F> {
    config: CrawlerConfig,
    fetcher: Arc<F>,
    pool: MethodPool<F>,
    writer: CheckpointWriter,
    tree: ResultTree,
    phase: CrawlPhase,
    stats: CrawlStatistics,
}

impl Coordinator<HttpFetcher> {
    /// Creates a coordinator that fetches over HTTP
    pub fn from_config(config: &Config) -> Result<Self, CrawlerError> {
        let fetcher = HttpFetcher::from_config(config)?;
        Ok(Self::new(config, fetcher))
    }
}

impl<F: FetchPage + 'static> Coordinator<F> {
    /// Creates a coordinator around any page source
    pub fn new(config: &Config, fetcher: F) -> Self {
        let fetcher = Arc::new(fetcher);
        let pool = MethodPool::new(Arc::clone(&fetcher), config.crawler.max_workers);
        let writer = CheckpointWriter::new(&config.output.output_file, config.output.pretty);

        Self {
            config: config.crawler.clone(),
            fetcher,
            pool,
            writer,
            tree: ResultTree::new(),
            phase: CrawlPhase::Init,
            stats: CrawlStatistics::default(),
        }
    }

    pub fn phase(&self) -> CrawlPhase {
        self.phase
    }

    pub fn tree(&self) -> &ResultTree {
        &self.tree
    }

    pub fn into_tree(self) -> ResultTree {
        self.tree
    }

    /// Runs the whole crawl
    ///
    /// Services are processed one after another; only the methods of the
    /// current service run in parallel. A checkpoint is written after every
    /// service and once more at the end.
    ///
    /// # Errors
    ///
    /// Only the final write is fatal. Failed per-service checkpoints are
    /// logged and counted, and the previous file is left in place.
    pub async fn run(&mut self) -> Result<CrawlReport, CrawlerError> {
        self.advance(CrawlPhase::DiscoveringServices)?;
        self.stats.started_at = Some(Utc::now());

        tracing::info!("=== Scraping Services Index ===");
        let index = index_url(&self.config.base_url, &self.config.index_path)?;
        let discovered = self.discover_services(&index).await;
        let index_unavailable = discovered.is_none();

        let mut services = discovered.unwrap_or_default();
        self.stats.services_discovered = services.len() as u64;
        tracing::info!("Total services found: {}", services.len());

        if let Some(max) = self.config.max_services {
            services.truncate(max);
        }

        let total = services.len();
        for (number, service) in services.iter().enumerate() {
            tracing::info!(
                "[{}/{}] Processing service: {}",
                number + 1,
                total,
                service.name
            );
            self.crawl_service(service).await?;
            tracing::info!(
                "  Progress: {}/{} services, {} total methods scraped",
                number + 1,
                total,
                self.tree.method_count()
            );
        }

        self.finish(index_unavailable)
    }

    /// Moves to the next phase, rejecting out-of-order transitions
    fn advance(&mut self, next: CrawlPhase) -> Result<(), CrawlerError> {
        if !self.phase.can_transition_to(next) {
            return Err(CrawlerError::InvalidTransition {
                from: self.phase,
                to: next,
            });
        }
        tracing::trace!("Phase {} -> {}", self.phase, next);
        self.phase = next;
        Ok(())
    }

    /// Fetches the index and lists its services
    ///
    /// Returns None when the index itself could not be fetched, which is
    /// reported separately from an index that lists nothing.
    async fn discover_services(&self, index: &Url) -> Option<Vec<ServiceRef>> {
        match self.fetcher.fetch(index.as_str()).await {
            Ok(page) => Some(dedupe_services(services_from_html(&page.body, index))),
            Err(e) => {
                tracing::error!("Services index unavailable: {}", e);
                None
            }
        }
    }

    /// Fetches a service page and lists its methods
    async fn discover_methods(&mut self, service: &ServiceRef) -> Vec<MethodRef> {
        let base = match Url::parse(&service.url) {
            Ok(base) => base,
            Err(e) => {
                tracing::warn!("Bad service URL {}: {}", service.url, e);
                self.stats.service_pages_failed += 1;
                return Vec::new();
            }
        };

        match self.fetcher.fetch(&service.url).await {
            Ok(page) => methods_from_html(&page.body, &base),
            Err(e) => {
                tracing::warn!("Service page for {} unavailable: {}", service.name, e);
                self.stats.service_pages_failed += 1;
                Vec::new()
            }
        }
    }

    /// Processes one service from method discovery through its checkpoint
    async fn crawl_service(&mut self, service: &ServiceRef) -> Result<(), CrawlerError> {
        self.advance(CrawlPhase::DiscoveringMethods)?;
        self.tree.register_service(service);

        let mut methods = self.discover_methods(service).await;
        tracing::info!("  Found {} methods", methods.len());
        self.stats.methods_discovered += methods.len() as u64;

        if let Some(max) = self.config.max_methods_per_service {
            methods.truncate(max);
        }

        self.advance(CrawlPhase::RunningMethodPool)?;
        let mut results = self.pool.run(&service.name, methods);
        while let Some(result) = results.next().await {
            self.stats.record_method(&result.doc);
            if let Some(doc) = result.doc.documentation() {
                let missing = doc.missing_fields();
                if !missing.is_empty() {
                    tracing::debug!(
                        "  {}.{} has empty fields: {}",
                        service.name,
                        result.name,
                        missing.join(", ")
                    );
                }
            }

            let name = result.name.clone();
            if self.tree.insert_method(&service.name, result.name, result.doc) {
                self.stats.duplicate_methods += 1;
                tracing::debug!(
                    "  Duplicate method {}.{}; keeping the later record",
                    service.name,
                    name
                );
            }
        }
        self.stats.services_processed += 1;

        self.advance(CrawlPhase::Checkpointing)?;
        tracing::info!(
            "  Completed {}. Saving to {}...",
            service.name,
            self.writer.path().display()
        );
        self.checkpoint();

        Ok(())
    }

    /// Writes a per-service checkpoint; failures are logged, not raised
    fn checkpoint(&mut self) {
        match self.writer.persist(&self.tree) {
            Ok(()) => self.stats.checkpoints_written += 1,
            Err(e) => {
                self.stats.checkpoints_failed += 1;
                tracing::error!("Checkpoint failed, continuing with previous file: {}", e);
            }
        }
    }

    /// Writes the final output and closes the run
    fn finish(&mut self, index_unavailable: bool) -> Result<CrawlReport, CrawlerError> {
        tracing::info!("Saving data to {}...", self.writer.path().display());
        self.writer.persist(&self.tree)?;
        self.stats.checkpoints_written += 1;

        self.stats.finished_at = Some(Utc::now());
        self.advance(CrawlPhase::Done)?;

        tracing::info!(
            "Summary: {} services scraped, {} total methods",
            self.tree.services.len(),
            self.tree.method_count()
        );

        Ok(CrawlReport {
            stats: self.stats.clone(),
            index_unavailable,
            output_file: self.writer.path().to_path_buf(),
        })
    }
}

/// Collapses services sharing a name
///
/// The later URL wins, and the service keeps the position where its name
/// first appeared.
fn dedupe_services(services: Vec<ServiceRef>) -> Vec<ServiceRef> {
    let mut by_name: IndexMap<String, String> = IndexMap::with_capacity(services.len());
    for service in services {
        if let Some(previous) = by_name.insert(service.name.clone(), service.url) {
            tracing::debug!("Service {} listed twice; dropping {}", service.name, previous);
        }
    }
    by_name
        .into_iter()
        .map(|(name, url)| ServiceRef { name, url })
        .collect()
}

/// Runs the main crawl operation over HTTP
///
/// # Example
///
/// ```no_run
/// use boto_docs_crawler::config::Config;
/// use boto_docs_crawler::crawler::run_crawl;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let report = run_crawl(&Config::default()).await?;
/// println!("{} methods", report.stats.methods_extracted);
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: &Config) -> Result<CrawlReport, CrawlerError> {
    let mut coordinator = Coordinator::from_config(config)?;
    coordinator.run().await
}
