//! Boto-Docs-Crawler main entry point
//!
//! This is the command-line interface for the boto3 documentation crawler.

use anyhow::{bail, Context};
use boto_docs_crawler::config::{load_config_with_hash, validate, Config, ConfigOverrides};
use boto_docs_crawler::crawler::crawl;
use boto_docs_crawler::output::{
    load_checkpoint, print_statistics, print_tree_summary, summarize_tree,
};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Boto-Docs-Crawler: a hierarchical documentation crawler
///
/// Walks the boto3 services index, every service page, and every client
/// method page, and writes the extracted records to one JSON file. The file
/// is rewritten after each service so an interrupted run keeps its progress.
#[derive(Parser, Debug)]
#[command(name = "boto-docs-crawler")]
#[command(version = "1.0.0")]
#[command(about = "Crawls the boto3 reference documentation into JSON", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults are used when omitted)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Documentation root URL
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Process only the first N services
    #[arg(long, value_name = "N")]
    max_services: Option<usize>,

    /// Process only the first N methods of each service
    #[arg(long, value_name = "N")]
    max_methods_per_service: Option<usize>,

    /// Number of concurrent method workers
    #[arg(long, value_name = "N")]
    max_workers: Option<usize>,

    /// Output JSON file
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Summarize an existing output file and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            base_url: self.base_url.clone(),
            max_services: self.max_services,
            max_methods_per_service: self.max_methods_per_service,
            max_workers: self.max_workers,
            output_file: self.output.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = resolve_config(&cli)?;

    // Handle different modes
    if cli.dry_run {
        handle_dry_run(&config);
        Ok(())
    } else if cli.stats {
        handle_stats(&config)
    } else {
        handle_crawl(&config).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("boto_docs_crawler=info,warn"),
            1 => EnvFilter::new("boto_docs_crawler=debug,info"),
            2 => EnvFilter::new("boto_docs_crawler=trace,debug"),
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

/// Loads the config file if one was given, then layers the flags on top
fn resolve_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    config.apply_overrides(cli.overrides());
    validate(&config).context("Invalid configuration")?;
    Ok(config)
}

fn describe_cap(cap: Option<usize>) -> String {
    cap.map_or_else(|| "unlimited".to_string(), |n| n.to_string())
}

/// Handles the --dry-run mode: shows the effective configuration
fn handle_dry_run(config: &Config) {
    println!("=== Boto-Docs-Crawler Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Base URL: {}", config.crawler.base_url);
    println!("  Index path: {}", config.crawler.index_path);
    println!("  Max services: {}", describe_cap(config.crawler.max_services));
    println!(
        "  Max methods per service: {}",
        describe_cap(config.crawler.max_methods_per_service)
    );
    println!("  Workers: {}", config.crawler.max_workers);
    println!("  Request delay: {}ms", config.crawler.request_delay_ms);
    println!("  Request timeout: {}s", config.crawler.request_timeout_secs);

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.value);

    println!("\nOutput:");
    println!("  File: {}", config.output.output_file.display());
    println!("  Pretty: {}", config.output.pretty);

    println!("\n✓ Configuration is valid");
}

/// Handles the --stats mode: summarizes an existing output file
fn handle_stats(config: &Config) -> anyhow::Result<()> {
    println!("Output file: {}\n", config.output.output_file.display());
    let tree = load_checkpoint(&config.output.output_file)?;
    print_tree_summary(&summarize_tree(&tree));
    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: &Config) -> anyhow::Result<()> {
    tracing::info!(
        "Starting crawl of {} with {} workers",
        config.crawler.base_url,
        config.crawler.max_workers
    );

    let report = match crawl(config).await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            return Err(e.into());
        }
    };

    print_statistics(&report.stats);
    println!("\nData saved to: {}", report.output_file.display());

    if !report.is_success() {
        bail!("services index could not be fetched; output contains no services");
    }

    tracing::info!("Crawl completed successfully");
    Ok(())
}
