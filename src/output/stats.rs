//! Run statistics and output-file summaries
//!
//! `CrawlStatistics` is accumulated by the coordinator during a run.
//! `TreeSummary` is computed from a finished (or partial) output file.

use crate::model::{MethodDoc, ResultTree};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Counters collected while crawling
#[derive(Debug, Clone, Default)]
pub struct CrawlStatistics {
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,

    pub services_discovered: u64,
    pub services_processed: u64,
    /// Service pages that could not be fetched (entry kept, no methods)
    pub service_pages_failed: u64,

    pub methods_discovered: u64,
    pub methods_extracted: u64,
    pub methods_failed: u64,
    /// Method names seen twice in one service; the later record was kept
    pub duplicate_methods: u64,

    pub checkpoints_written: u64,
    pub checkpoints_failed: u64,

    /// Empty fields in extracted records, by field name
    pub extraction_gaps: BTreeMap<&'static str, u64>,
}

impl CrawlStatistics {
    /// Tallies one method outcome, including its extraction gaps
    pub fn record_method(&mut self, doc: &MethodDoc) {
        match doc {
            MethodDoc::Extracted(documentation) => {
                self.methods_extracted += 1;
                for field in documentation.missing_fields() {
                    *self.extraction_gaps.entry(field).or_insert(0) += 1;
                }
            }
            MethodDoc::Failed { .. } => self.methods_failed += 1,
        }
    }

    /// Wall-clock duration of the run, once finished
    pub fn duration_seconds(&self) -> Option<i64> {
        match (self.started_at, self.finished_at) {
            (Some(start), Some(end)) => Some((end - start).num_seconds()),
            _ => None,
        }
    }
}

/// Prints run statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    if let Some(started) = stats.started_at {
        println!("Started:  {}", started.to_rfc3339());
    }
    if let Some(finished) = stats.finished_at {
        println!("Finished: {}", finished.to_rfc3339());
    }
    if let Some(seconds) = stats.duration_seconds() {
        println!("Duration: {}s", seconds);
    }
    println!();

    println!("Services:");
    println!("  Discovered: {}", stats.services_discovered);
    println!("  Processed: {}", stats.services_processed);
    println!("  Page fetch failures: {}", stats.service_pages_failed);
    println!();

    println!("Methods:");
    println!("  Discovered: {}", stats.methods_discovered);
    println!("  Extracted: {}", stats.methods_extracted);
    println!("  Failed: {}", stats.methods_failed);
    println!("  Duplicate names overwritten: {}", stats.duplicate_methods);
    println!();

    println!(
        "Checkpoints: {} written, {} failed",
        stats.checkpoints_written, stats.checkpoints_failed
    );

    if !stats.extraction_gaps.is_empty() {
        println!("\nExtraction gaps (empty fields):");
        for (field, count) in &stats.extraction_gaps {
            println!("  {}: {}", field, count);
        }
    }
}

/// Counts derived from a result tree
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TreeSummary {
    pub services: usize,
    pub services_without_methods: usize,
    pub methods: usize,
    pub failed_methods: usize,
}

/// Summarizes a result tree
pub fn summarize_tree(tree: &ResultTree) -> TreeSummary {
    let mut summary = TreeSummary {
        services: tree.services.len(),
        ..TreeSummary::default()
    };

    for entry in tree.services.values() {
        if entry.methods.is_empty() {
            summary.services_without_methods += 1;
        }
        summary.methods += entry.methods.len();
        summary.failed_methods += entry.methods.values().filter(|d| d.is_error()).count();
    }

    summary
}

/// Prints a tree summary to stdout
pub fn print_tree_summary(summary: &TreeSummary) {
    println!("=== Output Summary ===\n");
    println!("  Services scraped: {}", summary.services);
    println!(
        "  Services without methods: {}",
        summary.services_without_methods
    );
    println!("  Total methods: {}", summary.methods);
    println!("  Failed methods: {}", summary.failed_methods);

    let rate = if summary.methods > 0 {
        ((summary.methods - summary.failed_methods) as f64 / summary.methods as f64) * 100.0
    } else {
        0.0
    };
    println!("\nSuccess Rate: {:.1}%", rate);
}
