//! Output module for checkpoints and crawl reports
//!
//! This module handles:
//! - Writing the result tree to the JSON output file, atomically
//! - Reading an output file back
//! - Recording and printing crawl statistics

mod checkpoint;
pub mod stats;

pub use checkpoint::{load_checkpoint, CheckpointError, CheckpointResult, CheckpointWriter};
pub use stats::{
    print_statistics, print_tree_summary, summarize_tree, CrawlStatistics, TreeSummary,
};
