//! Configuration module
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files, and layering command line overrides on top of them.
//!
//! # Example
//!
//! ```no_run
//! use boto_docs_crawler::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("crawler.toml")).unwrap();
//! println!("Writing to: {}", config.output.output_file.display());
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, ConfigOverrides, CrawlerConfig, OutputConfig, UserAgentConfig, DEFAULT_BASE_URL,
    DEFAULT_INDEX_PATH, DEFAULT_MAX_WORKERS, DEFAULT_OUTPUT_FILE, DEFAULT_USER_AGENT,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
pub use validation::validate;
