//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlPhase`: the coordinator's run-level phase (discovery, per-service loop, done)

mod phase;

pub use phase::CrawlPhase;
