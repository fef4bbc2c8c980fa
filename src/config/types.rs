use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Canonical documentation root crawled when no base URL is configured
pub const DEFAULT_BASE_URL: &str = "https://boto3.amazonaws.com/v1/documentation/api/latest/";

/// Path of the services index, relative to the base URL
pub const DEFAULT_INDEX_PATH: &str = "reference/services/index.html";

/// Default output file name
pub const DEFAULT_OUTPUT_FILE: &str = "boto3_docs.json";

/// Default method pool width
pub const DEFAULT_MAX_WORKERS: usize = 20;

/// Default user agent sent with every request
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default, rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Crawl traversal and politeness configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Documentation root every other URL is resolved against
    #[serde(rename = "base-url", default = "default_base_url")]
    pub base_url: String,

    /// Services index page, relative to `base_url`
    #[serde(rename = "index-path", default = "default_index_path")]
    pub index_path: String,

    /// Keep only the first N discovered services
    #[serde(rename = "max-services", default)]
    pub max_services: Option<usize>,

    /// Keep only the first N discovered methods of each service
    #[serde(rename = "max-methods-per-service", default)]
    pub max_methods_per_service: Option<usize>,

    /// Width of the per-service method worker pool
    #[serde(rename = "max-workers", default = "default_max_workers")]
    pub max_workers: usize,

    /// Delay paid by a worker after each successful fetch (milliseconds)
    #[serde(rename = "request-delay-ms", default = "default_request_delay_ms")]
    pub request_delay_ms: u64,

    /// Whole-request timeout (seconds)
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            index_path: default_index_path(),
            max_services: None,
            max_methods_per_service: None,
            max_workers: DEFAULT_MAX_WORKERS,
            request_delay_ms: default_request_delay_ms(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl CrawlerConfig {
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    #[serde(default = "default_user_agent")]
    pub value: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            value: default_user_agent(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path of the JSON checkpoint file
    #[serde(rename = "output-file", default = "default_output_file")]
    pub output_file: PathBuf,

    /// Pretty-print the JSON output
    #[serde(default = "default_pretty")]
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            output_file: default_output_file(),
            pretty: default_pretty(),
        }
    }
}

/// Values given on the command line; each `Some` replaces the file value
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub base_url: Option<String>,
    pub max_services: Option<usize>,
    pub max_methods_per_service: Option<usize>,
    pub max_workers: Option<usize>,
    pub output_file: Option<PathBuf>,
}

impl Config {
    /// Applies command line overrides on top of this configuration
    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(base_url) = overrides.base_url {
            self.crawler.base_url = base_url;
        }
        if let Some(max) = overrides.max_services {
            self.crawler.max_services = Some(max);
        }
        if let Some(max) = overrides.max_methods_per_service {
            self.crawler.max_methods_per_service = Some(max);
        }
        if let Some(workers) = overrides.max_workers {
            self.crawler.max_workers = workers;
        }
        if let Some(path) = overrides.output_file {
            self.output.output_file = path;
        }
    }
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_index_path() -> String {
    DEFAULT_INDEX_PATH.to_string()
}

fn default_max_workers() -> usize {
    DEFAULT_MAX_WORKERS
}

fn default_request_delay_ms() -> u64 {
    100
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_output_file() -> PathBuf {
    PathBuf::from(DEFAULT_OUTPUT_FILE)
}

fn default_pretty() -> bool {
    true
}
