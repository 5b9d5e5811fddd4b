//! Configuration for the scrape pipeline.
//!
//! All limits live here as internal constants via the `Default` impls;
//! there are no environment variables and no tunables on the CLI beyond
//! the output directory. Tests construct a `Config` directly and point
//! `upstream.base_url` at a local mock server.

use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cli::Cli;
use crate::errors::{Result, UsomFeedError};

/// Main configuration structure.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Network operation settings
    pub network: NetworkConfig,

    /// Upstream source location and crawl bounds
    pub upstream: UpstreamConfig,

    /// Output file locations
    pub output: OutputConfig,
}

/// Network-related configuration options
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// Total timeout for a single GET request
    pub request_timeout: Duration,

    /// TCP connect timeout
    pub connect_timeout: Duration,

    /// Maximum simultaneous in-flight requests
    pub max_concurrent_requests: usize,

    /// Retry attempts per request (not including the initial attempt)
    pub retry_attempts: u32,

    /// Initial delay between retry attempts
    pub retry_delay: Duration,
}

/// Upstream index/detail page addressing
#[derive(Debug, Clone)]
pub struct UpstreamConfig {
    /// Base address of the upstream site
    pub base_url: String,

    /// Upper bound on index pages fetched in one run
    pub max_index_pages: usize,
}

/// Output file locations
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Directory the output files are written to
    pub directory: PathBuf,

    /// File name for the URL partition
    pub urls_file: String,

    /// File name for the IP partition
    pub ips_file: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(15),
            connect_timeout: Duration::from_secs(10),
            max_concurrent_requests: 16,
            retry_attempts: 3,
            retry_delay: Duration::from_millis(500),
        }
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.usom.gov.tr".to_string(),
            max_index_pages: 1000,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            urls_file: "urls.txt".to_string(),
            ips_file: "ips.txt".to_string(),
        }
    }
}

impl UpstreamConfig {
    /// Address of one page of the paginated index (1-based).
    pub fn index_url(&self, page: usize) -> String {
        format!("{}/adres?page={}", self.base_url.trim_end_matches('/'), page)
    }

    /// Address of the detail page for one record identifier.
    pub fn detail_url(&self, id: u64) -> String {
        format!("{}/adres/{}", self.base_url.trim_end_matches('/'), id)
    }
}

impl OutputConfig {
    pub fn urls_path(&self) -> PathBuf {
        self.directory.join(&self.urls_file)
    }

    pub fn ips_path(&self) -> PathBuf {
        self.directory.join(&self.ips_file)
    }
}

impl Config {
    /// Apply the CLI overrides on top of the built-in defaults.
    pub fn merge_with_cli(&mut self, cli: &Cli) {
        if !cli.output_dir.is_empty() {
            self.output.directory = Path::new(&cli.output_dir).to_path_buf();
        }
    }

    /// Validate the merged configuration.
    pub fn validate(&self) -> Result<()> {
        if self.network.max_concurrent_requests == 0 {
            return Err(UsomFeedError::configuration(
                "max_concurrent_requests must be at least 1",
            ));
        }
        if self.upstream.max_index_pages == 0 {
            return Err(UsomFeedError::configuration(
                "max_index_pages must be at least 1",
            ));
        }
        if !self.upstream.base_url.starts_with("http://")
            && !self.upstream.base_url.starts_with("https://")
        {
            return Err(UsomFeedError::configuration(format!(
                "base_url must be an http(s) address, got '{}'",
                self.upstream.base_url
            )));
        }
        if self.output.urls_file == self.output.ips_file {
            return Err(UsomFeedError::configuration(
                "urls_file and ips_file must differ",
            ));
        }
        Ok(())
    }
}
