//! High-level pipeline orchestration.
//!
//! The CLI-facing `App` façade runs the three stages in order:
//!   1. Config merge / validation
//!   2. Fetcher — concurrent index page retrieval (fatal if the index
//!      is unreachable)
//!   3. Extractor — concurrent detail page retrieval and validation
//!   4. Guard — zero extracted entries aborts before any file is touched
//!   5. Writer — atomic replacement of `urls.txt` / `ips.txt`
//!
//! The scoped HTTP client is constructed here and dropped with the run.

use std::sync::Arc;

use crate::cli::Cli;
use crate::config::Config;
use crate::errors::{Result, UsomFeedError};
use crate::writer::WriteSummary;
use crate::{extract, fetcher, http, writer};

/// Application façade.
pub struct App;

impl App {
    /// Execute one end-to-end scrape run against the default upstream.
    ///
    /// Returns: intended process exit code (0 = success).
    pub async fn run(cli: &Cli) -> Result<i32> {
        let mut config = Config::default();
        config.merge_with_cli(cli);
        config.validate()?;

        let summary = Self::run_with_config(cli, &config).await?;

        println!(
            "Wrote {} URL(s) to {} and {} IP(s) to {}",
            summary.urls_written,
            config.output.urls_path().display(),
            summary.ips_written,
            config.output.ips_path().display(),
        );
        Ok(0)
    }

    /// Execute the pipeline against an explicit configuration.
    ///
    /// Exposed for embedding and for tests that point the upstream at a
    /// local server; performs no stdout reporting of its own.
    pub async fn run_with_config(cli: &Cli, config: &Config) -> Result<WriteSummary> {
        config.validate()?;

        let client = http::build_client(&config.network)
            .map_err(|e| UsomFeedError::internal_with("HTTP client construction failed", e))?;
        let env = Arc::new(cli.clone());

        if env.is_trace() {
            eprintln!("fetching index from {}", config.upstream.base_url);
        }
        let pages = fetcher::fetch_index_pages(&client, config, Arc::clone(&env)).await?;

        let entries = extract::extract_entries(&client, config, &pages, Arc::clone(&env)).await;
        if env.is_trace() {
            eprintln!(
                "extracted {} unique entr{} ({} url, {} ip)",
                entries.len(),
                if entries.len() == 1 { "y" } else { "ies" },
                entries.url_count(),
                entries.ip_count(),
            );
        }

        if entries.is_empty() {
            return Err(UsomFeedError::NoEntries);
        }

        writer::write_entries(&entries, &config.output)
    }
}
