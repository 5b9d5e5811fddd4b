/*!
HTTP plumbing for the scrape pipeline.

This module centralizes:
- Construction of the scoped `reqwest` client (one per run, torn down
  with the run; there is no global session)
- A single GET helper with per-request timeout + retry
- The `FetchEnv` verbosity abstraction shared by concurrent workers

Non-success statuses are turned into errors here so callers only have
to distinguish "got a body" from "this request slot failed".
*/

use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use reqwest::Client;

use crate::cli::Cli;
use crate::config::NetworkConfig;
use crate::retry::{HttpRetryPolicy, RetryConfig, RetryExecutor};

/// Abstraction over environment / verbosity for fetch operations.
/// This removes the direct dependency of network helpers on the concrete
/// CLI type and lets spawned workers share one `Arc<Cli>`.
pub trait FetchEnv {
    fn show_commands(&self) -> bool;
    fn is_trace(&self) -> bool;
    fn warn_enabled(&self) -> bool;
}

impl FetchEnv for Cli {
    fn show_commands(&self) -> bool {
        self.show_commands
    }
    fn is_trace(&self) -> bool {
        self.is_trace()
    }
    fn warn_enabled(&self) -> bool {
        self.warn_enabled()
    }
}

impl FetchEnv for Arc<Cli> {
    fn show_commands(&self) -> bool {
        self.as_ref().show_commands()
    }
    fn is_trace(&self) -> bool {
        self.as_ref().is_trace()
    }
    fn warn_enabled(&self) -> bool {
        self.as_ref().warn_enabled()
    }
}

const USER_AGENT: &str = concat!("usomfeed/", env!("CARGO_PKG_VERSION"));

/// Build the HTTP client used for one pipeline run.
pub fn build_client(net: &NetworkConfig) -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(net.connect_timeout)
        .timeout(net.request_timeout)
        .build()
        .context("failed to construct HTTP client")
}

/// GET a single page and return its body as text.
///
/// Retries transient failures per `NetworkConfig`; a non-success status
/// or an exhausted retry budget yields an error the caller decides how
/// to absorb (empty page, dropped record, or fatal probe failure).
pub async fn get_text<E: FetchEnv + ?Sized>(
    client: &Client,
    url: &str,
    net: &NetworkConfig,
    env: &E,
) -> Result<String> {
    if env.show_commands() {
        eprintln!("(cmd) curl -sS '{url}'");
    }

    let executor = RetryExecutor::new(RetryConfig::from_network(net));
    executor
        .execute(
            || async {
                let resp = client
                    .get(url)
                    .send()
                    .await
                    .map_err(|e| anyhow!("GET {url}: {e}"))?;
                let status = resp.status();
                if !status.is_success() {
                    return Err(anyhow!("HTTP {status} for {url}"));
                }
                resp.text()
                    .await
                    .map_err(|e| anyhow!("read body of {url}: {e}"))
            },
            &HttpRetryPolicy,
        )
        .await
}
