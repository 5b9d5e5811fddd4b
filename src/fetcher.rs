//! Concurrent retrieval of the paginated upstream index.
//!
//! Page 1 doubles as the reachability probe: if it cannot be fetched
//! (after per-request retries) the index is considered unreachable and
//! the run aborts before anything is written. Every later page is
//! best-effort — a failed page becomes an empty body and costs only the
//! records it would have referenced.

use std::sync::Arc;

use reqwest::Client;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::cli::Cli;
use crate::config::Config;
use crate::errors::{Result, UsomFeedError};
use crate::extract::discover_page_count;
use crate::http::get_text;

/// One page of the paginated upstream index.
#[derive(Debug, Clone)]
pub struct ListingPage {
    pub index: usize,
    pub body: String,
}

impl ListingPage {
    fn empty(index: usize) -> Self {
        Self {
            index,
            body: String::new(),
        }
    }
}

/// Fetcher stage: retrieve all index pages, bounded by the semaphore.
///
/// Page order in the returned vec is not meaningful; downstream stages
/// treat the pages as an unordered batch.
pub async fn fetch_index_pages(
    client: &Client,
    cfg: &Config,
    env: Arc<Cli>,
) -> Result<Vec<ListingPage>> {
    let probe_url = cfg.upstream.index_url(1);
    let first_body = get_text(client, &probe_url, &cfg.network, &env)
        .await
        .map_err(|e| UsomFeedError::upstream_unavailable(format!("index page 1: {e}")))?;

    let total = discover_page_count(&first_body, cfg.upstream.max_index_pages);
    if env.is_trace() {
        eprintln!("index reports {total} page(s)");
    }

    let mut pages = Vec::with_capacity(total);
    pages.push(ListingPage {
        index: 1,
        body: first_body,
    });

    let semaphore = Arc::new(Semaphore::new(cfg.network.max_concurrent_requests));
    let mut join: JoinSet<ListingPage> = JoinSet::new();

    for index in 2..=total {
        let client = client.clone();
        let env = Arc::clone(&env);
        let semaphore = Arc::clone(&semaphore);
        let net = cfg.network.clone();
        let url = cfg.upstream.index_url(index);

        join.spawn(async move {
            let Ok(_permit) = semaphore.acquire_owned().await else {
                return ListingPage::empty(index);
            };
            match get_text(&client, &url, &net, &env).await {
                Ok(body) => ListingPage { index, body },
                Err(e) => {
                    if env.warn_enabled() {
                        eprintln!("index page {index} fetch failed: {e}");
                    }
                    ListingPage::empty(index)
                }
            }
        });
    }

    while let Some(res) = join.join_next().await {
        if let Ok(page) = res {
            pages.push(page);
        }
    }

    if pages.iter().all(|p| p.body.is_empty()) {
        return Err(UsomFeedError::upstream_unavailable(
            "all index pages returned empty content",
        ));
    }

    Ok(pages)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_page_helper() {
        let p = ListingPage::empty(7);
        assert_eq!(p.index, 7);
        assert!(p.body.is_empty());
    }
}
