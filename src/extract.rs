//! Listing/detail page parsing and the extraction stage.
//!
//! The upstream markup is third-party HTML we do not control, so all
//! parsing here is a tolerant pattern scan with one documented contract
//! per function. If the upstream format drifts, these functions return
//! nothing and the fixture tests fail loudly — record loss is never
//! silent at the contract level.
//!
//! Contracts:
//! - Record identifiers appear on listing pages as `href="/adres/<id>"`
//!   links.
//! - Pagination links carry a `page=<n>` query parameter; the largest
//!   one on the first page is the page count.
//! - A detail page declares its record in definition-list rows: the
//!   value under a label of `Adres`/`Address`/`URL`, the kind under
//!   `Tür`/`Type`/`Tip`. Kind text containing `IP` marks an IP record;
//!   link/domain wordings mark a URL record.

use std::collections::HashSet;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::cli::Cli;
use crate::config::Config;
use crate::entry::{Entry, EntryKind, EntrySet};
use crate::fetcher::ListingPage;
use crate::http::get_text;

static RE_RECORD_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"href="/adres/(\d+)""#).unwrap());

static RE_PAGE_LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[?&](?:amp;)?page=(\d+)").unwrap());

static RE_DETAIL_FIELD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<dt[^>]*>(.*?)</dt>\s*<dd[^>]*>(.*?)</dd>").unwrap());

static RE_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<[^>]*>").unwrap());

/// Scan one listing page for record identifiers.
///
/// Returns identifiers in first-appearance order with duplicates removed.
/// Unknown or empty markup yields an empty vec.
pub fn scan_record_ids(html: &str) -> Vec<u64> {
    let mut seen = HashSet::new();
    let mut ids = Vec::new();
    for cap in RE_RECORD_ID.captures_iter(html) {
        if let Ok(id) = cap[1].parse::<u64>()
            && seen.insert(id)
        {
            ids.push(id);
        }
    }
    ids
}

/// Discover the index page count from pagination links on the first page.
///
/// Returns the largest `page=<n>` value found, at least 1, clamped to
/// `cap`. A page without pagination markup counts as a single-page index.
pub fn discover_page_count(html: &str, cap: usize) -> usize {
    let max_seen = RE_PAGE_LINK
        .captures_iter(html)
        .filter_map(|c| c[1].parse::<usize>().ok())
        .max()
        .unwrap_or(1);
    max_seen.clamp(1, cap)
}

/// One record's declared fields as recovered from a detail page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailRecord {
    pub kind_label: String,
    pub value: String,
}

/// Recover the declared value and declared kind from a detail page.
///
/// Both fields must be present; a page missing either is unparseable and
/// yields `None`.
pub fn parse_detail(html: &str) -> Option<DetailRecord> {
    let mut value: Option<String> = None;
    let mut kind_label: Option<String> = None;

    for cap in RE_DETAIL_FIELD.captures_iter(html) {
        let label = clean_fragment(&cap[1]).to_lowercase();
        let content = clean_fragment(&cap[2]);
        if content.is_empty() {
            continue;
        }
        if value.is_none() && (label.contains("adres") || label.contains("address") || label == "url")
        {
            value = Some(content);
        } else if kind_label.is_none()
            && (label.contains("tür") || label.contains("tur") || label.contains("type") || label.contains("tip"))
        {
            kind_label = Some(content);
        }
    }

    Some(DetailRecord {
        kind_label: kind_label?,
        value: value?,
    })
}

/// Map a declared kind label onto an `EntryKind`.
///
/// Returns `None` for wordings that match neither kind; such records are
/// dropped.
pub fn classify_kind(label: &str) -> Option<EntryKind> {
    let l = label.to_lowercase();
    if l.contains("ip") {
        return Some(EntryKind::Ip);
    }
    const URL_MARKERS: [&str; 5] = ["bağlant", "url", "link", "domain", "alan ad"];
    if URL_MARKERS.iter().any(|m| l.contains(m)) {
        return Some(EntryKind::Url);
    }
    None
}

/// Parse one detail page all the way down to a validated entry.
pub fn entry_from_detail(html: &str) -> Option<Entry> {
    let record = parse_detail(html)?;
    let kind = classify_kind(&record.kind_label)?;
    Entry::from_declared(kind, &record.value)
}

/// Strip tags, decode the handful of entities the upstream emits, and
/// collapse whitespace.
fn clean_fragment(fragment: &str) -> String {
    let without_tags = RE_TAG.replace_all(fragment, " ");
    let decoded = without_tags
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ");
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Extractor stage: fan out one detail fetch per discovered record and
/// merge each worker's result into the deduplicated set.
///
/// Per-record failures (fetch, status, parse, validation) are dropped;
/// this stage never fails the run.
pub async fn extract_entries(
    client: &Client,
    cfg: &Config,
    pages: &[ListingPage],
    env: Arc<Cli>,
) -> EntrySet {
    let mut seen = HashSet::new();
    let mut ids: Vec<u64> = Vec::new();
    for page in pages {
        for id in scan_record_ids(&page.body) {
            if seen.insert(id) {
                ids.push(id);
            }
        }
    }

    if env.is_trace() {
        eprintln!(
            "discovered {} record(s) across {} page(s)",
            ids.len(),
            pages.len()
        );
    }

    let semaphore = Arc::new(Semaphore::new(cfg.network.max_concurrent_requests));
    let mut join: JoinSet<Option<Entry>> = JoinSet::new();

    for id in ids {
        let client = client.clone();
        let env = Arc::clone(&env);
        let semaphore = Arc::clone(&semaphore);
        let net = cfg.network.clone();
        let url = cfg.upstream.detail_url(id);

        join.spawn(async move {
            let _permit = semaphore.acquire_owned().await.ok()?;
            match get_text(&client, &url, &net, &env).await {
                Ok(body) => {
                    let entry = entry_from_detail(&body);
                    if entry.is_none() && env.is_trace() {
                        eprintln!("  record {id}: no usable entry");
                    }
                    entry
                }
                Err(e) => {
                    if env.warn_enabled() {
                        eprintln!("record {id} fetch failed: {e}");
                    }
                    None
                }
            }
        });
    }

    let mut set = EntrySet::new();
    while let Some(res) = join.join_next().await {
        if let Ok(Some(entry)) = res {
            set.insert(entry);
        }
    }
    set
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = r#"
        <table class="table">
          <tr><td><a href="/adres/101">evil.example.com/payload</a></td></tr>
          <tr><td><a href="/adres/102">203.0.113.5</a></td></tr>
          <tr><td><a href="/adres/101">duplicate link</a></td></tr>
        </table>
        <ul class="pagination">
          <li><a href="/adres?page=1">1</a></li>
          <li><a href="/adres?page=2">2</a></li>
          <li><a href="/adres?page=37">37</a></li>
        </ul>
    "#;

    const DETAIL_URL: &str = r#"
        <dl>
          <dt>Adres</dt><dd>evil.example.com/payload</dd>
          <dt>Tür</dt><dd>Zararlı Bağlantı</dd>
          <dt>Tarih</dt><dd>2024-01-01</dd>
        </dl>
    "#;

    const DETAIL_IP: &str = r#"
        <dl>
          <dt>Adres</dt><dd> 203.0.113.5 </dd>
          <dt>Tür</dt><dd>Zararlı IP</dd>
        </dl>
    "#;

    #[test]
    fn scans_record_ids_in_order_without_duplicates() {
        assert_eq!(scan_record_ids(LISTING), vec![101, 102]);
        assert!(scan_record_ids("<html><body>nothing here</body></html>").is_empty());
    }

    #[test]
    fn pagination_links_do_not_look_like_records() {
        let ids = scan_record_ids(r#"<a href="/adres?page=9">9</a>"#);
        assert!(ids.is_empty());
    }

    #[test]
    fn discovers_page_count_with_clamp() {
        assert_eq!(discover_page_count(LISTING, 1000), 37);
        assert_eq!(discover_page_count(LISTING, 10), 10);
        assert_eq!(discover_page_count("<html></html>", 1000), 1);
    }

    #[test]
    fn parses_detail_fields() {
        let rec = parse_detail(DETAIL_URL).unwrap();
        assert_eq!(rec.value, "evil.example.com/payload");
        assert_eq!(rec.kind_label, "Zararlı Bağlantı");
    }

    #[test]
    fn detail_without_kind_is_unparseable() {
        let html = "<dl><dt>Adres</dt><dd>evil.example.com</dd></dl>";
        assert!(parse_detail(html).is_none());
    }

    #[test]
    fn classifies_kind_labels() {
        assert_eq!(classify_kind("Zararlı IP"), Some(EntryKind::Ip));
        assert_eq!(classify_kind("Zararlı Bağlantı"), Some(EntryKind::Url));
        assert_eq!(classify_kind("Malicious Domain"), Some(EntryKind::Url));
        assert_eq!(classify_kind("Zararlı Alan Adı"), Some(EntryKind::Url));
        assert_eq!(classify_kind("something else"), None);
    }

    #[test]
    fn detail_pages_become_entries() {
        let e = entry_from_detail(DETAIL_URL).unwrap();
        assert_eq!(e.kind, EntryKind::Url);
        assert_eq!(e.value, "evil.example.com/payload");

        let e = entry_from_detail(DETAIL_IP).unwrap();
        assert_eq!(e.kind, EntryKind::Ip);
        assert_eq!(e.value, "203.0.113.5");
    }

    #[test]
    fn entity_and_tag_noise_is_cleaned() {
        let html = r#"
            <dl>
              <dt><span>Adres</span></dt><dd><b>evil.example.com/a</b>&nbsp;</dd>
              <dt>Tür</dt><dd><i>Zararlı&nbsp;Bağlantı</i></dd>
            </dl>
        "#;
        let e = entry_from_detail(html).unwrap();
        assert_eq!(e.value, "evil.example.com/a");
    }

    #[test]
    fn garbage_detail_yields_nothing() {
        assert!(entry_from_detail("<html>maintenance</html>").is_none());
        let html = "<dl><dt>Adres</dt><dd>not a valid value at all</dd><dt>Tür</dt><dd>Zararlı Bağlantı</dd></dl>";
        assert!(entry_from_detail(html).is_none());
    }
}
