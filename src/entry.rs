//! Validated entries and the deduplicated result set.
//!
//! An `Entry` is one flagged resource as it will appear in an output
//! file: a kind (URL or IP address) plus the normalized value. The
//! validating constructor is `Entry::from_declared`; candidates that do
//! not parse as their declared kind are dropped as noise, never errors.
//!
//! `EntrySet` accumulates entries across all workers, deduplicating per
//! kind and handing back lexicographically sorted partitions so repeated
//! runs over identical input produce byte-identical files.

use std::collections::HashSet;
use std::net::IpAddr;

use url::{Host, Url};

/// Declared kind of a flagged resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    Url,
    Ip,
}

/// A validated flagged resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Entry {
    pub kind: EntryKind,
    pub value: String,
}

impl Entry {
    /// Validate a reported value against its declared kind.
    ///
    /// Returns `None` for anything that does not parse as the declared
    /// kind. A value declared as URL that is in fact a bare IP literal is
    /// reclassified as an IP entry; the upstream feed files such entries
    /// under its URL type, and routing them to the IP partition keeps any
    /// single value out of both output files.
    pub fn from_declared(kind: EntryKind, raw: &str) -> Option<Entry> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        match kind {
            EntryKind::Ip => normalize_ip_value(raw).map(|value| Entry {
                kind: EntryKind::Ip,
                value,
            }),
            EntryKind::Url => {
                if let Some(value) = normalize_ip_value(raw) {
                    return Some(Entry {
                        kind: EntryKind::Ip,
                        value,
                    });
                }
                normalize_url_value(raw).map(|value| Entry {
                    kind: EntryKind::Url,
                    value,
                })
            }
        }
    }
}

/// Parse a reported IP value into its canonical textual form.
pub fn normalize_ip_value(raw: &str) -> Option<String> {
    raw.trim().parse::<IpAddr>().ok().map(|ip| ip.to_string())
}

/// Validate a reported URL value, keeping the full reported locator.
///
/// The upstream publishes most entries without a scheme
/// (`evil.example.com/payload`), so values are parsed with an assumed
/// `http://` when needed. The host must be an IP literal or contain a
/// registrable domain. The returned value is the reported locator itself,
/// trimmed, not the normalized URL form: the output list preserves what
/// the upstream asserted.
pub fn normalize_url_value(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() || raw.chars().any(char::is_whitespace) {
        return None;
    }

    let parsed = match Url::parse(raw) {
        Ok(u) if u.has_host() => u,
        _ => Url::parse(&format!("http://{raw}")).ok()?,
    };

    match parsed.host()? {
        Host::Ipv4(_) | Host::Ipv6(_) => {}
        Host::Domain(d) => {
            psl::domain_str(d)?;
        }
    }

    Some(raw.to_string())
}

/// The deduplicated, partitioned result of one pipeline run.
#[derive(Debug, Clone, Default)]
pub struct EntrySet {
    urls: HashSet<String>,
    ips: HashSet<String>,
}

impl EntrySet {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert one validated entry into its partition.
    pub fn insert(&mut self, entry: Entry) {
        match entry.kind {
            EntryKind::Url => {
                self.urls.insert(entry.value);
            }
            EntryKind::Ip => {
                self.ips.insert(entry.value);
            }
        }
    }

    pub fn url_count(&self) -> usize {
        self.urls.len()
    }

    pub fn ip_count(&self) -> usize {
        self.ips.len()
    }

    pub fn len(&self) -> usize {
        self.urls.len() + self.ips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty() && self.ips.is_empty()
    }

    /// URL partition in strict lexicographic ascending order.
    pub fn sorted_urls(&self) -> Vec<String> {
        let mut v: Vec<String> = self.urls.iter().cloned().collect();
        v.sort();
        v
    }

    /// IP partition in strict lexicographic ascending order.
    pub fn sorted_ips(&self) -> Vec<String> {
        let mut v: Vec<String> = self.ips.iter().cloned().collect();
        v.sort();
        v
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_entry_keeps_reported_locator() {
        let e = Entry::from_declared(EntryKind::Url, " evil.example.com/payload ").unwrap();
        assert_eq!(e.kind, EntryKind::Url);
        assert_eq!(e.value, "evil.example.com/payload");

        let e = Entry::from_declared(EntryKind::Url, "https://evil.example.com/a?b=c").unwrap();
        assert_eq!(e.value, "https://evil.example.com/a?b=c");
    }

    #[test]
    fn url_entry_with_port_and_path() {
        let e = Entry::from_declared(EntryKind::Url, "evil.example.com:8080/login").unwrap();
        assert_eq!(e.kind, EntryKind::Url);
        assert_eq!(e.value, "evil.example.com:8080/login");
    }

    #[test]
    fn bare_ip_declared_as_url_is_reclassified() {
        let e = Entry::from_declared(EntryKind::Url, "203.0.113.5").unwrap();
        assert_eq!(e.kind, EntryKind::Ip);
        assert_eq!(e.value, "203.0.113.5");
    }

    #[test]
    fn ip_hosted_url_with_path_stays_a_url() {
        let e = Entry::from_declared(EntryKind::Url, "203.0.113.5/admin.php").unwrap();
        assert_eq!(e.kind, EntryKind::Url);
    }

    #[test]
    fn ip_entries_parse_v4_and_v6() {
        let e = Entry::from_declared(EntryKind::Ip, "203.0.113.5").unwrap();
        assert_eq!(e.value, "203.0.113.5");
        let e = Entry::from_declared(EntryKind::Ip, "2001:db8::1").unwrap();
        assert_eq!(e.kind, EntryKind::Ip);
        assert_eq!(e.value, "2001:db8::1");
    }

    #[test]
    fn malformed_candidates_are_dropped() {
        assert!(Entry::from_declared(EntryKind::Ip, "999.1.2.3").is_none());
        assert!(Entry::from_declared(EntryKind::Ip, "not an ip").is_none());
        assert!(Entry::from_declared(EntryKind::Url, "").is_none());
        assert!(Entry::from_declared(EntryKind::Url, "just some words").is_none());
        assert!(Entry::from_declared(EntryKind::Url, "localhost/x").is_none());
    }

    #[test]
    fn entry_set_deduplicates_per_kind() {
        let mut set = EntrySet::new();
        set.insert(Entry::from_declared(EntryKind::Url, "evil.example.com/payload").unwrap());
        set.insert(Entry::from_declared(EntryKind::Url, "evil.example.com/payload").unwrap());
        set.insert(Entry::from_declared(EntryKind::Ip, "203.0.113.5").unwrap());
        assert_eq!(set.url_count(), 1);
        assert_eq!(set.ip_count(), 1);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn partitions_sort_lexicographically() {
        let mut set = EntrySet::new();
        for v in ["b.example.org/x", "a.example.org/x", "a.example.org/a"] {
            set.insert(Entry::from_declared(EntryKind::Url, v).unwrap());
        }
        assert_eq!(
            set.sorted_urls(),
            vec!["a.example.org/a", "a.example.org/x", "b.example.org/x"]
        );
    }

    #[test]
    fn same_value_cannot_reach_both_partitions() {
        let mut set = EntrySet::new();
        set.insert(Entry::from_declared(EntryKind::Url, "203.0.113.5").unwrap());
        set.insert(Entry::from_declared(EntryKind::Ip, "203.0.113.5").unwrap());
        assert_eq!(set.url_count(), 0);
        assert_eq!(set.ip_count(), 1);
    }
}
