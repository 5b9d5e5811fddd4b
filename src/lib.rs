//! usomfeed library
//!
//! Fetches the paginated malicious-address feed published by USOM (the
//! Computer Emergency Response Team of Turkey), validates each flagged
//! record as a URL or IP address, and writes deduplicated, sorted
//! blocklist files. The library exposes the three pipeline stages —
//! fetcher, extractor, writer — plus the parsing contracts used against
//! the upstream markup.
//!
//! # Example
//!
//! ```rust
//! use usomfeed::entry::{Entry, EntryKind, EntrySet};
//!
//! let mut set = EntrySet::new();
//! if let Some(e) = Entry::from_declared(EntryKind::Url, "evil.example.com/payload") {
//!     set.insert(e);
//! }
//! assert_eq!(set.sorted_urls(), vec!["evil.example.com/payload"]);
//! ```

// Re-export all modules for library use
pub mod app;
pub mod cli;
pub mod config;
pub mod entry;
pub mod errors;
pub mod extract;
pub mod fetcher;
pub mod http;
pub mod retry;
pub mod writer;

// Re-export commonly used types and functions for convenience
pub use entry::{Entry, EntryKind, EntrySet};
pub use errors::{Result, UsomFeedError};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
