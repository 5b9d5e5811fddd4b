//! Unified error handling.
//!
//! `thiserror`-based error model with:
//!   * Typed variants for the failure domains of the pipeline
//!   * A coarse categorization layer (`ErrorCategory`)
//!   * Helper constructors
//!   * `From` conversions for common lower-level errors
//!
//! Only errors that prevent producing any output exist here. Per-page and
//! per-record failures are contained where they happen (fetch/parse call
//! sites) and never surface as values of this type.

use std::io;

use thiserror::Error;

/// High-level classification for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Network,
    Parse,
    Internal,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ErrorCategory::Input => "input",
            ErrorCategory::Network => "network",
            ErrorCategory::Parse => "parse",
            ErrorCategory::Internal => "internal",
        };
        f.write_str(s)
    }
}

/// Primary application error type.
#[derive(Error, Debug)]
pub enum UsomFeedError {
    // ------------------------ Input / Validation ----------------------------
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    // ----------------------------- Network ----------------------------------
    #[error("Upstream index unreachable: {detail}")]
    UpstreamUnavailable { detail: String },

    // ---------------------------- Parsing -----------------------------------
    #[error("No entries extracted from upstream; refusing to overwrite previous output")]
    NoEntries,

    // ----------------------------- I/O / FS ---------------------------------
    #[error("I/O error during {operation} on {path}: {source}")]
    Io {
        path: String,
        operation: String,
        #[source]
        source: io::Error,
    },

    // ---------------------------- Internal ----------------------------------
    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl UsomFeedError {
    /// Categorize the error for diagnostics.
    pub fn category(&self) -> ErrorCategory {
        use UsomFeedError::*;
        match self {
            Configuration { .. } => ErrorCategory::Input,
            UpstreamUnavailable { .. } => ErrorCategory::Network,
            NoEntries => ErrorCategory::Parse,
            Io { .. } | Internal { .. } => ErrorCategory::Internal,
        }
    }

    // ---------------------------- Constructors -----------------------------

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn upstream_unavailable(detail: impl Into<String>) -> Self {
        Self::UpstreamUnavailable {
            detail: detail.into(),
        }
    }

    pub fn io(path: impl Into<String>, operation: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            operation: operation.into(),
            source,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
            source: None,
        }
    }

    pub fn internal_with(
        message: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Internal {
            message: message.into(),
            source: Some(source.into()),
        }
    }
}

/// Public result alias.
pub type Result<T> = std::result::Result<T, UsomFeedError>;

/// Map standard IO errors into `Io` variant (generic context).
impl From<io::Error> for UsomFeedError {
    fn from(e: io::Error) -> Self {
        UsomFeedError::Io {
            path: "<unknown>".into(),
            operation: "unspecified".into(),
            source: e,
        }
    }
}

/// Extension trait for enriching IO results with path + operation context.
pub trait IoResultExt<T> {
    fn with_path(self, path: impl Into<String>, operation: impl Into<String>) -> Result<T>;
}

impl<T> IoResultExt<T> for std::result::Result<T, io::Error> {
    fn with_path(self, path: impl Into<String>, operation: impl Into<String>) -> Result<T> {
        self.map_err(|e| UsomFeedError::io(path.into(), operation.into(), e))
    }
}
