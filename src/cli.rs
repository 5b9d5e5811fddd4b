use clap::Parser;

/// Command-line interface definition.
/// One invocation performs one full fetch/extract/write run.
///
/// Verbosity levels:
/// 0 - silent (only final summary)
/// 1 - errors (default)
/// 2 - warnings + errors
/// 5 - trace/debug
#[derive(Parser, Debug, Clone)]
#[command(
    author,
    version,
    about = "Fetch the USOM malicious URL/IP feed and write deduplicated blocklist files"
)]
pub struct Cli {
    /// Verbosity level (0,1,2,5)
    #[arg(long, default_value_t = 1)]
    pub verbose: u8,

    /// Show approximate shell-equivalent commands for each request
    #[arg(long)]
    pub show_commands: bool,

    /// Directory the output files are written to
    #[arg(long = "output-dir", value_name = "DIR", default_value = ".")]
    pub output_dir: String,
}

impl Cli {
    /// Parse CLI arguments from process args.
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// Convenience: are we in very verbose/debug mode?
    pub fn is_trace(&self) -> bool {
        self.verbose >= 5
    }

    /// Are warning-level messages enabled?
    pub fn warn_enabled(&self) -> bool {
        self.verbose >= 2
    }

    /// Are error-level messages enabled?
    pub fn error_enabled(&self) -> bool {
        self.verbose >= 1
    }
}
