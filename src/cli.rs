//! CLI argument definitions using clap derive macros.

use clap::Parser;

use sitegrab_core::filter::FilterRules;
use sitegrab_core::{ConfigError, DEFAULT_CONCURRENCY, MAX_CONCURRENCY, RunConfig};

/// Download a web page, or mirror it together with its assets.
///
/// In mirror mode every `href`/`src` in the page is resolved, filtered and
/// saved under the output folder at a path mirroring its URL.
#[derive(Parser, Debug)]
#[command(name = "sitegrab")]
#[command(author, version, about)]
pub struct Args {
    /// URL of the page or file to fetch
    #[arg(long)]
    pub url: String,

    /// Also fetch the assets referenced by the page
    #[arg(long)]
    pub mirror: bool,

    /// Comma-separated URL suffixes to skip (e.g. ".png,.gif")
    #[arg(long, value_name = "LIST")]
    pub reject: Option<String>,

    /// Comma-separated URL prefixes to skip (e.g. "https://cdn.example.com")
    #[arg(long, value_name = "LIST")]
    pub exclude: Option<String>,

    /// Output folder
    #[arg(long, value_name = "PATH", default_value = ".")]
    pub folder: String,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,

    /// Maximum concurrent asset downloads in mirror mode (1-16)
    #[arg(
        short = 'c',
        long,
        default_value_t = DEFAULT_CONCURRENCY as u8,
        value_parser = clap::value_parser!(u8).range(1..=MAX_CONCURRENCY as i64)
    )]
    pub concurrency: u8,
}

impl Args {
    /// Log level used when `RUST_LOG` is not set.
    pub fn default_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "info",
                1 => "debug",
                _ => "trace",
            }
        }
    }

    /// Validates the arguments into a [`RunConfig`].
    pub fn into_config(self) -> Result<RunConfig, ConfigError> {
        let rules = FilterRules::from_lists(self.reject.as_deref(), self.exclude.as_deref());
        Ok(RunConfig::new(&self.url, self.folder)?
            .with_mirror(self.mirror)
            .with_rules(rules)
            .with_concurrency(usize::from(self.concurrency)))
    }
}
