//! CLI entry point for sitegrab.

use anyhow::Result;
use clap::Parser;
use sitegrab_core::{HttpClient, RunSummary, SystemClock, run};
use tracing::{debug, info, warn};

mod cli;

use cli::Args;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    // Priority: RUST_LOG env var > quiet flag > verbose flag > default (info)
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(args.default_log_level()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    debug!(?args, "CLI arguments parsed");

    let config = args.into_config()?;
    let client = HttpClient::new();

    match run(&config, &client, &SystemClock).await? {
        RunSummary::Downloaded(result) => {
            info!(
                path = %result.path.display(),
                bytes = result.bytes_downloaded,
                "Download complete"
            );
        }
        RunSummary::Mirrored(report) => {
            if report.failed_count() > 0 {
                warn!(failed = report.failed_count(), "some assets could not be saved");
            }
            info!(
                page = %report.page_path.display(),
                saved = report.saved_count(),
                rejected = report.rejected_count(),
                failed = report.failed_count(),
                unresolved = report.unresolved.len(),
                "Mirror complete"
            );
        }
    }

    Ok(())
}
