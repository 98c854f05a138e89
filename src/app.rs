//! One complete invocation: validate the target, fetch it, report timings.
//!
//! The binary builds a [`RunConfig`] from the command line and hands it to
//! [`run`]. Everything below this module is reusable on its own.

use std::path::{Path, PathBuf};
use std::time::Duration;

use thiserror::Error;
use tracing::{info, instrument};
use url::Url;

use crate::clock::{Clock, format_timestamp};
use crate::download::{DownloadError, DownloadFileResult, HttpClient};
use crate::filter::FilterRules;
use crate::mirror::{DEFAULT_CONCURRENCY, MirrorEngine, MirrorError, MirrorReport};

/// Invalid invocation settings, detected before any request is made.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The target does not parse as an absolute URL.
    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl {
        /// Value as given.
        url: String,
        /// Parser message.
        reason: String,
    },

    /// The target uses a scheme other than http or https.
    #[error("unsupported URL scheme '{scheme}' in '{url}': only http and https are fetched")]
    UnsupportedScheme {
        /// Value as given.
        url: String,
        /// Offending scheme.
        scheme: String,
    },

    /// The target has no host.
    #[error("URL '{url}' has no host")]
    MissingHost {
        /// Value as given.
        url: String,
    },
}

/// Validated settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunConfig {
    url: Url,
    mirror: bool,
    rules: FilterRules,
    folder: PathBuf,
    concurrency: usize,
}

impl RunConfig {
    /// Validates `url` and targets `folder`. Single-file mode, no rules.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] unless `url` is an absolute http(s) URL with
    /// a host.
    pub fn new(url: &str, folder: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        Ok(Self {
            url: parse_target(url)?,
            mirror: false,
            rules: FilterRules::default(),
            folder: folder.into(),
            concurrency: DEFAULT_CONCURRENCY,
        })
    }

    /// Enables or disables mirror mode.
    #[must_use]
    pub fn with_mirror(mut self, mirror: bool) -> Self {
        self.mirror = mirror;
        self
    }

    /// Sets the reject/exclude rules used in mirror mode.
    #[must_use]
    pub fn with_rules(mut self, rules: FilterRules) -> Self {
        self.rules = rules;
        self
    }

    /// Sets how many assets are fetched at once in mirror mode.
    #[must_use]
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency;
        self
    }

    /// Target URL.
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Whether mirror mode is on.
    #[must_use]
    pub fn mirror(&self) -> bool {
        self.mirror
    }

    /// Filter rules.
    #[must_use]
    pub fn rules(&self) -> &FilterRules {
        &self.rules
    }

    /// Output folder.
    #[must_use]
    pub fn folder(&self) -> &Path {
        &self.folder
    }

    /// Asset fetch concurrency.
    #[must_use]
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }
}

fn parse_target(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim()).map_err(|e| ConfigError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::UnsupportedScheme {
            url: raw.to_string(),
            scheme: url.scheme().to_string(),
        });
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(ConfigError::MissingHost {
            url: raw.to_string(),
        });
    }
    Ok(url)
}

/// Errors that end a run with a failure status.
#[derive(Debug, Error)]
pub enum RunError {
    /// Single-file download failed.
    #[error(transparent)]
    Download(#[from] DownloadError),

    /// Mirror run failed on the page itself.
    #[error(transparent)]
    Mirror(#[from] MirrorError),
}

/// What a successful run produced.
#[derive(Debug)]
pub enum RunSummary {
    /// Single-file mode result.
    Downloaded(DownloadFileResult),
    /// Mirror mode result.
    Mirrored(MirrorReport),
}

impl RunSummary {
    /// Local path of the primary resource.
    #[must_use]
    pub fn primary_path(&self) -> &Path {
        match self {
            Self::Downloaded(result) => &result.path,
            Self::Mirrored(report) => &report.page_path,
        }
    }
}

/// Runs one invocation.
///
/// Start and finish times come from `clock` and are logged as HTTP dates.
/// The elapsed time is measured separately, so a frozen clock still yields a
/// real duration.
///
/// # Errors
///
/// Returns [`RunError`] when the primary resource cannot be fetched or saved.
/// Asset failures in mirror mode are part of the returned summary.
#[instrument(skip_all, fields(url = %config.url(), mirror = config.mirror()))]
pub async fn run(
    config: &RunConfig,
    client: &HttpClient,
    clock: &dyn Clock,
) -> Result<RunSummary, RunError> {
    let started = std::time::Instant::now();
    info!(at = %format_timestamp(clock.now()), "started");

    let summary = if config.mirror() {
        let engine = MirrorEngine::new(
            config.concurrency(),
            config.rules().clone(),
            config.folder(),
        )?;
        RunSummary::Mirrored(engine.mirror(client, config.url()).await?)
    } else {
        RunSummary::Downloaded(client.download_to_file(config.url(), config.folder()).await?)
    };

    let elapsed = started.elapsed();
    info!(
        at = %format_timestamp(clock.now()),
        elapsed_ms = millis(elapsed),
        path = %summary.primary_path().display(),
        "finished"
    );
    Ok(summary)
}

fn millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, ResponseTemplate};

    use crate::clock::FixedClock;
    use crate::test_support::socket_guard::start_mock_server_or_skip;

    #[test]
    fn test_run_config_accepts_http_and_https() {
        for raw in ["http://example.test/page.html", "https://example.test/"] {
            let config = RunConfig::new(raw, ".").unwrap();
            assert_eq!(config.url().as_str(), raw);
            assert!(!config.mirror());
            assert!(config.rules().is_empty());
            assert_eq!(config.concurrency(), DEFAULT_CONCURRENCY);
        }
    }

    #[test]
    fn test_run_config_rejects_relative_url() {
        let result = RunConfig::new("page.html", ".");
        assert!(matches!(result, Err(ConfigError::InvalidUrl { .. })));
    }

    #[test]
    fn test_run_config_rejects_other_schemes() {
        let result = RunConfig::new("ftp://example.test/file.txt", ".");
        assert_eq!(
            result,
            Err(ConfigError::UnsupportedScheme {
                url: "ftp://example.test/file.txt".to_string(),
                scheme: "ftp".to_string(),
            })
        );
    }

    #[test]
    fn test_run_config_builders() {
        let rules = FilterRules::from_lists(Some(".css"), None);
        let config = RunConfig::new("http://example.test/", "site")
            .unwrap()
            .with_mirror(true)
            .with_rules(rules.clone())
            .with_concurrency(1);
        assert!(config.mirror());
        assert_eq!(config.rules(), &rules);
        assert_eq!(config.folder(), Path::new("site"));
        assert_eq!(config.concurrency(), 1);
    }

    #[test]
    fn test_config_error_display_names_the_value() {
        let error = RunConfig::new("mailto:me@example.test", ".").unwrap_err();
        assert!(error.to_string().contains("mailto"));
    }

    #[tokio::test]
    async fn test_run_single_file_saves_under_last_segment() {
        let Some(server) = start_mock_server_or_skip().await else {
            return;
        };
        Mock::given(method("GET"))
            .and(path("/docs/guide.txt"))
            .respond_with(ResponseTemplate::new(200).set_body_string("guide"))
            .mount(&server)
            .await;

        let temp_dir = TempDir::new().unwrap();
        let config =
            RunConfig::new(&format!("{}/docs/guide.txt", server.uri()), temp_dir.path()).unwrap();
        let summary = run(&config, &HttpClient::new(), &FixedClock::from_unix_secs(0))
            .await
            .unwrap();

        let expected = temp_dir.path().join("guide.txt");
        assert_eq!(summary.primary_path(), expected);
        assert!(matches!(summary, RunSummary::Downloaded(_)));
        assert_eq!(std::fs::read_to_string(expected).unwrap(), "guide");
    }

    #[tokio::test]
    async fn test_run_mirror_propagates_page_failure() {
        let Some(server) = start_mock_server_or_skip().await else {
            return;
        };
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let temp_dir = TempDir::new().unwrap();
        let config = RunConfig::new(&format!("{}/page.html", server.uri()), temp_dir.path())
            .unwrap()
            .with_mirror(true);
        let result = run(&config, &HttpClient::new(), &FixedClock::from_unix_secs(0)).await;

        assert!(matches!(result, Err(RunError::Mirror(MirrorError::Page { .. }))));
        assert!(!temp_dir.path().join("page.html").exists());
    }

    #[tokio::test]
    async fn test_run_rejects_out_of_range_concurrency() {
        let config = RunConfig::new("http://example.test/", ".")
            .unwrap()
            .with_mirror(true)
            .with_concurrency(0);
        let result = run(&config, &HttpClient::new(), &FixedClock::from_unix_secs(0)).await;
        assert!(matches!(
            result,
            Err(RunError::Mirror(MirrorError::InvalidConcurrency { value: 0 }))
        ));
    }
}
