//! Mirror orchestrator.
//!
//! Fetches the page, saves it byte-for-byte, plans the assets it references
//! and fetches the accepted ones through a semaphore-bounded set of Tokio
//! tasks.
//!
//! # Failure policy
//!
//! - Page errors (transport, status, filesystem) abort the run and are
//!   returned as [`MirrorError::Page`]
//! - Asset errors are logged and recorded as [`AssetOutcome::FetchFailed`];
//!   they never stop the remaining assets
//! - References that cannot be resolved are logged and recorded in
//!   [`MirrorReport::unresolved`]
//!
//! # Example
//!
//! ```no_run
//! use sitegrab_core::download::HttpClient;
//! use sitegrab_core::filter::FilterRules;
//! use sitegrab_core::mirror::MirrorEngine;
//! use url::Url;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let engine = MirrorEngine::new(4, FilterRules::from_lists(Some(".png"), None), "./site")?;
//! let page = Url::parse("https://example.com/index.html")?;
//! let report = engine.mirror(&HttpClient::new(), &page).await?;
//! println!("saved {} assets, {} failed", report.saved_count(), report.failed_count());
//! # Ok(())
//! # }
//! ```

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};
use url::Url;

use super::state::{Lifecycle, ResourceState};
use crate::download::{DownloadError, HttpClient, mirror_path, partial_path};
use crate::filter::{FilterDecision, FilterRules, RejectReason};
use crate::parser::{HtmlDocument, ParseError, ResourceReference, resolve_reference};

/// Minimum allowed concurrency value.
pub const MIN_CONCURRENCY: usize = 1;

/// Maximum allowed concurrency value.
pub const MAX_CONCURRENCY: usize = 16;

/// Default number of assets fetched at once.
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Error type for mirror runs. Only page-level failures surface here.
#[derive(Debug, thiserror::Error)]
pub enum MirrorError {
    /// Invalid concurrency value provided.
    #[error(
        "invalid concurrency value {value}: must be between {MIN_CONCURRENCY} and {MAX_CONCURRENCY}"
    )]
    InvalidConcurrency {
        /// The invalid value that was provided.
        value: usize,
    },

    /// The page itself could not be fetched or saved.
    #[error("failed to mirror {url}: {source}")]
    Page {
        /// Page URL.
        url: String,
        /// What went wrong.
        #[source]
        source: DownloadError,
    },

    /// Semaphore was closed unexpectedly.
    #[error("semaphore closed unexpectedly")]
    SemaphoreClosed,
}

impl MirrorError {
    fn page(url: &Url, source: DownloadError) -> Self {
        Self::Page {
            url: url.to_string(),
            source,
        }
    }
}

/// Why an asset was not fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// A reject or exclude rule matched.
    Filtered(RejectReason),
    /// The local path equals, contains or sits inside a path already given
    /// to the page or an earlier asset.
    PathTaken(PathBuf),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Filtered(reason) => reason.fmt(f),
            Self::PathTaken(path) => {
                write!(f, "{} conflicts with an earlier path", path.display())
            }
        }
    }
}

/// Terminal outcome for one asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetOutcome {
    /// Not fetched.
    Rejected {
        /// Resolved asset URL.
        url: Url,
        /// Why it was skipped.
        reason: SkipReason,
    },
    /// Written to disk.
    Saved {
        /// Resolved asset URL.
        url: Url,
        /// Local file.
        path: PathBuf,
        /// Bytes written.
        bytes: u64,
    },
    /// Fetch or write failed; the error was logged.
    FetchFailed {
        /// Resolved asset URL.
        url: Url,
        /// Local file that was not written.
        path: PathBuf,
        /// HTTP status when the server answered with a non-2xx code.
        status: Option<u16>,
        /// Error message.
        message: String,
    },
}

impl AssetOutcome {
    /// Resolved URL of the asset.
    #[must_use]
    pub fn url(&self) -> &Url {
        match self {
            Self::Rejected { url, .. }
            | Self::Saved { url, .. }
            | Self::FetchFailed { url, .. } => url,
        }
    }

    /// Terminal state this outcome corresponds to.
    #[must_use]
    pub fn state(&self) -> ResourceState {
        match self {
            Self::Rejected { .. } => ResourceState::Rejected,
            Self::Saved { .. } => ResourceState::Saved,
            Self::FetchFailed { .. } => ResourceState::FetchFailed,
        }
    }
}

/// A reference that could not become a fetchable URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedReference {
    /// The reference as found in the page.
    pub reference: ResourceReference,
    /// Why it was skipped.
    pub error: ParseError,
}

/// What a page scan decided, before anything is fetched.
#[derive(Debug, Default)]
pub struct AssetPlan {
    /// Unique assets in discovery order.
    pub assets: Vec<PlannedAsset>,
    /// References skipped during resolution.
    pub unresolved: Vec<UnresolvedReference>,
}

/// One planned asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlannedAsset {
    /// Accepted; will be fetched into `path`.
    Fetch {
        /// Resolved asset URL.
        url: Url,
        /// Local destination.
        path: PathBuf,
    },
    /// Rejected during planning.
    Skip {
        /// Resolved asset URL.
        url: Url,
        /// Why it is skipped.
        reason: SkipReason,
    },
}

/// Everything a mirror run did.
#[derive(Debug)]
pub struct MirrorReport {
    /// The page URL.
    pub page_url: Url,
    /// Where the page was saved.
    pub page_path: PathBuf,
    /// Size of the saved page.
    pub page_bytes: u64,
    /// Whether the page was scanned for references.
    pub scanned: bool,
    /// Asset outcomes in discovery order.
    pub assets: Vec<AssetOutcome>,
    /// References that could not be resolved.
    pub unresolved: Vec<UnresolvedReference>,
}

impl MirrorReport {
    /// Number of assets written to disk.
    #[must_use]
    pub fn saved_count(&self) -> usize {
        self.count(ResourceState::Saved)
    }

    /// Number of assets skipped by rules or path collisions.
    #[must_use]
    pub fn rejected_count(&self) -> usize {
        self.count(ResourceState::Rejected)
    }

    /// Number of assets whose fetch or write failed.
    #[must_use]
    pub fn failed_count(&self) -> usize {
        self.count(ResourceState::FetchFailed)
    }

    fn count(&self, state: ResourceState) -> usize {
        self.assets.iter().filter(|o| o.state() == state).count()
    }
}

/// Mirrors one page and the assets it references.
///
/// # Concurrency Model
///
/// - Each accepted asset is fetched in its own Tokio task
/// - A semaphore permit is acquired before spawning, so at most
///   `concurrency` fetches run at once (`1` fetches strictly one by one)
/// - Every asset has its own destination path, so completion order does not
///   affect what ends up on disk
#[derive(Debug)]
pub struct MirrorEngine {
    semaphore: Arc<Semaphore>,
    concurrency: usize,
    rules: FilterRules,
    output_dir: PathBuf,
}

impl MirrorEngine {
    /// Creates an engine writing under `output_dir`.
    ///
    /// # Errors
    ///
    /// Returns [`MirrorError::InvalidConcurrency`] if `concurrency` is outside
    /// the valid range (1-16).
    #[instrument(level = "debug", skip(rules, output_dir))]
    pub fn new(
        concurrency: usize,
        rules: FilterRules,
        output_dir: impl Into<PathBuf>,
    ) -> Result<Self, MirrorError> {
        if !(MIN_CONCURRENCY..=MAX_CONCURRENCY).contains(&concurrency) {
            return Err(MirrorError::InvalidConcurrency { value: concurrency });
        }

        let output_dir = output_dir.into();
        debug!(
            concurrency,
            reject = ?rules.reject_suffixes(),
            exclude = ?rules.exclude_prefixes(),
            output_dir = %output_dir.display(),
            "creating mirror engine"
        );

        Ok(Self {
            semaphore: Arc::new(Semaphore::new(concurrency)),
            concurrency,
            rules,
            output_dir,
        })
    }

    /// Returns the configured concurrency limit.
    #[must_use]
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Returns the filter rules in force.
    #[must_use]
    pub fn rules(&self) -> &FilterRules {
        &self.rules
    }

    /// Returns the output folder.
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Fetches `page_url`, saves it, and fetches every accepted asset.
    ///
    /// The page is saved with its original links. Saved files overwrite any
    /// previous copy, so repeated runs converge on the same tree.
    ///
    /// # Errors
    ///
    /// Returns [`MirrorError::Page`] if the page cannot be fetched or saved.
    /// Asset failures are reported in the returned [`MirrorReport`].
    #[instrument(skip(self, client), fields(url = %page_url))]
    pub async fn mirror(
        &self,
        client: &HttpClient,
        page_url: &Url,
    ) -> Result<MirrorReport, MirrorError> {
        let page_path = mirror_path(&self.output_dir, page_url);
        let fetched = client
            .fetch(page_url)
            .await
            .map_err(|e| MirrorError::page(page_url, e))?;

        if !fetched.looks_like_html() {
            let content_type = fetched.content_type().unwrap_or_default().to_string();
            let page_bytes = fetched
                .save_to(&page_path)
                .await
                .map_err(|e| MirrorError::page(page_url, e))?;
            warn!(
                content_type = %content_type,
                path = %page_path.display(),
                "page is not HTML; no assets scanned"
            );
            return Ok(MirrorReport {
                page_url: page_url.clone(),
                page_path,
                page_bytes,
                scanned: false,
                assets: Vec::new(),
                unresolved: Vec::new(),
            });
        }

        let body = fetched
            .save_and_read(&page_path)
            .await
            .map_err(|e| MirrorError::page(page_url, e))?;
        info!(path = %page_path.display(), bytes = body.len(), "page saved");

        let plan = plan_assets(&body, page_url, &self.rules, &self.output_dir);
        debug!(
            assets = plan.assets.len(),
            unresolved = plan.unresolved.len(),
            "page scanned"
        );

        let assets = self.fetch_assets(client, plan.assets).await?;
        let report = MirrorReport {
            page_url: page_url.clone(),
            page_path,
            page_bytes: body.len() as u64,
            scanned: true,
            assets,
            unresolved: plan.unresolved,
        };

        info!(
            saved = report.saved_count(),
            rejected = report.rejected_count(),
            failed = report.failed_count(),
            unresolved = report.unresolved.len(),
            "mirror complete"
        );
        Ok(report)
    }

    async fn fetch_assets(
        &self,
        client: &HttpClient,
        planned: Vec<PlannedAsset>,
    ) -> Result<Vec<AssetOutcome>, MirrorError> {
        let mut slots = Vec::with_capacity(planned.len());

        for asset in planned {
            match asset {
                PlannedAsset::Skip { url, reason } => {
                    slots.push(Slot::Done(AssetOutcome::Rejected { url, reason }));
                }
                PlannedAsset::Fetch { url, path } => {
                    // Blocks here while `concurrency` fetches are in flight.
                    let permit = self
                        .semaphore
                        .clone()
                        .acquire_owned()
                        .await
                        .map_err(|_| MirrorError::SemaphoreClosed)?;

                    let client = client.clone();
                    let task_url = url.clone();
                    let task_path = path.clone();
                    let handle = tokio::spawn(async move {
                        let _permit = permit;
                        fetch_asset(&client, task_url, task_path).await
                    });
                    slots.push(Slot::Running { url, path, handle });
                }
            }
        }

        let mut outcomes = Vec::with_capacity(slots.len());
        for slot in slots {
            match slot {
                Slot::Done(outcome) => outcomes.push(outcome),
                Slot::Running { url, path, handle } => match handle.await {
                    Ok(outcome) => outcomes.push(outcome),
                    Err(e) => {
                        warn!(url = %url, error = %e, "asset task panicked");
                        outcomes.push(AssetOutcome::FetchFailed {
                            url,
                            path,
                            status: None,
                            message: e.to_string(),
                        });
                    }
                },
            }
        }
        Ok(outcomes)
    }
}

/// Outcome placeholder kept in discovery order while fetches run.
enum Slot {
    Done(AssetOutcome),
    Running {
        url: Url,
        path: PathBuf,
        handle: JoinHandle<AssetOutcome>,
    },
}

/// Scans `body` and decides, per discovered reference, what happens to it.
///
/// - Unresolvable references go to [`AssetPlan::unresolved`]
/// - References resolving to the page itself or to an already planned URL
///   are dropped
/// - The rest become [`PlannedAsset::Fetch`] or [`PlannedAsset::Skip`]
#[must_use]
pub fn plan_assets(
    body: &[u8],
    page_url: &Url,
    rules: &FilterRules,
    output_dir: &Path,
) -> AssetPlan {
    let document = HtmlDocument::parse(body);

    let mut page = page_url.clone();
    page.set_fragment(None);

    let mut seen_urls = HashSet::from([page.clone()]);
    let mut claimed_paths = PathClaims::default();
    claimed_paths.claim(&mirror_path(output_dir, &page));
    let mut plan = AssetPlan::default();

    for reference in document.references() {
        let mut lifecycle = Lifecycle::discovered(reference.value.as_str());

        let url = match resolve_reference(&page, &reference.value) {
            Ok(url) => url,
            Err(error) => {
                warn!(
                    tag = %reference.tag,
                    attribute = %reference.attribute,
                    error = %error,
                    "skipping unresolvable reference"
                );
                plan.unresolved.push(UnresolvedReference { reference, error });
                continue;
            }
        };
        lifecycle.advance(ResourceState::Resolved);

        if !seen_urls.insert(url.clone()) {
            debug!(url = %url, "duplicate reference");
            continue;
        }

        match rules.evaluate(url.as_str()) {
            FilterDecision::Reject(reason) => {
                lifecycle.advance(ResourceState::Rejected);
                info!(url = %url, reason = %reason, "asset rejected");
                plan.assets.push(PlannedAsset::Skip {
                    url,
                    reason: SkipReason::Filtered(reason),
                });
            }
            FilterDecision::Accept => {
                let path = mirror_path(output_dir, &url);
                if claimed_paths.claim(&path) {
                    lifecycle.advance(ResourceState::Accepted);
                    plan.assets.push(PlannedAsset::Fetch { url, path });
                } else {
                    lifecycle.advance(ResourceState::Rejected);
                    warn!(
                        url = %url,
                        path = %path.display(),
                        "path conflicts with an earlier resource"
                    );
                    plan.assets.push(PlannedAsset::Skip {
                        url,
                        reason: SkipReason::PathTaken(path),
                    });
                }
            }
        }
    }

    plan
}

/// Local paths handed out during planning, in discovery order.
///
/// A path conflicts with a claim when the two are equal or one is an
/// ancestor of the other: the ancestor would have to be a file and a
/// directory at once. Each claim also covers the `.part` sibling the body
/// is streamed into.
#[derive(Debug, Default)]
struct PathClaims(Vec<PathBuf>);

impl PathClaims {
    fn claim(&mut self, path: &Path) -> bool {
        let wanted = [path.to_path_buf(), partial_path(path)];
        let conflicts = wanted.iter().any(|candidate| {
            self.0
                .iter()
                .any(|claimed| claimed.starts_with(candidate) || candidate.starts_with(claimed))
        });
        if conflicts {
            return false;
        }
        self.0.extend(wanted);
        true
    }
}

#[instrument(skip(client, path), fields(url = %url))]
async fn fetch_asset(client: &HttpClient, url: Url, path: PathBuf) -> AssetOutcome {
    let mut lifecycle = Lifecycle::accepted(url.as_str());
    lifecycle.advance(ResourceState::Fetching);

    let result = match client.fetch(&url).await {
        Ok(fetched) => fetched.save_to(&path).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(bytes) => {
            lifecycle.advance(ResourceState::Saved);
            info!(path = %path.display(), bytes, "asset saved");
            AssetOutcome::Saved { url, path, bytes }
        }
        Err(error) => {
            lifecycle.advance(ResourceState::FetchFailed);
            warn!(error = %error, "asset download failed");
            AssetOutcome::FetchFailed {
                url,
                path,
                status: error.status(),
                message: error.to_string(),
            }
        }
    }
}
