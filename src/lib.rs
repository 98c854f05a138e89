//! Sitegrab Core Library
//!
//! Fetches a web page over HTTP(S) and, in mirror mode, the static assets it
//! references, writing everything into a local folder that mirrors the URL
//! paths.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//! - [`download`] - HTTP client, streaming writes, URL-to-path mapping
//! - [`parser`] - `href`/`src` discovery in HTML and reference resolution
//! - [`filter`] - reject-suffix and exclude-prefix rules
//! - [`mirror`] - page + asset orchestration with bounded concurrency
//! - [`clock`] - injectable time source for start/finish timestamps
//! - [`app`] - one validated invocation, as driven by the binary

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod app;
pub mod clock;
pub mod download;
pub mod filter;
pub mod mirror;
pub mod parser;
mod user_agent;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used types
pub use app::{ConfigError, RunConfig, RunError, RunSummary, run};
pub use clock::{Clock, FixedClock, SystemClock};
pub use download::{DownloadError, HttpClient};
pub use filter::{FilterDecision, FilterRules};
pub use mirror::{
    AssetOutcome, DEFAULT_CONCURRENCY, MAX_CONCURRENCY, MIN_CONCURRENCY, MirrorEngine,
    MirrorError, MirrorReport, ResourceState,
};
pub use parser::{HtmlDocument, ParseError, resolve_reference};
