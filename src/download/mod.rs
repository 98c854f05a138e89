//! HTTP fetching and writing of resources to disk.
//!
//! # Features
//!
//! - Streaming downloads (memory-efficient for large files)
//! - Configurable timeouts (30s connect, 5min request by default)
//! - Structured error types separating transport, status and filesystem failures
//! - URL-to-path mapping that cannot escape the output folder
//!
//! # Example
//!
//! ```no_run
//! use sitegrab_core::download::{HttpClient, mirror_path};
//! use std::path::Path;
//! use url::Url;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = HttpClient::new();
//! let url = Url::parse("https://example.com/assets/app.js")?;
//! let target = mirror_path(Path::new("./site"), &url);
//! let bytes = client.fetch(&url).await?.save_to(&target).await?;
//! println!("saved {bytes} bytes to {}", target.display());
//! # Ok(())
//! # }
//! ```

mod client;
mod constants;
mod error;
pub mod local_path;

pub use client::{DownloadFileResult, FetchResult, HttpClient};
pub use constants::{CONNECT_TIMEOUT_SECS, PARTIAL_SUFFIX, READ_TIMEOUT_SECS};
pub use error::DownloadError;
pub use local_path::{
    INDEX_FILENAME, ensure_parent_dir, mirror_path, partial_path, single_file_path,
};
