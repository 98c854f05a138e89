//! HTTP client wrapper for fetching resources.
//!
//! [`HttpClient::fetch`] performs one GET and hands back a [`FetchResult`]
//! whose body has not been read yet. The body is consumed exactly once, by
//! [`FetchResult::save_to`] or [`FetchResult::save_and_read`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use tokio::fs::File;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, info, instrument};
use url::Url;

use super::constants::{CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS};
use super::error::DownloadError;
use super::local_path::{ensure_parent_dir, partial_path, single_file_path};
use crate::user_agent;

/// HTTP client for fetching pages and assets.
///
/// Create once and reuse; clones share the underlying connection pool.
///
/// # Example
///
/// ```no_run
/// use sitegrab_core::download::HttpClient;
/// use std::path::Path;
/// use url::Url;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = HttpClient::new();
/// let url = Url::parse("https://example.com/file.pdf")?;
/// let saved = client.download_to_file(&url, Path::new("./downloads")).await?;
/// println!("Downloaded to: {}", saved.path.display());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
}

/// A successful (2xx) response whose body has not been consumed yet.
#[derive(Debug)]
pub struct FetchResult {
    url: Url,
    status: u16,
    content_type: Option<String>,
    content_length: Option<u64>,
    response: reqwest::Response,
}

/// Outcome of a single-file download.
#[derive(Debug, Clone)]
pub struct DownloadFileResult {
    /// Final output path.
    pub path: PathBuf,
    /// Bytes written to disk.
    pub bytes_downloaded: u64,
    /// Size announced by the server, when known.
    pub content_length: Option<u64>,
    /// HTTP status of the response.
    pub status: u16,
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient {
    /// Creates a new HTTP client with default timeouts.
    ///
    /// Default configuration:
    /// - Connect timeout: 30 seconds
    /// - Request timeout: 5 minutes
    /// - Gzip decompression: enabled
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails to build with the static
    /// configuration. This should never happen in practice.
    #[must_use]
    pub fn new() -> Self {
        Self::new_with_timeouts(CONNECT_TIMEOUT_SECS, READ_TIMEOUT_SECS)
    }

    /// Creates a new HTTP client with explicit timeout values.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails to build with the supplied
    /// timeout configuration.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new_with_timeouts(connect_timeout_secs: u64, read_timeout_secs: u64) -> Self {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(connect_timeout_secs))
            .timeout(Duration::from_secs(read_timeout_secs))
            .gzip(true)
            .user_agent(user_agent::default_user_agent())
            .build()
            .expect("failed to build HTTP client with static configuration");
        Self { client }
    }

    /// Issues a GET for `url`.
    ///
    /// # Errors
    ///
    /// Returns `DownloadError` if:
    /// - The URL is not http(s)
    /// - The request fails (network error, timeout)
    /// - The server answers with a non-2xx status
    #[instrument(skip(self), fields(url = %url))]
    pub async fn fetch(&self, url: &Url) -> Result<FetchResult, DownloadError> {
        if !matches!(url.scheme(), "http" | "https") {
            return Err(DownloadError::invalid_url(url.as_str()));
        }

        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| map_transport_error(url.as_str(), e))?;

        let status = response.status();
        debug!(status = status.as_u16(), "response received");
        if !status.is_success() {
            return Err(DownloadError::http_status(url.as_str(), status.as_u16()));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        Ok(FetchResult {
            url: url.clone(),
            status: status.as_u16(),
            content_type,
            content_length: response.content_length(),
            response,
        })
    }

    /// Downloads `url` into `output_dir` under its final path segment.
    ///
    /// Nothing is written when the server answers with a non-2xx status.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`fetch`](Self::fetch), plus
    /// [`DownloadError::Io`] when the file cannot be written.
    #[must_use = "download result contains the path to the downloaded file"]
    #[instrument(skip(self), fields(url = %url))]
    pub async fn download_to_file(
        &self,
        url: &Url,
        output_dir: &Path,
    ) -> Result<DownloadFileResult, DownloadError> {
        let fetched = self.fetch(url).await?;
        let path = single_file_path(output_dir, url, fetched.content_type());
        let status = fetched.status();
        let content_length = fetched.content_length();

        let bytes_downloaded = fetched.save_to(&path).await?;
        info!(path = %path.display(), bytes = bytes_downloaded, "download complete");

        Ok(DownloadFileResult {
            path,
            bytes_downloaded,
            content_length,
            status,
        })
    }
}

impl FetchResult {
    /// URL the request was made for.
    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// HTTP status code (always 2xx).
    #[must_use]
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Raw Content-Type header value.
    #[must_use]
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Content-Length announced by the server.
    #[must_use]
    pub fn content_length(&self) -> Option<u64> {
        self.content_length
    }

    /// True when the body should be scanned as HTML: an HTML media type, or
    /// no Content-Type at all.
    #[must_use]
    pub fn looks_like_html(&self) -> bool {
        self.content_type.as_deref().is_none_or(is_html_content_type)
    }

    /// Streams the body to `path`, creating parent directories first.
    ///
    /// The body goes to a `.part` sibling first and replaces `path` only once
    /// it is complete, so a failed transfer leaves any previous copy in place
    /// and no partial file behind.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadError::Io`] for filesystem failures and
    /// [`DownloadError::Network`]/[`DownloadError::Timeout`] if the body
    /// cannot be read.
    pub async fn save_to(self, path: &Path) -> Result<u64, DownloadError> {
        self.write_body(path, None).await
    }

    /// Streams the body to `path` and also returns it in memory.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`save_to`](Self::save_to).
    pub async fn save_and_read(self, path: &Path) -> Result<Vec<u8>, DownloadError> {
        let mut body = Vec::with_capacity(
            self.content_length
                .and_then(|n| usize::try_from(n).ok())
                .unwrap_or(0),
        );
        self.write_body(path, Some(&mut body)).await?;
        Ok(body)
    }

    async fn write_body(
        self,
        path: &Path,
        capture: Option<&mut Vec<u8>>,
    ) -> Result<u64, DownloadError> {
        ensure_parent_dir(path).await?;

        // The previous copy at `path` stays untouched until the new body is complete.
        let partial = partial_path(path);
        let mut file = File::create(&partial)
            .await
            .map_err(|e| DownloadError::io(&partial, e))?;

        let result =
            stream_to_file(&mut file, self.response, self.url.as_str(), &partial, capture).await;
        drop(file);

        let finished = match result {
            Ok(bytes) => tokio::fs::rename(&partial, path)
                .await
                .map(|()| bytes)
                .map_err(|e| DownloadError::io(path, e)),
            Err(e) => Err(e),
        };
        if finished.is_err() {
            debug!(path = %partial.display(), "cleaning up partial file after error");
            let _ = tokio::fs::remove_file(&partial).await;
        }
        finished
    }
}

/// Streams response body to file, returning bytes written.
///
/// This is extracted to enable cleanup on error in the caller.
async fn stream_to_file(
    file: &mut File,
    response: reqwest::Response,
    url: &str,
    file_path: &Path,
    mut capture: Option<&mut Vec<u8>>,
) -> Result<u64, DownloadError> {
    let mut writer = BufWriter::new(file);
    let mut stream = response.bytes_stream();
    let mut bytes_written: u64 = 0;

    while let Some(chunk_result) = stream.next().await {
        let chunk = chunk_result.map_err(|e| map_transport_error(url, e))?;

        writer
            .write_all(&chunk)
            .await
            .map_err(|e| DownloadError::io(file_path, e))?;
        if let Some(buffer) = capture.as_deref_mut() {
            buffer.extend_from_slice(&chunk);
        }

        bytes_written += chunk.len() as u64;
    }

    // Ensure all data is flushed to disk
    writer
        .flush()
        .await
        .map_err(|e| DownloadError::io(file_path, e))?;

    Ok(bytes_written)
}

fn map_transport_error(url: &str, error: reqwest::Error) -> DownloadError {
    if error.is_timeout() {
        DownloadError::timeout(url)
    } else {
        DownloadError::network(url, error)
    }
}

fn is_html_content_type(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();
    matches!(mime.as_str(), "text/html" | "application/xhtml+xml")
}
