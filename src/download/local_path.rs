//! Mapping of resource URLs onto local file paths.
//!
//! Mirrored resources keep the URL's path hierarchy under the output folder.
//! Every segment is percent-decoded and then sanitized, so a URL can never
//! produce a path outside the output folder: dot segments, separators and
//! drive prefixes are rewritten before they reach the filesystem.

use std::borrow::Cow;
use std::path::{Component, Path, PathBuf};

use tracing::debug;
use url::Url;

use super::constants::PARTIAL_SUFFIX;
use super::error::DownloadError;

/// Placeholder file name used when a URL path ends in `/`.
pub const INDEX_FILENAME: &str = "index.html";

/// Computes the mirrored location of `url` under `root`.
///
/// `https://cdn.test/css/site.css` maps to `<root>/css/site.css`. The host is
/// not part of the path, and query strings and fragments are ignored.
#[must_use]
pub fn mirror_path(root: &Path, url: &Url) -> PathBuf {
    let segments: Vec<&str> = url
        .path_segments()
        .map(Iterator::collect)
        .unwrap_or_default();

    let mut path = root.to_path_buf();
    let Some((last, dirs)) = segments.split_last() else {
        path.push(INDEX_FILENAME);
        return path;
    };

    for segment in dirs {
        let decoded = decode_segment(segment);
        if decoded.is_empty() {
            continue;
        }
        path.push(sanitize_segment(&decoded));
    }

    if last.is_empty() {
        path.push(INDEX_FILENAME);
    } else {
        path.push(sanitize_segment(&decode_segment(last)));
    }
    path
}

/// Computes the flat save location for a single-file download.
///
/// Uses the final path segment; when the URL has none, the name is `index`
/// plus an extension guessed from the response Content-Type.
#[must_use]
pub fn single_file_path(root: &Path, url: &Url, content_type: Option<&str>) -> PathBuf {
    if let Some(mut segments) = url.path_segments()
        && let Some(last) = segments.next_back()
        && !last.is_empty()
    {
        return root.join(sanitize_segment(&decode_segment(last)));
    }

    let extension = content_type.map_or(".html", extension_from_content_type);
    root.join(format!("index{extension}"))
}

/// Creates every missing directory above `path`.
///
/// Safe to call concurrently for the same directory.
///
/// # Errors
///
/// Returns [`DownloadError::Io`] if a directory cannot be created.
pub async fn ensure_parent_dir(path: &Path) -> Result<(), DownloadError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| DownloadError::io(parent, e))?;
    }
    Ok(())
}

/// Sibling path a body is streamed into before it replaces `path`
/// (`site/app.js` becomes `site/app.js.part`).
#[must_use]
pub fn partial_path(path: &Path) -> PathBuf {
    let mut partial = path.as_os_str().to_owned();
    partial.push(PARTIAL_SUFFIX);
    PathBuf::from(partial)
}

/// Sanitizes one path segment for filesystem safety.
///
/// Replaces characters that are invalid on common filesystems
/// (`/ \ : * ? " < > |` and control characters). A segment that would still
/// act as `.`, `..`, a root or a drive prefix has its dots rewritten.
#[must_use]
pub fn sanitize_segment(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    if sanitized.is_empty() {
        return "_".to_string();
    }

    if is_safe_segment(&sanitized) {
        sanitized
    } else {
        sanitized
            .chars()
            .map(|c| if c == '.' { '_' } else { c })
            .collect()
    }
}

/// Guess file extension from Content-Type header.
#[must_use]
pub fn extension_from_content_type(content_type: &str) -> &'static str {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_lowercase();

    match mime.as_str() {
        "text/html" | "application/xhtml+xml" => ".html",
        "text/plain" => ".txt",
        "application/json" => ".json",
        "application/xml" | "text/xml" => ".xml",
        "application/pdf" => ".pdf",
        "image/jpeg" => ".jpg",
        "image/png" => ".png",
        "image/gif" => ".gif",
        "image/svg+xml" => ".svg",
        "image/webp" => ".webp",
        "image/x-icon" | "image/vnd.microsoft.icon" => ".ico",
        "font/woff" => ".woff",
        "font/woff2" => ".woff2",
        "application/zip" => ".zip",
        "application/gzip" => ".gz",
        "text/css" => ".css",
        "text/javascript" | "application/javascript" => ".js",
        "video/mp4" => ".mp4",
        "audio/mpeg" => ".mp3",
        _ => ".bin",
    }
}

fn decode_segment(segment: &str) -> Cow<'_, str> {
    urlencoding::decode(segment).unwrap_or_else(|e| {
        debug!(segment = %segment, error = %e, "URL decoding failed, using raw segment");
        Cow::Borrowed(segment)
    })
}

fn is_safe_segment(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}
