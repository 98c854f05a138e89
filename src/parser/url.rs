//! Resolution of raw references into absolute, fetchable URLs.

use tracing::trace;
use url::Url;

use super::error::{MAX_URL_LENGTH, ParseError};

/// Resolves `reference` against `base` using standard relative-URL rules.
///
/// Handles absolute, scheme-relative (`//host/x`), path-absolute (`/x`),
/// path-relative (`x`, `../x`), query-only (`?q`) and fragment-only (`#f`)
/// references. The fragment is dropped from the result since it never
/// reaches the server.
///
/// # Errors
///
/// - [`ParseError::InvalidReference`] if the reference cannot be joined, has
///   no host, or is longer than [`MAX_URL_LENGTH`]
/// - [`ParseError::UnsupportedScheme`] for anything other than http(s),
///   e.g. `mailto:`, `javascript:` or `data:`
///
/// # Examples
///
/// ```
/// use sitegrab_core::parser::resolve_reference;
/// use url::Url;
///
/// let base = Url::parse("http://example.test/docs/page.html").unwrap();
/// let resolved = resolve_reference(&base, "../app.js").unwrap();
/// assert_eq!(resolved.as_str(), "http://example.test/app.js");
/// ```
pub fn resolve_reference(base: &Url, reference: &str) -> Result<Url, ParseError> {
    let mut resolved = base
        .join(reference.trim())
        .map_err(|e| ParseError::invalid(reference, e.to_string()))?;

    match resolved.scheme() {
        "http" | "https" => {}
        scheme => return Err(ParseError::unsupported_scheme(reference, scheme)),
    }

    if resolved.host().is_none() {
        return Err(ParseError::invalid(reference, "URL has no host"));
    }

    resolved.set_fragment(None);

    if resolved.as_str().len() > MAX_URL_LENGTH {
        return Err(ParseError::invalid(
            reference,
            format!("resolved URL exceeds {MAX_URL_LENGTH} characters"),
        ));
    }

    trace!(reference = %reference, resolved = %resolved, "reference resolved");
    Ok(resolved)
}
