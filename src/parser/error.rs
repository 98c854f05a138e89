//! Error types for reference resolution.

use thiserror::Error;

/// Maximum reference length to accept (standard browser limit).
pub const MAX_URL_LENGTH: usize = 2000;

/// Why a discovered reference could not become a fetchable URL.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The reference cannot be joined against the base URL.
    #[error("invalid reference '{reference}': {reason}")]
    InvalidReference {
        /// The raw attribute value.
        reference: String,
        /// Why resolution failed.
        reason: String,
    },

    /// The reference resolves to something other than http(s).
    #[error("unsupported scheme '{scheme}' in reference '{reference}'")]
    UnsupportedScheme {
        /// The raw attribute value.
        reference: String,
        /// The scheme it resolved to.
        scheme: String,
    },
}

impl ParseError {
    /// Creates an `InvalidReference` error.
    #[must_use]
    pub fn invalid(reference: &str, reason: impl Into<String>) -> Self {
        Self::InvalidReference {
            reference: preview(reference),
            reason: reason.into(),
        }
    }

    /// Creates an `UnsupportedScheme` error.
    #[must_use]
    pub fn unsupported_scheme(reference: &str, scheme: &str) -> Self {
        Self::UnsupportedScheme {
            reference: preview(reference),
            scheme: scheme.to_string(),
        }
    }
}

// `data:` URIs can be megabytes long; keep log lines readable.
fn preview(reference: &str) -> String {
    const PREVIEW_CHARS: usize = 80;
    if reference.chars().count() > PREVIEW_CHARS {
        let head: String = reference.chars().take(PREVIEW_CHARS).collect();
        format!("{head}...")
    } else {
        reference.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_reference_display() {
        let err = ParseError::invalid("http://[::1", "invalid IPv6 address");
        let msg = err.to_string();
        assert!(msg.contains("http://[::1"), "Expected reference in: {msg}");
        assert!(msg.contains("IPv6"), "Expected reason in: {msg}");
    }

    #[test]
    fn test_unsupported_scheme_display() {
        let err = ParseError::unsupported_scheme("mailto:me@example.test", "mailto");
        assert!(err.to_string().contains("'mailto'"));
    }

    #[test]
    fn test_long_reference_is_truncated() {
        let long = format!("data:image/png;base64,{}", "A".repeat(500));
        let err = ParseError::unsupported_scheme(&long, "data");
        let ParseError::UnsupportedScheme { reference, .. } = err else {
            panic!("Expected UnsupportedScheme");
        };
        assert!(reference.ends_with("..."));
        assert_eq!(reference.chars().count(), 83);
    }
}
