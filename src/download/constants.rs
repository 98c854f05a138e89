//! Constants for the download module.

/// Default HTTP connect timeout (30 seconds).
pub const CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default HTTP request timeout (5 minutes for large files).
pub const READ_TIMEOUT_SECS: u64 = 300;

/// Suffix of the sibling file a body is streamed into before it replaces
/// the final path.
pub const PARTIAL_SUFFIX: &str = ".part";
