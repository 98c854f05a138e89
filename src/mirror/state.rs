//! Per-resource lifecycle during a mirror run.
//!
//! `Discovered → Resolved → (Accepted | Rejected) → Fetching → (Saved | FetchFailed)`
//!
//! `Rejected`, `Saved` and `FetchFailed` are terminal; nothing moves backwards.

use std::fmt;

use tracing::trace;

/// State of one discovered resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceState {
    /// Raw reference found in the page.
    Discovered,
    /// Reference resolved to an absolute URL.
    Resolved,
    /// Passed the filter rules; will be fetched.
    Accepted,
    /// Turned away by a filter rule or a path collision.
    Rejected,
    /// Request in flight.
    Fetching,
    /// Written to disk.
    Saved,
    /// Fetch or write failed.
    FetchFailed,
}

impl ResourceState {
    /// Returns the lowercase name used in logs.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Discovered => "discovered",
            Self::Resolved => "resolved",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::Fetching => "fetching",
            Self::Saved => "saved",
            Self::FetchFailed => "fetch_failed",
        }
    }

    /// True for states with no outgoing transition.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Rejected | Self::Saved | Self::FetchFailed)
    }

    /// Whether `next` directly follows `self`.
    #[must_use]
    pub fn can_transition_to(&self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Discovered, Self::Resolved)
                | (Self::Resolved, Self::Accepted | Self::Rejected)
                | (Self::Accepted, Self::Fetching)
                | (Self::Fetching, Self::Saved | Self::FetchFailed)
        )
    }
}

impl fmt::Display for ResourceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Walks one resource through the state machine, tracing each step.
#[derive(Debug)]
pub(crate) struct Lifecycle {
    url: String,
    state: ResourceState,
}

impl Lifecycle {
    pub(crate) fn discovered(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            state: ResourceState::Discovered,
        }
    }

    /// Resumes tracking for a resource planning already accepted.
    pub(crate) fn accepted(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            state: ResourceState::Accepted,
        }
    }

    #[cfg(test)]
    pub(crate) fn state(&self) -> ResourceState {
        self.state
    }

    pub(crate) fn advance(&mut self, next: ResourceState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal transition {} -> {next} for {}",
            self.state,
            self.url
        );
        trace!(url = %self.url, from = %self.state, to = %next, "resource state");
        self.state = next;
    }
}
