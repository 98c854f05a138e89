//! Reject/exclude rules applied to discovered asset URLs.
//!
//! A reject rule is a suffix, an exclude rule is a prefix; both are matched
//! against the full absolute URL string. Reject rules are checked first and
//! the first matching rule wins. A URL that matches nothing is accepted.

use std::fmt;

/// Why a URL was turned away.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// URL ends with this reject suffix.
    Suffix(String),
    /// URL starts with this exclude prefix.
    Prefix(String),
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Suffix(rule) => write!(f, "matches reject suffix '{rule}'"),
            Self::Prefix(rule) => write!(f, "matches exclude prefix '{rule}'"),
        }
    }
}

/// Result of evaluating a URL against the rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterDecision {
    /// No rule matched.
    Accept,
    /// A rule matched.
    Reject(RejectReason),
}

impl FilterDecision {
    /// True for [`FilterDecision::Accept`].
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accept)
    }
}

/// Immutable rule set built once at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterRules {
    reject_suffixes: Vec<String>,
    exclude_prefixes: Vec<String>,
}

impl FilterRules {
    /// Builds rules from already-split lists. Empty entries are discarded.
    #[must_use]
    pub fn new<R, E>(reject_suffixes: R, exclude_prefixes: E) -> Self
    where
        R: IntoIterator,
        R::Item: Into<String>,
        E: IntoIterator,
        E::Item: Into<String>,
    {
        Self {
            reject_suffixes: keep_non_empty(reject_suffixes),
            exclude_prefixes: keep_non_empty(exclude_prefixes),
        }
    }

    /// Builds rules from the raw comma-separated flag values.
    ///
    /// An absent or empty flag means "no rules", never "one empty rule".
    #[must_use]
    pub fn from_lists(reject: Option<&str>, exclude: Option<&str>) -> Self {
        Self {
            reject_suffixes: reject.map(parse_rule_list).unwrap_or_default(),
            exclude_prefixes: exclude.map(parse_rule_list).unwrap_or_default(),
        }
    }

    /// Reject suffixes, in evaluation order.
    #[must_use]
    pub fn reject_suffixes(&self) -> &[String] {
        &self.reject_suffixes
    }

    /// Exclude prefixes, in evaluation order.
    #[must_use]
    pub fn exclude_prefixes(&self) -> &[String] {
        &self.exclude_prefixes
    }

    /// True when no rule is configured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.reject_suffixes.is_empty() && self.exclude_prefixes.is_empty()
    }

    /// Evaluates `url` against the rules.
    #[must_use]
    pub fn evaluate(&self, url: &str) -> FilterDecision {
        if let Some(rule) = self.reject_suffixes.iter().find(|r| url.ends_with(r.as_str())) {
            return FilterDecision::Reject(RejectReason::Suffix(rule.clone()));
        }
        if let Some(rule) = self
            .exclude_prefixes
            .iter()
            .find(|r| url.starts_with(r.as_str()))
        {
            return FilterDecision::Reject(RejectReason::Prefix(rule.clone()));
        }
        FilterDecision::Accept
    }
}

/// Splits a comma-separated flag value into rules.
///
/// Entries are trimmed; empty entries (including the one produced by an
/// empty input) are dropped.
///
/// ```
/// use sitegrab_core::filter::parse_rule_list;
///
/// assert_eq!(parse_rule_list(".png, .gif,,"), vec![".png", ".gif"]);
/// assert!(parse_rule_list("").is_empty());
/// ```
#[must_use]
pub fn parse_rule_list(raw: &str) -> Vec<String> {
    keep_non_empty(raw.split(',').map(str::trim))
}

fn keep_non_empty<I>(items: I) -> Vec<String>
where
    I: IntoIterator,
    I::Item: Into<String>,
{
    items
        .into_iter()
        .map(Into::into)
        .filter(|s: &String| !s.is_empty())
        .collect()
}
