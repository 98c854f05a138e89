//! Discovery of `href`/`src` references in an HTML document.
//!
//! The document is parsed into a tree once (html5ever via `scraper`, which
//! recovers from malformed markup the way browsers do) and then walked
//! depth-first in document order with an explicit stack. Every element is
//! visited; its `href` and `src` attributes are reported regardless of the
//! tag name.

use std::fmt;

use scraper::{ElementRef, Html};
use tracing::debug;

/// Attribute that carried a reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceAttribute {
    /// `href` (anchors, `<link>`, `<area>`, ...).
    Href,
    /// `src` (`<script>`, `<img>`, `<iframe>`, ...).
    Src,
}

/// Attributes inspected on every element, in reporting order.
pub const REFERENCE_ATTRIBUTES: [ReferenceAttribute; 2] =
    [ReferenceAttribute::Href, ReferenceAttribute::Src];

impl ReferenceAttribute {
    /// Attribute name as it appears in markup.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Href => "href",
            Self::Src => "src",
        }
    }
}

impl fmt::Display for ReferenceAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A raw link found in the document, not yet resolved against any base.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceReference {
    /// Lowercase name of the owning element (`script`, `link`, `a`, ...).
    pub tag: String,
    /// Attribute the value came from.
    pub attribute: ReferenceAttribute,
    /// Attribute value exactly as written.
    pub value: String,
}

/// A parsed HTML document ready to be scanned.
#[derive(Debug)]
pub struct HtmlDocument {
    html: Html,
}

impl HtmlDocument {
    /// Parses `bytes` as HTML.
    ///
    /// Never fails: invalid UTF-8 is replaced and markup errors are recovered
    /// from, so unparseable fragments simply yield no references.
    #[must_use]
    pub fn parse(bytes: &[u8]) -> Self {
        let text = String::from_utf8_lossy(bytes);
        let html = Html::parse_document(&text);
        if !html.errors.is_empty() {
            debug!(errors = html.errors.len(), "HTML parsed with recoverable errors");
        }
        Self { html }
    }

    /// Lazily yields every reference in document order.
    ///
    /// The walk can be restarted by calling this again; the document stays
    /// in memory.
    #[must_use]
    pub fn references(&self) -> References<'_> {
        References {
            stack: vec![self.html.root_element()],
            current: None,
        }
    }
}

/// Iterator returned by [`HtmlDocument::references`].
#[derive(Debug)]
pub struct References<'a> {
    stack: Vec<ElementRef<'a>>,
    /// Element being reported on and the next attribute index to inspect.
    current: Option<(ElementRef<'a>, usize)>,
}

impl Iterator for References<'_> {
    type Item = ResourceReference;

    fn next(&mut self) -> Option<ResourceReference> {
        loop {
            if let Some((element, start)) = self.current.take() {
                for (index, attribute) in REFERENCE_ATTRIBUTES.iter().enumerate().skip(start) {
                    if let Some(value) = element.value().attr(attribute.as_str()) {
                        self.current = Some((element, index + 1));
                        return Some(ResourceReference {
                            tag: element.value().name().to_string(),
                            attribute: *attribute,
                            value: value.to_string(),
                        });
                    }
                }
            }

            let element = self.stack.pop()?;
            // Reversed so the first child is popped next.
            self.stack
                .extend(element.children().rev().filter_map(ElementRef::wrap));
            self.current = Some((element, 0));
        }
    }
}
