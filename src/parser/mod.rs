//! HTML reference discovery and URL resolution.
//!
//! - [`html`] walks a parsed document and yields raw `href`/`src` values
//! - [`url`] turns a raw value into an absolute http(s) URL

mod error;
pub mod html;
pub mod url;

pub use error::{MAX_URL_LENGTH, ParseError};
pub use html::{
    HtmlDocument, REFERENCE_ATTRIBUTES, ReferenceAttribute, References, ResourceReference,
};
pub use self::url::resolve_reference;
