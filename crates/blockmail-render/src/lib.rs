//! # Blockmail Render
//!
//! Pure projections of a block document. Nothing here holds state: every
//! function takes the document (or its blocks) and builds a fresh value,
//! so the output always matches the document it was given.
//!
//! - [`surface`]: the editable canvas, one card per block
//! - [`panel`]: the property panel for the selected block
//! - [`export`]: a standalone, inline-styled HTML email
//!
//! ## Learning: Exhaustive Matches as a Checklist
//!
//! Each projection matches on `BlockContent` without a wildcard arm. When a
//! block kind is added to the core, this crate stops compiling until every
//! projection knows how to show it.

pub mod export;
pub mod panel;
pub mod surface;

pub use export::HtmlExporter;
pub use panel::{Control, ControlKind, Panel, settings_for};
pub use surface::{BlockCard, BlockView, Surface, project};

/// Escapes text for use between tags.
pub(crate) fn text(value: &str) -> String {
    html_escape::encode_text(value).into_owned()
}

/// Escapes text for use inside a double-quoted attribute.
pub(crate) fn attr(value: &str) -> String {
    html_escape::encode_double_quoted_attribute(value).into_owned()
}

/// Resolves a text block's body: rich HTML when flagged and present,
/// otherwise the escaped plain text.
pub(crate) fn resolved_text(content: &blockmail_core::TextContent) -> String {
    match content.rich_html() {
        Some(html) => html.to_string(),
        None => text(&content.text),
    }
}

/// Returns `value`, or `fallback` when it is empty.
pub(crate) fn or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.is_empty() { fallback } else { value }
}
