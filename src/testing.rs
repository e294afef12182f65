//! Shared test helpers for pipeline unit tests.
//!
//! This module is gated with `#[cfg(test)]` and provides canonical factory
//! functions used across the per-module test suites. Import with:
//!
//! ```ignore
//! use crate::testing::{code_text, make_document, test_theme};
//! ```

use std::sync::Arc;

use parking_lot::Mutex;

use crate::theme::SlideTheme;
use crate::types::{SharedSurface, SlideBlock, SlideDocument, SlideSurface, StyledLine};

/// Returns the theme used by rendering unit tests.
#[allow(dead_code)]
pub fn test_theme() -> SlideTheme {
    SlideTheme::default()
}

/// Wraps blocks into a freshly committed shared surface.
#[allow(dead_code)]
pub fn shared_surface(blocks: Vec<SlideBlock>) -> SharedSurface {
    Arc::new(Mutex::new(SlideSurface::new(blocks)))
}

/// Builds a slide document with a derived title.
#[allow(dead_code)]
pub fn make_document(id: &str, markdown_source: &str) -> SlideDocument {
    SlideDocument::new(id, format!("slide {id}"), markdown_source)
}

/// Joins the text of styled lines with newlines, styling discarded.
#[allow(dead_code)]
pub fn block_text(lines: &[StyledLine]) -> String {
    lines
        .iter()
        .map(StyledLine::text)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Joins the code content of a rendered code block, skipping the gutter
/// segment on each line.
#[allow(dead_code)]
pub fn code_text(block: &SlideBlock) -> String {
    let SlideBlock::Code { lines, .. } = block else {
        panic!("expected code block, got {block:?}");
    };
    lines
        .iter()
        .map(|line| {
            line.segments[1..]
                .iter()
                .map(|s| s.text.as_str())
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}
