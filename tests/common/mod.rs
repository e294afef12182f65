//! Shared integration test helpers for slidedown.
//!
//! # Usage
//!
//! Include this module at the top of each test file that needs it:
//!
//! ```ignore
//! mod common;
//! use common::document;
//! ```
//!
//! Note: Rust integration tests use `mod common;` (not `use`) to bring in
//! helpers from `tests/common/mod.rs`. The `#[allow(dead_code)]` attribute
//! suppresses warnings when only a subset of helpers are used per file.

#![allow(dead_code)]

use slidedown::{DiagramState, SharedSurface, SlideDocument};

/// Builds a slide document with a derived title.
pub fn document(id: &str, markdown: &str) -> SlideDocument {
    SlideDocument::new(id, format!("slide {id}"), markdown)
}

/// Collects a clone of every diagram slot state on the surface.
pub fn diagram_states(surface: &SharedSurface) -> Vec<DiagramState> {
    surface
        .lock()
        .diagram_states()
        .into_iter()
        .cloned()
        .collect()
}
