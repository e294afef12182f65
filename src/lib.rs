//! Markdown-to-slide rendering pipeline.
//!
//! Renders presentation slides authored in markdown, dispatching fenced code
//! blocks by declared language: ordinary source code is syntax-highlighted
//! with a line-number gutter, and diagram-tagged fences are rendered into
//! inline SVG after the slide's blocks are committed.
//!
//! Features:
//! - Event-fold markdown rendering (headings, lists, tables, quotes, task lists)
//! - Keyword-class syntax highlighting with line numbers
//! - Pure-Rust mermaid rendering with process-wide theme configuration
//! - Post-commit scan-and-patch diagram resolution with per-placeholder
//!   failure isolation and re-render idempotence
//! - SVG→PNG rasterization for shells that composite pixels
//!
//! # Architecture
//!
//! [`MarkdownRenderer`] folds the parsed event stream into [`SlideBlock`]s,
//! classifying each code fence with [`classify::classify`]. Diagram fences
//! become pending [`DiagramSlot`]s; once the blocks are committed to a shared
//! [`SlideSurface`], [`DiagramMountController::mount_pass`] renders each
//! pending slot through the process-wide [`DiagramEngine`] and patches it in
//! place, holding only a weak surface handle so late results land nowhere
//! after an unmount. [`Slide`] ties the lifecycle together: mount,
//! content-hash-guarded update, unmount.

pub mod classify;
pub mod engine;
pub mod highlight;
pub mod markdown;
pub mod mount;
pub mod slide;
pub mod svg;
pub mod theme;
pub mod types;

#[cfg(test)]
pub mod testing;

// Re-export main types for convenience
pub use classify::{BlockClass, DIAGRAM_TAG, classify, fence_language};
pub use engine::{DiagramEngine, DiagramError, EngineConfig};
pub use highlight::render_code_block;
pub use markdown::MarkdownRenderer;
pub use mount::{DiagramMountController, JobStatus, MountReport};
pub use slide::Slide;
pub use svg::svg_to_png_bytes;
pub use theme::SlideTheme;
pub use types::{
    ColumnAlignment, DiagramId, DiagramSlot, DiagramState, MarkupFragment, SharedSurface,
    SlideBlock, SlideDocument, SlideSurface, StyledLine, StyledSegment, TableBlock,
};
