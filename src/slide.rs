//! Slide lifecycle: commit, mount pass, update, unmount.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::markdown::MarkdownRenderer;
use crate::mount::{DiagramMountController, MountReport};
use crate::types::{SharedSurface, SlideDocument, SlideSurface};

/// A mounted slide: one document plus its committed surface.
///
/// Mounting renders the document's markdown into a fresh surface and runs
/// the diagram mount pass over it. Updates re-render only when the markdown
/// source actually changed (tracked by content hash), so a title-only edit
/// never re-renders. Unmounting drops the surface; render results still in
/// flight then land nowhere.
pub struct Slide {
    document: SlideDocument,
    renderer: MarkdownRenderer,
    surface: Option<SharedSurface>,
    committed_hash: Option<u64>,
}

impl Slide {
    /// Creates an unmounted slide with the default theme.
    pub fn new(document: SlideDocument) -> Self {
        Self::with_renderer(document, MarkdownRenderer::default())
    }

    /// Creates an unmounted slide rendering with the given renderer.
    pub fn with_renderer(document: SlideDocument, renderer: MarkdownRenderer) -> Self {
        Self {
            document,
            renderer,
            surface: None,
            committed_hash: None,
        }
    }

    /// The slide's current document.
    pub fn document(&self) -> &SlideDocument {
        &self.document
    }

    /// Whether the slide currently exposes a committed surface.
    pub fn is_mounted(&self) -> bool {
        self.surface.is_some()
    }

    /// A handle to the committed surface for the shell's display layer.
    pub fn surface(&self) -> Option<SharedSurface> {
        self.surface.clone()
    }

    /// Renders the document and runs the diagram mount pass.
    ///
    /// Always commits a fresh surface; mounting an already-mounted slide
    /// re-commits, and patches addressed to the replaced surface become
    /// stale no-ops.
    pub async fn mount(&mut self) -> MountReport {
        let blocks = self.renderer.render(&self.document.markdown_source);
        let surface: SharedSurface = Arc::new(Mutex::new(SlideSurface::new(blocks)));
        let weak = Arc::downgrade(&surface);
        self.surface = Some(surface);
        self.committed_hash = Some(content_hash(&self.document.markdown_source));
        DiagramMountController::mount_pass(weak).await
    }

    /// Replaces the document, re-rendering only if the markdown changed.
    ///
    /// Returns `None` when the slide is unmounted or the markdown source
    /// hashes the same as the committed one; the stored document is updated
    /// either way.
    pub async fn update(&mut self, document: SlideDocument) -> Option<MountReport> {
        let unchanged = self.committed_hash == Some(content_hash(&document.markdown_source));
        self.document = document;
        if !self.is_mounted() || unchanged {
            return None;
        }
        Some(self.mount().await)
    }

    /// Drops the committed surface.
    ///
    /// In-flight renders for this surface resolve nowhere; their patches
    /// are silently discarded.
    pub fn unmount(&mut self) {
        self.surface = None;
        self.committed_hash = None;
    }
}

fn content_hash(source: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    source.hash(&mut hasher);
    hasher.finish()
}
