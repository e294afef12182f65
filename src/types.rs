//! Core data types for the slide rendering pipeline.

use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

/// A single presentation slide as supplied by the shell.
///
/// Immutable once constructed; the pipeline only reads `markdown_source`.
/// Title display and layout chrome are the shell's responsibility.
#[derive(Debug, Clone)]
pub struct SlideDocument {
    /// Stable identifier, unique within the deck.
    pub id: String,
    /// Title shown by the shell's chrome; not rendered by the core.
    pub title: String,
    /// The raw markdown body of the slide.
    pub markdown_source: String,
}

impl SlideDocument {
    /// Creates a new slide document.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        markdown_source: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            markdown_source: markdown_source.into(),
        }
    }
}

/// Identifier for one diagram render request.
///
/// Allocated from a process-wide monotonic counter and never reused, even
/// across slides. Patches and pass reports are attributed by this value, so
/// a reused id could misattribute one diagram's result to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DiagramId(pub u64);

impl fmt::Display for DiagramId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "diagram-{}", self.0)
    }
}

/// A rendered diagram: the emitted SVG markup tagged with its request id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkupFragment {
    /// The id the fragment was rendered under.
    pub id: DiagramId,
    /// The SVG document produced by the diagram engine.
    pub svg: String,
}

/// Resolution state of a diagram placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagramState {
    /// Not yet picked up by a mount pass.
    Pending,
    /// Successfully rendered; holds the emitted markup.
    Rendered(MarkupFragment),
    /// Render failed; the message is shown in place of the graphic.
    Failed {
        /// The id the failed render was attempted under.
        id: DiagramId,
        /// Human-readable failure description.
        message: String,
    },
}

/// A placeholder block standing in for a not-yet-rendered diagram.
///
/// Inserted by the markdown renderer for every diagram-tagged fence and
/// resolved in place by the mount pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramSlot {
    /// The raw diagram description from the fence body.
    pub source: String,
    /// Current resolution state.
    pub state: DiagramState,
}

impl DiagramSlot {
    /// Creates an unresolved slot for the given description.
    pub fn pending(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            state: DiagramState::Pending,
        }
    }

    /// Whether this slot still awaits resolution.
    pub fn is_pending(&self) -> bool {
        matches!(self.state, DiagramState::Pending)
    }
}

/// A single line of styled output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyledLine {
    /// The styled segments making up this line.
    pub segments: Vec<StyledSegment>,
}

impl StyledLine {
    /// Creates a new styled line from segments.
    pub fn new(segments: Vec<StyledSegment>) -> Self {
        Self { segments }
    }

    /// Creates a plain unstyled line from text.
    pub fn plain(text: &str) -> Self {
        Self {
            segments: vec![StyledSegment::plain(text)],
        }
    }

    /// Returns the line's text content with styling discarded.
    pub fn text(&self) -> String {
        self.segments.iter().map(|s| s.text.as_str()).collect()
    }
}

/// A segment of styled text within a line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyledSegment {
    /// The text content.
    pub text: String,
    /// Foreground color as [r, g, b].
    pub fg: Option<[u8; 3]>,
    /// Background color as [r, g, b].
    pub bg: Option<[u8; 3]>,
    /// Whether this segment is bold.
    pub bold: bool,
    /// Whether this segment is italic.
    pub italic: bool,
    /// Whether this segment is underlined.
    pub underline: bool,
    /// Whether this segment has strikethrough.
    pub strikethrough: bool,
}

impl StyledSegment {
    /// Creates an unstyled segment.
    pub fn plain(text: &str) -> Self {
        Self {
            text: text.to_string(),
            fg: None,
            bg: None,
            bold: false,
            italic: false,
            underline: false,
            strikethrough: false,
        }
    }

    /// Creates a colored segment with no other styling.
    pub fn colored(text: &str, fg: [u8; 3]) -> Self {
        Self {
            fg: Some(fg),
            ..Self::plain(text)
        }
    }
}

/// Column alignment for table blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColumnAlignment {
    /// No alignment specified in the source.
    #[default]
    None,
    /// Left-aligned (`:---`).
    Left,
    /// Center-aligned (`:---:`).
    Center,
    /// Right-aligned (`---:`).
    Right,
}

/// A parsed markdown table with styled cell content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableBlock {
    /// Per-column alignment, one entry per column.
    pub alignments: Vec<ColumnAlignment>,
    /// Header cells.
    pub header: Vec<StyledLine>,
    /// Body rows, each a vector of cells.
    pub rows: Vec<Vec<StyledLine>>,
}

/// One block-level element of a rendered slide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlideBlock {
    /// A heading with its level (1–6) and styled text.
    Heading {
        /// Heading level, 1 through 6.
        level: u8,
        /// The heading text.
        line: StyledLine,
    },
    /// A prose paragraph; one entry per soft or hard break.
    Paragraph {
        /// The paragraph's lines.
        lines: Vec<StyledLine>,
    },
    /// A flattened list; bullets, numbers, and checkboxes are part of the text.
    List {
        /// One entry per list item line.
        lines: Vec<StyledLine>,
    },
    /// A block quote with the quote bar already applied.
    BlockQuote {
        /// The quoted lines.
        lines: Vec<StyledLine>,
    },
    /// A fenced or indented code block, line-numbered and highlighted.
    Code {
        /// The declared language tag, if any.
        language: Option<String>,
        /// Gutter + highlighted source, one entry per source line.
        lines: Vec<StyledLine>,
    },
    /// A diagram placeholder, resolved in place by the mount pass.
    Diagram(DiagramSlot),
    /// A table with styled cells.
    Table(TableBlock),
    /// A thematic break.
    Rule,
}

/// The committed, shell-visible block tree of a mounted slide.
///
/// Block positions are stable for the lifetime of the surface; the mount
/// pass patches diagram slots by index. Re-committing (a markdown source
/// change) replaces the whole surface rather than restructuring this one.
#[derive(Debug, Clone)]
pub struct SlideSurface {
    /// Blocks in document order.
    pub blocks: Vec<SlideBlock>,
    /// Bumped on every patch, letting shells cheaply detect repaints.
    pub revision: u64,
}

impl SlideSurface {
    /// Wraps freshly rendered blocks into a surface at revision zero.
    pub fn new(blocks: Vec<SlideBlock>) -> Self {
        Self {
            blocks,
            revision: 0,
        }
    }

    /// Returns `(block index, description)` for every unresolved diagram
    /// slot, in document order.
    pub fn pending_diagrams(&self) -> Vec<(usize, String)> {
        self.blocks
            .iter()
            .enumerate()
            .filter_map(|(idx, block)| match block {
                SlideBlock::Diagram(slot) if slot.is_pending() => {
                    Some((idx, slot.source.clone()))
                }
                _ => None,
            })
            .collect()
    }

    /// Returns the state of every diagram slot, in document order.
    pub fn diagram_states(&self) -> Vec<&DiagramState> {
        self.blocks
            .iter()
            .filter_map(|block| match block {
                SlideBlock::Diagram(slot) => Some(&slot.state),
                _ => None,
            })
            .collect()
    }
}

/// Shared handle to a committed surface.
///
/// The mounted [`crate::slide::Slide`] owns the strong reference; the mount
/// pass holds only a [`std::sync::Weak`] while renders are in flight, so a
/// patch after unmount degrades to a silent no-op. Locks are held only for
/// short, non-suspending critical sections.
pub type SharedSurface = Arc<Mutex<SlideSurface>>;

#[cfg(test)]
mod tests {
    use super::*;

    /// Verify `StyledLine` text extraction joins segment texts verbatim.
    #[test]
    fn test_styled_line_text() {
        let line = StyledLine::new(vec![
            StyledSegment::plain("hello "),
            StyledSegment::colored("world", [255, 0, 0]),
        ]);
        assert_eq!(line.text(), "hello world");
        assert_eq!(StyledLine::plain("").text(), "");
    }

    /// Verify diagram slot state helpers.
    #[test]
    fn test_diagram_slot_states() {
        let slot = DiagramSlot::pending("flowchart LR\nA-->B");
        assert!(slot.is_pending());

        let rendered = DiagramSlot {
            source: slot.source.clone(),
            state: DiagramState::Rendered(MarkupFragment {
                id: DiagramId(1),
                svg: "<svg/>".to_string(),
            }),
        };
        assert!(!rendered.is_pending());
    }

    /// Verify pending-diagram scan returns indices in document order and
    /// skips resolved slots.
    #[test]
    fn test_surface_pending_scan() {
        let surface = SlideSurface::new(vec![
            SlideBlock::Heading {
                level: 1,
                line: StyledLine::plain("Title"),
            },
            SlideBlock::Diagram(DiagramSlot::pending("graph TD\n  A-->B")),
            SlideBlock::Paragraph {
                lines: vec![StyledLine::plain("prose")],
            },
            SlideBlock::Diagram(DiagramSlot {
                source: "done".to_string(),
                state: DiagramState::Failed {
                    id: DiagramId(7),
                    message: "bad".to_string(),
                },
            }),
            SlideBlock::Diagram(DiagramSlot::pending("sequenceDiagram")),
        ]);

        let pending = surface.pending_diagrams();
        assert_eq!(pending.len(), 2);
        assert_eq!(pending[0].0, 1);
        assert_eq!(pending[1].0, 4);
        assert_eq!(surface.diagram_states().len(), 3);
    }

    /// Verify diagram ids format with a stable prefix.
    #[test]
    fn test_diagram_id_display() {
        assert_eq!(DiagramId(0).to_string(), "diagram-0");
        assert_eq!(DiagramId(42).to_string(), "diagram-42");
    }
}
