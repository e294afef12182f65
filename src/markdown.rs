//! Markdown renderer: parses slide source into the block tree.
//!
//! Parses with the common extended grammar (tables, strikethrough, task
//! lists) and folds the event stream into [`SlideBlock`]s. Code fences are
//! dispatched through [`classify`]: diagram-tagged fences become pending
//! [`DiagramSlot`]s for the mount pass, everything else is rendered
//! immediately. The fold is a pure transformation — it never suspends and
//! touches no global state.

use pulldown_cmark::{Alignment, CodeBlockKind, Event, Options, Parser, Tag, TagEnd};

use crate::classify::{BlockClass, classify, fence_language};
use crate::highlight::render_code_block;
use crate::theme::{SlideTheme, heading_color, subtle_bg};
use crate::types::{
    ColumnAlignment, DiagramSlot, SlideBlock, StyledLine, StyledSegment, TableBlock,
};

/// Renders markdown slide sources into styled block trees.
#[derive(Debug, Clone)]
pub struct MarkdownRenderer {
    theme: SlideTheme,
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new(SlideTheme::default())
    }
}

impl MarkdownRenderer {
    /// Creates a renderer styling output from the given theme.
    pub fn new(theme: SlideTheme) -> Self {
        Self { theme }
    }

    /// The theme this renderer styles with.
    pub fn theme(&self) -> &SlideTheme {
        &self.theme
    }

    /// Parses `markdown_source` and returns the slide's blocks in document
    /// order. Diagram-tagged fences come back as pending placeholders.
    pub fn render(&self, markdown_source: &str) -> Vec<SlideBlock> {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_TABLES);
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);

        let mut walk = Walk::new(&self.theme);
        for event in Parser::new_ext(markdown_source, options) {
            walk.handle(event);
        }
        walk.finish()
    }
}

/// One open (possibly nested) list.
struct ListFrame {
    /// Next item number for ordered lists, `None` for bullet lists.
    next_number: Option<u64>,
}

/// An open table under construction.
struct TableCtx {
    alignments: Vec<ColumnAlignment>,
    header: Vec<StyledLine>,
    rows: Vec<Vec<StyledLine>>,
    row: Vec<StyledLine>,
    in_head: bool,
}

/// An open code fence accumulating its body text.
struct FenceCtx {
    class: BlockClass,
    buf: String,
}

/// Event-fold state. Containers route completed lines to their own sinks;
/// code fences capture raw text until they close.
struct Walk<'a> {
    theme: &'a SlideTheme,
    blocks: Vec<SlideBlock>,

    /// Segments of the line currently being accumulated.
    segments: Vec<StyledSegment>,
    /// Completed lines of the paragraph currently being accumulated.
    paragraph: Vec<StyledLine>,

    // Inline state. Depth-counted so nested emphasis unwinds correctly.
    bold: usize,
    italic: usize,
    strike: usize,
    link_dest: Option<String>,
    link_start: usize,

    heading: Option<u8>,
    quote_depth: usize,
    quote_lines: Vec<StyledLine>,
    list_stack: Vec<ListFrame>,
    list_lines: Vec<StyledLine>,
    table: Option<TableCtx>,
    fence: Option<FenceCtx>,
}

impl<'a> Walk<'a> {
    fn new(theme: &'a SlideTheme) -> Self {
        Self {
            theme,
            blocks: Vec::new(),
            segments: Vec::new(),
            paragraph: Vec::new(),
            bold: 0,
            italic: 0,
            strike: 0,
            link_dest: None,
            link_start: 0,
            heading: None,
            quote_depth: 0,
            quote_lines: Vec::new(),
            list_stack: Vec::new(),
            list_lines: Vec::new(),
            table: None,
            fence: None,
        }
    }

    fn handle(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(end) => self.end_tag(end),
            Event::Text(text) => {
                if let Some(fence) = self.fence.as_mut() {
                    fence.buf.push_str(&text);
                } else {
                    self.push_text(&text);
                }
            }
            Event::Code(code) => {
                // Inline code keeps its own color; a surrounding heading
                // restyles it when the heading closes.
                self.segments.push(StyledSegment {
                    text: code.to_string(),
                    fg: Some(self.theme.palette[9]),
                    bg: Some(subtle_bg(self.theme)),
                    ..Default::default()
                });
            }
            Event::SoftBreak | Event::HardBreak => {
                if self.heading.is_some() {
                    // Headings stay on one line.
                    self.segments.push(StyledSegment::plain(" "));
                } else {
                    self.flush_line();
                }
            }
            Event::Rule => self.blocks.push(SlideBlock::Rule),
            Event::TaskListMarker(checked) => {
                let (text, fg) = if checked {
                    ("[x] ", self.theme.palette[2])
                } else {
                    ("[ ] ", self.theme.palette[8])
                };
                self.segments.push(StyledSegment::colored(text, fg));
            }
            // Raw HTML has no styled-text rendering; drop it.
            Event::Html(_) | Event::InlineHtml(_) => {}
            _ => {}
        }
    }

    fn start_tag(&mut self, tag: Tag<'_>) {
        match tag {
            // Paragraph starts carry no state; in loose list items the
            // bullet prefix is already waiting in the segment buffer.
            Tag::Paragraph => {}
            Tag::Heading { level, .. } => {
                self.heading = Some(level as u8);
            }
            Tag::BlockQuote { .. } => {
                self.quote_depth += 1;
            }
            Tag::CodeBlock(kind) => {
                if !self.segments.is_empty() {
                    self.flush_line();
                }
                let language = match &kind {
                    CodeBlockKind::Fenced(info) => fence_language(info).to_string(),
                    CodeBlockKind::Indented => String::new(),
                };
                self.fence = Some(FenceCtx {
                    class: classify(&language, false),
                    buf: String::new(),
                });
            }
            Tag::List(first_number) => {
                if !self.segments.is_empty() {
                    self.flush_line();
                }
                self.list_stack.push(ListFrame {
                    next_number: first_number,
                });
            }
            Tag::Item => self.begin_item(),
            Tag::Table(alignments) => {
                self.table = Some(TableCtx {
                    alignments: alignments.iter().map(convert_alignment).collect(),
                    header: Vec::new(),
                    rows: Vec::new(),
                    row: Vec::new(),
                    in_head: false,
                });
            }
            Tag::TableHead => {
                if let Some(table) = self.table.as_mut() {
                    table.in_head = true;
                }
            }
            Tag::TableRow => {}
            Tag::TableCell => {
                self.segments.clear();
            }
            Tag::Emphasis => self.italic += 1,
            Tag::Strong => self.bold += 1,
            Tag::Strikethrough => self.strike += 1,
            Tag::Link { dest_url, .. } => {
                self.link_dest = Some(dest_url.to_string());
                self.link_start = self.segments.len();
            }
            Tag::Image { .. } => {
                self.segments
                    .push(StyledSegment::colored("[image: ", self.theme.palette[8]));
            }
            _ => {}
        }
    }

    fn end_tag(&mut self, end: TagEnd) {
        match end {
            TagEnd::Paragraph => {
                self.flush_line();
                if !self.in_container() && !self.paragraph.is_empty() {
                    let lines = std::mem::take(&mut self.paragraph);
                    self.blocks.push(SlideBlock::Paragraph { lines });
                }
            }
            TagEnd::Heading(level) => {
                let level = level as u8;
                let line = self.close_heading(level);
                self.blocks.push(SlideBlock::Heading { level, line });
            }
            TagEnd::BlockQuote { .. } => {
                self.quote_depth = self.quote_depth.saturating_sub(1);
                if self.quote_depth == 0 && !self.quote_lines.is_empty() {
                    let lines = std::mem::take(&mut self.quote_lines);
                    self.blocks.push(SlideBlock::BlockQuote { lines });
                }
            }
            TagEnd::CodeBlock => self.close_fence(),
            TagEnd::List(_) => {
                self.flush_line();
                self.list_stack.pop();
                if self.list_stack.is_empty() && !self.list_lines.is_empty() {
                    let lines = std::mem::take(&mut self.list_lines);
                    self.blocks.push(SlideBlock::List { lines });
                }
            }
            TagEnd::Item => self.flush_line(),
            TagEnd::Table => {
                if let Some(table) = self.table.take() {
                    self.blocks.push(SlideBlock::Table(TableBlock {
                        alignments: table.alignments,
                        header: table.header,
                        rows: table.rows,
                    }));
                }
            }
            TagEnd::TableHead => {
                if let Some(table) = self.table.as_mut() {
                    table.header = std::mem::take(&mut table.row);
                    table.in_head = false;
                }
            }
            TagEnd::TableRow => {
                if let Some(table) = self.table.as_mut() {
                    let row = std::mem::take(&mut table.row);
                    table.rows.push(row);
                }
            }
            TagEnd::TableCell => {
                let cell = StyledLine::new(std::mem::take(&mut self.segments));
                if let Some(table) = self.table.as_mut() {
                    table.row.push(cell);
                }
            }
            TagEnd::Emphasis => self.italic = self.italic.saturating_sub(1),
            TagEnd::Strong => self.bold = self.bold.saturating_sub(1),
            TagEnd::Strikethrough => self.strike = self.strike.saturating_sub(1),
            TagEnd::Link => self.close_link(),
            TagEnd::Image => {
                self.segments
                    .push(StyledSegment::colored("]", self.theme.palette[8]));
            }
            _ => {}
        }
    }

    /// Appends a styled segment for prose text under the current inline state.
    fn push_text(&mut self, text: &str) {
        let mut seg = StyledSegment::plain(text);
        seg.bold = self.bold > 0;
        seg.italic = self.italic > 0;
        seg.strikethrough = self.strike > 0;
        if self.link_dest.is_some() {
            seg.fg = Some(self.theme.palette[12]);
            seg.underline = true;
        }
        self.segments.push(seg);
    }

    /// Whether completed lines currently belong to an open container
    /// rather than a top-level paragraph.
    fn in_container(&self) -> bool {
        !self.list_stack.is_empty() || self.quote_depth > 0 || self.table.is_some()
    }

    /// Completes the current line and routes it to the owning sink.
    fn flush_line(&mut self) {
        if self.segments.is_empty() {
            return;
        }
        let segments = std::mem::take(&mut self.segments);

        if !self.list_stack.is_empty() {
            self.list_lines.push(StyledLine::new(segments));
        } else if self.quote_depth > 0 {
            // Quote bar plus dimmed, italicized text.
            let mut styled = vec![StyledSegment::colored("▎ ", self.theme.palette[6])];
            for mut seg in segments {
                if seg.fg.is_none() {
                    seg.fg = Some(self.theme.palette[7]);
                }
                seg.italic = true;
                styled.push(seg);
            }
            self.quote_lines.push(StyledLine::new(styled));
        } else {
            self.paragraph.push(StyledLine::new(segments));
        }
    }

    /// Starts a list item line with its bullet or number prefix.
    fn begin_item(&mut self) {
        let depth = self.list_stack.len().saturating_sub(1);
        let indent = "  ".repeat(depth);
        let Some(frame) = self.list_stack.last_mut() else {
            return;
        };
        let prefix = match frame.next_number.as_mut() {
            Some(n) => {
                let seg = StyledSegment {
                    text: format!("{indent}{n}. "),
                    fg: Some(self.theme.palette[11]),
                    bold: true,
                    ..Default::default()
                };
                *n += 1;
                seg
            }
            None => {
                let bullet = match depth {
                    0 => "•",
                    1 => "◦",
                    _ => "▪",
                };
                StyledSegment::colored(&format!("{indent}{bullet} "), self.theme.palette[6])
            }
        };
        self.segments.push(prefix);
    }

    /// Applies heading styling over the accumulated segments.
    fn close_heading(&mut self, level: u8) -> StyledLine {
        self.heading = None;
        let color = heading_color(level, self.theme);
        let styled = std::mem::take(&mut self.segments)
            .into_iter()
            .map(|mut seg| {
                seg.fg = Some(color);
                seg.bold = level <= 2;
                seg
            })
            .collect();
        StyledLine::new(styled)
    }

    /// Ends a link span, appending the destination when it adds information.
    fn close_link(&mut self) {
        let Some(dest) = self.link_dest.take() else {
            return;
        };
        // A line flush inside the link text invalidates the start index.
        let text: String = self
            .segments
            .get(self.link_start..)
            .unwrap_or(&[])
            .iter()
            .map(|s| s.text.as_str())
            .collect();
        if !dest.is_empty() && dest != text {
            self.segments.push(StyledSegment::colored(
                &format!(" ({dest})"),
                self.theme.palette[8],
            ));
        }
    }

    /// Closes a fence, dispatching on its classification.
    ///
    /// A fence nested in an open quote or list splits the container so the
    /// emitted blocks keep document order.
    fn close_fence(&mut self) {
        let Some(fence) = self.fence.take() else {
            return;
        };
        if !self.quote_lines.is_empty() {
            let lines = std::mem::take(&mut self.quote_lines);
            self.blocks.push(SlideBlock::BlockQuote { lines });
        }
        if !self.list_lines.is_empty() {
            let lines = std::mem::take(&mut self.list_lines);
            self.blocks.push(SlideBlock::List { lines });
        }
        let block = match fence.class {
            BlockClass::Diagram => {
                // One trailing newline is fence syntax, not description.
                let source = fence.buf.strip_suffix('\n').unwrap_or(&fence.buf);
                SlideBlock::Diagram(DiagramSlot::pending(source))
            }
            BlockClass::Highlighted(lang) => {
                render_code_block(Some(lang.as_str()), &fence.buf, self.theme)
            }
            BlockClass::Plain | BlockClass::Inline => {
                render_code_block(None, &fence.buf, self.theme)
            }
        };
        self.blocks.push(block);
    }

    fn finish(mut self) -> Vec<SlideBlock> {
        self.flush_line();
        if !self.paragraph.is_empty() {
            let lines = std::mem::take(&mut self.paragraph);
            self.blocks.push(SlideBlock::Paragraph { lines });
        }
        self.blocks
    }
}

fn convert_alignment(alignment: &Alignment) -> ColumnAlignment {
    match alignment {
        Alignment::None => ColumnAlignment::None,
        Alignment::Left => ColumnAlignment::Left,
        Alignment::Center => ColumnAlignment::Center,
        Alignment::Right => ColumnAlignment::Right,
    }
}
