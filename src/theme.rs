//! Color theme for slide text styling.

use serde::{Deserialize, Serialize};

/// Color palette used when styling slide text and highlighted code.
///
/// Follows the terminal color-scheme convention: default foreground and
/// background plus a 16-slot palette. Renderer modules pick roles by palette
/// index (strings, comments, keywords, heading levels).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlideTheme {
    /// Default foreground color [r, g, b].
    pub fg: [u8; 3],
    /// Default background color [r, g, b].
    pub bg: [u8; 3],
    /// The 16 ANSI colors [r, g, b] (indices 0–15).
    pub palette: [[u8; 3]; 16],
}

impl Default for SlideTheme {
    /// Catppuccin Mocha-inspired palette for vibrant, readable slides.
    fn default() -> Self {
        Self {
            fg: [205, 214, 244],
            bg: [30, 30, 46],
            palette: [
                [69, 71, 90],    // 0  Black (Surface0)
                [243, 139, 168], // 1  Red
                [166, 227, 161], // 2  Green
                [249, 226, 175], // 3  Yellow (warm gold)
                [137, 180, 250], // 4  Blue
                [203, 166, 247], // 5  Magenta (mauve)
                [148, 226, 213], // 6  Cyan (teal)
                [186, 194, 222], // 7  White (Subtext0)
                [108, 112, 134], // 8  Bright black (Overlay0)
                [235, 160, 172], // 9  Bright red (maroon)
                [166, 227, 161], // 10 Bright green
                [249, 226, 175], // 11 Bright yellow
                [116, 199, 236], // 12 Bright blue (sapphire)
                [245, 194, 231], // 13 Bright magenta (pink)
                [137, 220, 235], // 14 Bright cyan (sky)
                [205, 214, 244], // 15 Bright white (Text)
            ],
        }
    }
}

/// Format an `[r, g, b]` triple as a `#RRGGBB` hex string.
pub(crate) fn rgb_to_hex(c: [u8; 3]) -> String {
    format!("#{:02X}{:02X}{:02X}", c[0], c[1], c[2])
}

/// Heading color for a given level (1–6) from the theme palette.
pub(crate) fn heading_color(level: u8, theme: &SlideTheme) -> [u8; 3] {
    match level {
        1 => theme.palette[14],
        2 => theme.palette[10],
        3 => theme.palette[11],
        4 => theme.palette[12],
        5 => theme.palette[13],
        _ => theme.palette[8],
    }
}

/// Subtle background highlight for inline code and code blocks.
pub(crate) fn subtle_bg(theme: &SlideTheme) -> [u8; 3] {
    [
        theme.bg[0].saturating_add(25),
        theme.bg[1].saturating_add(25),
        theme.bg[2].saturating_add(25),
    ]
}
