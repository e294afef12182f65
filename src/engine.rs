//! Diagram engine: process-wide configuration and description-to-SVG
//! rendering.
//!
//! Wraps `mermaid-rs-renderer` (pure-Rust mermaid layout and SVG emission).
//! Configuration is installed exactly once per process: the first
//! [`DiagramEngine::initialize`] call wins and later calls are accepted
//! no-ops. A render before any explicit initialize installs
//! [`EngineConfig::default`]. An invalid first configuration is permanent:
//! it is logged once at error level and every subsequent render returns it.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::theme::{SlideTheme, rgb_to_hex};
use crate::types::{DiagramId, MarkupFragment};

/// Failures surfaced by the diagram engine.
///
/// All variants are recoverable at the placeholder level; none should crash
/// the host process.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DiagramError {
    /// The description did not parse as a valid diagram grammar.
    #[error("invalid diagram description: {0}")]
    InvalidGrammar(String),
    /// The process-wide configuration was rejected; no diagram can render.
    #[error("diagram engine initialization failed: {0}")]
    Initialization(String),
    /// The underlying renderer panicked on a pathological input.
    #[error("diagram renderer panicked")]
    RendererPanic,
}

/// Process-wide diagram theme configuration.
///
/// Colors are `#RRGGBB` strings. The defaults reproduce the dark deck theme
/// this pipeline ships with.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EngineConfig {
    /// Node fill color.
    #[serde(default = "default_primary")]
    pub primary: String,
    /// Node border color.
    #[serde(default = "default_primary_border")]
    pub primary_border: String,
    /// Edge and connector color.
    #[serde(default = "default_line")]
    pub line: String,
    /// Secondary node fill color.
    #[serde(default = "default_secondary")]
    pub secondary: String,
    /// Tertiary node fill color.
    #[serde(default = "default_tertiary")]
    pub tertiary: String,
    /// Canvas background color.
    #[serde(default = "default_background")]
    pub background: String,
    /// Cluster and label-background surface color.
    #[serde(default = "default_surface")]
    pub surface: String,
    /// Raised surface color (notes, activations).
    #[serde(default = "default_raised_surface")]
    pub raised_surface: String,
    /// Muted border and stroke color.
    #[serde(default = "default_muted")]
    pub muted: String,
    /// Text color.
    #[serde(default = "default_text")]
    pub text: String,
    /// Font family for diagram labels.
    #[serde(default = "default_font_family")]
    pub font_family: String,
    /// Base font size in points.
    #[serde(default = "default_font_size")]
    pub font_size: f32,
}

fn default_primary() -> String {
    "#667eea".to_string()
}

fn default_primary_border() -> String {
    "#7c3aed".to_string()
}

fn default_line() -> String {
    "#5a67d8".to_string()
}

fn default_secondary() -> String {
    "#764ba2".to_string()
}

fn default_tertiary() -> String {
    "#667eea".to_string()
}

fn default_background() -> String {
    "#1a202c".to_string()
}

fn default_surface() -> String {
    "#2d3748".to_string()
}

fn default_raised_surface() -> String {
    "#4a5568".to_string()
}

fn default_muted() -> String {
    "#718096".to_string()
}

fn default_text() -> String {
    "#ffffff".to_string()
}

fn default_font_family() -> String {
    "sans-serif".to_string()
}

fn default_font_size() -> f32 {
    14.0
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            primary: default_primary(),
            primary_border: default_primary_border(),
            line: default_line(),
            secondary: default_secondary(),
            tertiary: default_tertiary(),
            background: default_background(),
            surface: default_surface(),
            raised_surface: default_raised_surface(),
            muted: default_muted(),
            text: default_text(),
            font_family: default_font_family(),
            font_size: default_font_size(),
        }
    }
}

impl EngineConfig {
    /// Derives a diagram configuration from a text theme so diagrams match
    /// the surrounding slide colors.
    pub fn from_slide_theme(theme: &SlideTheme) -> Self {
        Self {
            primary: rgb_to_hex(theme.palette[4]),
            primary_border: rgb_to_hex(theme.palette[8]),
            line: rgb_to_hex(theme.palette[7]),
            secondary: rgb_to_hex(theme.palette[5]),
            tertiary: rgb_to_hex(theme.palette[6]),
            background: rgb_to_hex(theme.bg),
            surface: rgb_to_hex(theme.palette[0]),
            raised_surface: rgb_to_hex(theme.palette[8]),
            muted: rgb_to_hex(theme.palette[7]),
            text: rgb_to_hex(theme.fg),
            ..Self::default()
        }
    }

    /// Checks that every color is a parseable `#RRGGBB` string and the font
    /// size is positive.
    pub fn validate(&self) -> Result<(), DiagramError> {
        let colors = [
            ("primary", &self.primary),
            ("primary_border", &self.primary_border),
            ("line", &self.line),
            ("secondary", &self.secondary),
            ("tertiary", &self.tertiary),
            ("background", &self.background),
            ("surface", &self.surface),
            ("raised_surface", &self.raised_surface),
            ("muted", &self.muted),
            ("text", &self.text),
        ];
        for (name, value) in colors {
            if !is_hex_color(value) {
                return Err(DiagramError::Initialization(format!(
                    "{name} is not a #RRGGBB color: {value:?}"
                )));
            }
        }
        if !self.font_size.is_finite() || self.font_size <= 0.0 {
            return Err(DiagramError::Initialization(format!(
                "font size must be positive, got {}",
                self.font_size
            )));
        }
        Ok(())
    }
}

fn is_hex_color(value: &str) -> bool {
    value
        .strip_prefix('#')
        .is_some_and(|hex| hex.len() == 6 && hex.bytes().all(|b| b.is_ascii_hexdigit()))
}

/// Installed configuration, or the error that rejected it.
static ENGINE_STATE: OnceLock<Result<EngineConfig, DiagramError>> = OnceLock::new();

/// Validates a configuration for installation into [`ENGINE_STATE`].
///
/// Runs at most once per process, so the rejection log fires at most once.
fn install(config: EngineConfig) -> Result<EngineConfig, DiagramError> {
    match config.validate() {
        Ok(()) => Ok(config),
        Err(e) => {
            log::error!("diagram engine configuration rejected: {e}");
            Err(e)
        }
    }
}

/// The process-wide diagram engine.
///
/// Stateless handle; configuration and the renderer's state live behind
/// process-wide statics.
pub struct DiagramEngine;

impl DiagramEngine {
    /// Installs the process-wide configuration.
    ///
    /// First writer wins: once a configuration (or a rejection) is
    /// installed, later calls leave it untouched and return the installed
    /// state's result.
    pub fn initialize(config: EngineConfig) -> Result<(), DiagramError> {
        let state = ENGINE_STATE.get_or_init(|| install(config));
        state.as_ref().map(|_| ()).map_err(Clone::clone)
    }

    /// Whether a configuration (valid or rejected) has been installed.
    pub fn is_initialized() -> bool {
        ENGINE_STATE.get().is_some()
    }

    /// Renders a diagram description to SVG markup.
    ///
    /// Installs the default configuration if none was set explicitly.
    /// `id` must be unique per call within the process lifetime; the caller
    /// allocates it. May take long enough to warrant running under
    /// `spawn_blocking`.
    pub fn render(id: DiagramId, description: &str) -> Result<MarkupFragment, DiagramError> {
        let config = ENGINE_STATE
            .get_or_init(|| install(EngineConfig::default()))
            .as_ref()
            .map_err(Clone::clone)?
            .clone();
        let source = description.to_string();

        // The renderer may panic on pathological input; contain it so one
        // bad diagram never takes down the process.
        let rendered = std::panic::catch_unwind(move || {
            let opts = mermaid_rs_renderer::RenderOptions {
                theme: diagram_theme(&config),
                layout: mermaid_rs_renderer::LayoutConfig::default(),
            };
            mermaid_rs_renderer::render_with_options(&source, opts)
        })
        .map_err(|_| DiagramError::RendererPanic)?;

        let svg = rendered.map_err(|e| DiagramError::InvalidGrammar(e.to_string()))?;
        Ok(MarkupFragment { id, svg })
    }
}

/// Builds the renderer's theme from an installed configuration.
fn diagram_theme(config: &EngineConfig) -> mermaid_rs_renderer::Theme {
    let modern = mermaid_rs_renderer::Theme::modern();
    let pie_colors = [
        config.primary.clone(),
        config.secondary.clone(),
        config.tertiary.clone(),
        config.primary_border.clone(),
        config.line.clone(),
        config.muted.clone(),
        config.primary.clone(),
        config.secondary.clone(),
        config.tertiary.clone(),
        config.primary_border.clone(),
        config.line.clone(),
        config.muted.clone(),
    ];

    mermaid_rs_renderer::Theme {
        font_family: config.font_family.clone(),
        font_size: config.font_size,
        primary_color: config.primary.clone(),
        primary_text_color: config.text.clone(),
        primary_border_color: config.primary_border.clone(),
        line_color: config.line.clone(),
        secondary_color: config.secondary.clone(),
        tertiary_color: config.tertiary.clone(),
        edge_label_background: config.surface.clone(),
        cluster_background: config.surface.clone(),
        cluster_border: config.muted.clone(),
        background: config.background.clone(),
        sequence_actor_fill: config.primary.clone(),
        sequence_actor_border: config.primary_border.clone(),
        sequence_actor_line: config.line.clone(),
        sequence_note_fill: config.raised_surface.clone(),
        sequence_note_border: config.muted.clone(),
        sequence_activation_fill: config.raised_surface.clone(),
        sequence_activation_border: config.muted.clone(),
        text_color: config.text.clone(),
        git_colors: modern.git_colors,
        git_inv_colors: modern.git_inv_colors,
        git_branch_label_colors: modern.git_branch_label_colors,
        git_commit_label_color: config.text.clone(),
        git_commit_label_background: config.muted.clone(),
        git_tag_label_color: config.text.clone(),
        git_tag_label_background: config.muted.clone(),
        git_tag_label_border: config.line.clone(),
        pie_colors,
        pie_title_text_size: 25.0,
        pie_title_text_color: config.text.clone(),
        pie_section_text_size: 17.0,
        pie_section_text_color: config.text.clone(),
        pie_legend_text_size: 17.0,
        pie_legend_text_color: config.text.clone(),
        pie_stroke_color: config.line.clone(),
        pie_stroke_width: 1.6,
        pie_outer_stroke_width: 1.6,
        pie_outer_stroke_color: config.muted.clone(),
        pie_opacity: 0.85,
    }
}
