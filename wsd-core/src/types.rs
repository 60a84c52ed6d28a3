//! Domain types shared by the renderer, the synchroniser and the CLI.
//!
//! All path fields use `PathBuf`; never `&str` or `String` for filesystem paths.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Style
// ---------------------------------------------------------------------------

/// Visual theme applied by the rendering service.
///
/// `Default` is the unspecified value; its wire name is the one the service
/// falls back to on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Style {
    #[default]
    Default,
    Earth,
    Magazine,
    ModernBlue,
    Mscgen,
    Napkin,
    Omegapple,
    Patent,
    Qsd,
    Rose,
    Roundgreen,
}

impl Style {
    /// Every style in a stable order.
    pub const ALL: &'static [Style] = &[
        Style::Default,
        Style::Earth,
        Style::Magazine,
        Style::ModernBlue,
        Style::Mscgen,
        Style::Napkin,
        Style::Omegapple,
        Style::Patent,
        Style::Qsd,
        Style::Rose,
        Style::Roundgreen,
    ];

    /// Variant name, used when a style is embedded in an output file name.
    pub fn name(self) -> &'static str {
        match self {
            Style::Default => "Default",
            Style::Earth => "Earth",
            Style::Magazine => "Magazine",
            Style::ModernBlue => "ModernBlue",
            Style::Mscgen => "Mscgen",
            Style::Napkin => "Napkin",
            Style::Omegapple => "Omegapple",
            Style::Patent => "Patent",
            Style::Qsd => "Qsd",
            Style::Rose => "Rose",
            Style::Roundgreen => "Roundgreen",
        }
    }

    /// Lowercase form sent as the `style` form field.
    pub fn wire_name(self) -> &'static str {
        match self {
            Style::Default => "default",
            Style::Earth => "earth",
            Style::Magazine => "magazine",
            Style::ModernBlue => "modernblue",
            Style::Mscgen => "mscgen",
            Style::Napkin => "napkin",
            Style::Omegapple => "omegapple",
            Style::Patent => "patent",
            Style::Qsd => "qsd",
            Style::Rose => "rose",
            Style::Roundgreen => "roundgreen",
        }
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ---------------------------------------------------------------------------
// DiagramSource
// ---------------------------------------------------------------------------

/// Diagram text together with the file it was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagramSource {
    path: PathBuf,
    text: String,
}

impl DiagramSource {
    pub fn new(path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.text.lines()
    }
}

// ---------------------------------------------------------------------------
// RenderRequest
// ---------------------------------------------------------------------------

/// One call to the rendering service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderRequest {
    pub text: String,
    pub style: Style,
    /// Output format token, e.g. `png`.
    pub format: String,
}

impl RenderRequest {
    pub fn new(text: impl Into<String>, style: Style, format: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            style,
            format: format.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
