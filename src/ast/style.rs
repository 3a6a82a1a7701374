//! Styling shared by every drawing command.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The default stroke width for symbol elements.
pub const DEFAULT_STROKE_WIDTH: f64 = 4.0;

/// Colors an element may reference. The renderer maps each token to a real
/// color from the affiliation and color mode at draw time. Yellow is only
/// used for missile icons and chemical spills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorToken {
    Icon,
    IconFill,
    White,
    Yellow,
}

impl ColorToken {
    pub const ALL: [ColorToken; 4] = [
        ColorToken::Icon,
        ColorToken::IconFill,
        ColorToken::White,
        ColorToken::Yellow,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ColorToken::Icon => "icon",
            ColorToken::IconFill => "icon_fill",
            ColorToken::White => "white",
            ColorToken::Yellow => "yellow",
        }
    }
}

impl fmt::Display for ColorToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ColorToken {
    type Err = ();

    /// Case-insensitive lookup of a color token name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        ColorToken::ALL
            .into_iter()
            .find(|token| token.as_str() == lower)
            .ok_or(())
    }
}

/// Fill, stroke and stroke width of an element. `None` means no color.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Style {
    pub fill: Option<ColorToken>,
    pub stroke: Option<ColorToken>,
    pub stroke_width: f64,
}

impl Style {
    /// Unfilled with an icon-colored stroke: paths, circles, frames and transforms.
    pub const fn outline() -> Self {
        Self {
            fill: None,
            stroke: Some(ColorToken::Icon),
            stroke_width: DEFAULT_STROKE_WIDTH,
        }
    }

    /// Icon-colored fill with no stroke: text.
    pub const fn glyph() -> Self {
        Self {
            fill: Some(ColorToken::Icon),
            stroke: None,
            stroke_width: DEFAULT_STROKE_WIDTH,
        }
    }
}

impl Default for Style {
    fn default() -> Self {
        Self::outline()
    }
}
