//! Drawing-command AST.
//!
//! This module provides the closed set of drawing commands a compiled icon is
//! made of. Every variant embeds a [`Style`] by value; transforms and full
//! frames own their children.

// ============================================================================
// IMPORTS
// ============================================================================

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

pub mod style;
pub mod symbol;

pub use style::{ColorToken, Style, DEFAULT_STROKE_WIDTH};
pub use symbol::{symbol_code, SymbolLayer, SymbolSet};

// ============================================================================
// GEOMETRY
// ============================================================================

/// A point or displacement in icon space (the nominal icon is 200x200).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Icon center; the default text origin.
pub const ICON_CENTER: Vec2 = Vec2::new(100.0, 100.0);

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BBox {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

impl Default for BBox {
    /// The box assumed for paths that do not declare one.
    fn default() -> Self {
        Self::new(100.0, 100.0, 100.0, 100.0)
    }
}

// ============================================================================
// TEXT
// ============================================================================

/// Horizontal text anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Align {
    Left,
    #[default]
    Middle,
    Right,
}

impl Align {
    pub fn as_str(&self) -> &'static str {
        match self {
            Align::Left => "left",
            Align::Middle => "middle",
            Align::Right => "right",
        }
    }
}

/// How the renderer places and sizes a text element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextType {
    /// Sized and placed by the renderer in the main icon area
    Auto,
    /// Explicit position and font size
    Manual,
    /// Placed in the modifier 1 slot
    Modifier1,
    /// Placed in the modifier 2 slot
    Modifier2,
}

/// Default font size for manual text.
pub const DEFAULT_FONT_SIZE: f64 = 12.0;

// ============================================================================
// ELEMENTS
// ============================================================================

/// A single drawing command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Element {
    Path {
        d: String,
        bbox: BBox,
        style: Style,
    },
    Circle {
        pos: Vec2,
        radius: f64,
        style: Style,
    },
    Text {
        text: String,
        pos: Vec2,
        font_size: f64,
        align: Align,
        text_type: TextType,
        style: Style,
    },
    /// Children bucketed per base affiliation id. Buckets are emitted in
    /// `Constants::full_frame_ordering`, not in map order.
    FullFrame {
        elements: IndexMap<String, Vec<Element>>,
        style: Style,
    },
    Translate {
        delta: Vec2,
        items: Vec<Element>,
        style: Style,
    },
    Scale {
        factor: f64,
        items: Vec<Element>,
        style: Style,
    },
}

impl Element {
    pub fn style(&self) -> &Style {
        match self {
            Element::Path { style, .. }
            | Element::Circle { style, .. }
            | Element::Text { style, .. }
            | Element::FullFrame { style, .. }
            | Element::Translate { style, .. }
            | Element::Scale { style, .. } => style,
        }
    }

    pub fn style_mut(&mut self) -> &mut Style {
        match self {
            Element::Path { style, .. }
            | Element::Circle { style, .. }
            | Element::Text { style, .. }
            | Element::FullFrame { style, .. }
            | Element::Translate { style, .. }
            | Element::Scale { style, .. } => style,
        }
    }

    /// Child list of a transform node.
    pub fn items_mut(&mut self) -> Option<&mut Vec<Element>> {
        match self {
            Element::Translate { items, .. } | Element::Scale { items, .. } => Some(items),
            _ => None,
        }
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn node_count(&self) -> usize {
        1 + match self {
            Element::Translate { items, .. } | Element::Scale { items, .. } => {
                items.iter().map(Element::node_count).sum()
            }
            Element::FullFrame { elements, .. } => elements
                .values()
                .flatten()
                .map(Element::node_count)
                .sum(),
            _ => 0,
        }
    }
}

// ------------------------------------------------------------------------
// SVG-like pretty printing
// ------------------------------------------------------------------------

fn color_attr(color: Option<ColorToken>) -> &'static str {
    color.map(|c| c.as_str()).unwrap_or("none")
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "fill=\"{}\" stroke=\"{}\"",
            color_attr(self.fill),
            color_attr(self.stroke)
        )?;
        if self.stroke.is_some() {
            write!(f, " stroke_width=\"{}\"", self.stroke_width)?;
        }
        Ok(())
    }
}

fn write_children(f: &mut fmt::Formatter<'_>, items: &[Element]) -> fmt::Result {
    let inner = items
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(" ");
    write!(f, "{}", inner)
}

impl fmt::Display for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Element::Path { d, style, .. } => write!(f, "<path d=\"{}\" {} />", d, style),
            Element::Circle { pos, radius, style } => write!(
                f,
                "<circle cx=\"{}\" cy=\"{}\" r=\"{}\" {} />",
                pos.x, pos.y, radius, style
            ),
            Element::Text {
                text,
                pos,
                font_size,
                align,
                style,
                ..
            } => write!(
                f,
                "<text x=\"{}\" y=\"{}\" font-size=\"{}\" text-anchor=\"{}\" {}>{}</text>",
                pos.x,
                pos.y,
                font_size,
                align.as_str(),
                style,
                text
            ),
            Element::FullFrame { elements, .. } => {
                write!(f, "<switch>")?;
                for (affiliation, items) in elements {
                    write!(f, "<g affiliation=\"{}\">", affiliation)?;
                    write_children(f, items)?;
                    write!(f, "</g>")?;
                }
                write!(f, "</switch>")
            }
            Element::Translate { delta, items, .. } => {
                write!(f, "<g transform=\"translate({} {})\">", delta.x, delta.y)?;
                write_children(f, items)?;
                write!(f, "</g>")
            }
            Element::Scale { factor, items, .. } => {
                write!(f, "<g transform=\"scale({})\">", factor)?;
                write_children(f, items)?;
                write!(f, "</g>")
            }
        }
    }
}
