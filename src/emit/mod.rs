//! Code emission.
//!
//! The emitter is a thin layer over the compiled AST. It never resolves
//! anything; it only walks ordered [`SymbolSet`]s and renders text.
//!
//! - [`cpp`] renders `Constants.hpp` and `Schema.hpp`.
//! - [`godot`] renders the optional `SIDCConstants.gd` companion export.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::info;

use crate::ast::{Align, SymbolSet, Vec2};
use crate::taxonomy::Constants;
use crate::SchemaError;

pub mod cpp;
pub mod godot;

pub const CONSTANTS_HEADER: &str = "Constants.hpp";
pub const SCHEMA_HEADER: &str = "Schema.hpp";
pub const GODOT_EXPORT: &str = "SIDCConstants.gd";

// =============================
// Output options
// =============================

/// How the schema header is rendered.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputStyle {
    /// Replace text commands by paths produced by a [`FontEngine`]
    pub use_text_paths: bool,
    /// Emit `get_available_symbols` after `get_symbol_layer`
    pub include_enumerator: bool,
}

impl Default for OutputStyle {
    fn default() -> Self {
        Self {
            use_text_paths: false,
            include_enumerator: true,
        }
    }
}

/// Text-to-path glyph rendering.
///
/// Given a string, an origin, a font size and an alignment, an engine returns
/// the SVG path data of each glyph. The emitter joins them with spaces.
pub trait FontEngine {
    fn render_text(
        &self,
        text: &str,
        pos: Vec2,
        font_size: f64,
        align: Align,
    ) -> Result<Vec<String>, SchemaError>;
}

// =============================
// Identifiers
// =============================

static IDENTIFIER_SEPARATORS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\s,/\(\)\-\[\]]+").expect("valid separator regex"));

/// Collapses runs of whitespace and `, / ( ) - [ ]` to `_` and upper-cases.
pub fn sanitize_identifier(name: &str) -> String {
    IDENTIFIER_SEPARATORS
        .replace_all(name, "_")
        .to_uppercase()
}

/// Hands out identifiers for one generated enumeration and rejects two
/// sources that sanitize to the same identifier.
#[derive(Debug, Default)]
pub struct IdentifierRegistry {
    seen: HashMap<String, String>,
}

impl IdentifierRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `identifier` as produced by `origin`, a human-readable
    /// description of the source entry.
    pub fn claim(&mut self, identifier: String, origin: String) -> Result<String, SchemaError> {
        if let Some(first) = self.seen.get(&identifier) {
            return Err(SchemaError::IdentifierCollision {
                identifier,
                first: first.clone(),
                second: origin,
            });
        }
        self.seen.insert(identifier.clone(), origin);
        Ok(identifier)
    }
}

// =============================
// Artifacts
// =============================

/// The generated files, as text.
#[derive(Debug, Clone, PartialEq)]
pub struct Artifacts {
    pub constants_header: String,
    pub schema_header: String,
    pub godot: Option<String>,
}

/// Renders every artifact. `font` is required when `style.use_text_paths`
/// is set.
pub fn emit_artifacts(
    sets: &[SymbolSet],
    constants: &Constants,
    style: &OutputStyle,
    font: Option<&dyn FontEngine>,
    with_godot: bool,
) -> Result<Artifacts, SchemaError> {
    info!(
        "Outputting C++ headers, using {} elements for text...",
        if style.use_text_paths { "path" } else { "text" }
    );
    Ok(Artifacts {
        constants_header: cpp::constants_header(sets, constants)?,
        schema_header: cpp::schema_header(sets, constants, style, font)?,
        godot: with_godot.then(|| godot::sidc_constants(sets)),
    })
}

/// Writes the headers into `out_dir` and the companion export to
/// `godot_path`. Returns the paths written.
pub fn write_artifacts(
    artifacts: &Artifacts,
    out_dir: &Path,
    godot_path: Option<&Path>,
) -> Result<Vec<PathBuf>, SchemaError> {
    let io_err = |path: &Path| {
        let path = path.display().to_string();
        move |source: std::io::Error| SchemaError::Io { path, source }
    };

    fs::create_dir_all(out_dir).map_err(io_err(out_dir))?;
    let mut written = Vec::new();
    for (name, content) in [
        (CONSTANTS_HEADER, &artifacts.constants_header),
        (SCHEMA_HEADER, &artifacts.schema_header),
    ] {
        let path = out_dir.join(name);
        fs::write(&path, content).map_err(io_err(&path))?;
        written.push(path);
    }

    if let (Some(content), Some(path)) = (&artifacts.godot, godot_path) {
        fs::write(path, content).map_err(io_err(path))?;
        written.push(path.to_path_buf());
    }
    Ok(written)
}
