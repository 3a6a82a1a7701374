//! Compilation of symbol-set JSON into the drawing-command AST.
//!
//! - [`element`] turns element objects into [`Element`] values.
//! - [`set`] assembles symbol layers and whole symbol sets.

use serde_json::{Map, Value};

use crate::ast::Element;
use crate::taxonomy::Constants;
use crate::SchemaError;

pub mod element;
pub mod set;

pub use element::{parse_basics, parse_color, ElementCompiler, ElementShape, STYLE_KEYS};
pub use set::{
    compile_icon, compile_symbol_document, compile_symbol_set, compile_symbol_set_source,
    compile_symbol_sets, CATEGORIES, INTERNAL_ALIAS_PREFIX,
};

/// Compiles a single element object. `siblings` is the category block the
/// element's entry belongs to and resolves `icon` aliases.
pub fn compile_element(
    item: &Value,
    siblings: &Map<String, Value>,
    constants: &Constants,
) -> Result<Vec<Element>, SchemaError> {
    ElementCompiler::new(siblings, constants).compile(item)
}
