//! milsymbol-schema compiles a JSON military-symbology taxonomy and per-set
//! icon definitions into a drawing-command AST, then emits it as generated
//! headers for an external renderer.
//!
//! Pipeline: [`taxonomy::load_constants`] → [`compiler::compile_symbol_sets`]
//! → [`emit::emit_artifacts`].

pub use crate::diagnostics::{ErrorType, SchemaError};

pub mod ast;
pub mod cli;
pub mod compiler;
pub mod diagnostics;
pub mod discovery;
pub mod emit;
pub mod source;
pub mod taxonomy;
