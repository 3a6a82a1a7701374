//! Symbol layer and symbol set assembly.
//!
//! A set file is compiled all-or-nothing: the first entry that fails aborts
//! the whole file, and the error names the set, category, code and display
//! name of that entry.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde_json::{Map, Value};
use tracing::{debug, info};

use super::element::ElementCompiler;
use crate::ast::{SymbolLayer, SymbolSet};
use crate::taxonomy::Constants;
use crate::{shape_err, source, SchemaError};

/// Category blocks of a set file, in emission order.
pub const CATEGORIES: [&str; 3] = ["IC", "M1", "M2"];

/// Entity codes starting with this marker are internal aliases: compiled and
/// available to `icon` references, never emitted.
pub const INTERNAL_ALIAS_PREFIX: char = '.';

// =============================
// Layers
// =============================

/// Compiles one entry of a category block into a [`SymbolLayer`].
pub fn compile_icon(
    uid: &str,
    item: &Value,
    siblings: &Map<String, Value>,
    constants: &Constants,
) -> Result<SymbolLayer, SchemaError> {
    let entry = item
        .as_object()
        .ok_or_else(|| shape_err!("entry {} must be an object", uid))?;
    let icon = entry.get("icon").ok_or_else(|| missing_key("icon", uid))?;
    let names = layer_names(uid, entry)?;

    let elements = ElementCompiler::new(siblings, constants)
        .with_root(uid)
        .compile_icon_list(icon)?;

    Ok(SymbolLayer {
        uid: uid.to_string(),
        names,
        elements,
        civilian: entry.get("civ").map(truthy).unwrap_or(false),
    })
}

fn layer_names(uid: &str, entry: &Map<String, Value>) -> Result<Vec<String>, SchemaError> {
    let invalid = |reason: &str| SchemaError::InvalidRecord {
        category: "symbol",
        id: uid.to_string(),
        reason: reason.to_string(),
    };
    let raw = entry
        .get("names")
        .ok_or_else(|| missing_key("names", uid))?
        .as_array()
        .ok_or_else(|| invalid("`names` must be a list"))?;
    let names = raw
        .iter()
        .map(|name| name.as_str().map(str::to_string))
        .collect::<Option<Vec<_>>>()
        .ok_or_else(|| invalid("`names` must contain only strings"))?;
    if names.is_empty() {
        return Err(invalid("`names` must not be empty"));
    }
    Ok(names)
}

fn missing_key(key: &str, uid: &str) -> SchemaError {
    SchemaError::MissingKey {
        key: key.to_string(),
        document: format!("entry {}", uid),
    }
}

/// JSON truthiness: false, null, 0, "" and empty containers are false.
fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(false, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Emitted codes become the last two digits of a numeric symbol code.
fn is_emittable_uid(uid: &str) -> bool {
    uid.len() == 2 && uid.bytes().all(|b| b.is_ascii_digit())
}

// =============================
// Sets
// =============================

/// Reads and compiles one set file.
pub fn compile_symbol_set<P: AsRef<Path>>(
    path: P,
    constants: &Constants,
) -> Result<SymbolSet, SchemaError> {
    info!("Parsing \"{}\"...", path.as_ref().display());
    let document = source::read_document(&path)?;
    compile_symbol_document(&path.as_ref().display().to_string(), &document, constants)
}

/// Compiles a set from JSON source text. `name` labels diagnostics.
pub fn compile_symbol_set_source(
    name: &str,
    source: &str,
    constants: &Constants,
) -> Result<SymbolSet, SchemaError> {
    let document = source::parse_document(name, source)?;
    compile_symbol_document(name, &document, constants)
}

/// Compiles a set from a parsed document.
pub fn compile_symbol_document(
    name: &str,
    document: &Value,
    constants: &Constants,
) -> Result<SymbolSet, SchemaError> {
    let root = document
        .as_object()
        .ok_or_else(|| shape_err!("set document {} must be an object", name))?;
    let required = |key: &str| -> Result<&str, SchemaError> {
        root.get(key)
            .ok_or_else(|| SchemaError::MissingKey {
                key: key.to_string(),
                document: name.to_string(),
            })?
            .as_str()
            .ok_or_else(|| SchemaError::InvalidRecord {
                category: "symbol set",
                id: name.to_string(),
                reason: format!("`{}` must be a string", key),
            })
    };

    let set_id = required("set")?;
    let set_name = required("name")?;
    let number: u32 = set_id
        .parse()
        .ok()
        .filter(|_| set_id.bytes().all(|b| b.is_ascii_digit()))
        .ok_or_else(|| SchemaError::InvalidRecord {
            category: "symbol set",
            id: set_id.to_string(),
            reason: "set id must be a decimal number".to_string(),
        })?;

    let mut compiled: [IndexMap<String, SymbolLayer>; 3] = Default::default();
    for (category, layers) in CATEGORIES.iter().zip(compiled.iter_mut()) {
        let Some(block) = root.get(*category) else {
            continue;
        };
        let block = block.as_object().ok_or_else(|| SchemaError::InvalidRecord {
            category: "symbol set",
            id: set_id.to_string(),
            reason: format!("`{}` must be an object", category),
        })?;

        for (code, item) in block {
            debug!("Loading {}:{}:{}", set_id, category, code);
            let wrap = |err: SchemaError| SchemaError::Item {
                set: set_id.to_string(),
                category: category.to_string(),
                code: code.clone(),
                name: display_name(item),
                source: Box::new(err),
            };

            let internal = *category == "IC" && code.starts_with(INTERNAL_ALIAS_PREFIX);
            if !internal && !is_emittable_uid(code) {
                return Err(wrap(SchemaError::InvalidRecord {
                    category: "symbol",
                    id: code.clone(),
                    reason: "codes must be exactly two decimal digits".to_string(),
                }));
            }

            let layer = compile_icon(code, item, block, constants).map_err(wrap)?;
            if !internal {
                layers.insert(code.clone(), layer);
            }
        }
    }

    let [icons, m1, m2] = compiled;
    Ok(SymbolSet {
        id: set_id.to_string(),
        number,
        name: set_name.to_string(),
        icons,
        m1,
        m2,
    })
}

fn display_name(item: &Value) -> String {
    item.get("names")
        .and_then(|names| names.get(0))
        .and_then(Value::as_str)
        .unwrap_or("<unnamed>")
        .to_string()
}

/// Compiles every set file and orders the sets by numeric id. Two files
/// declaring the same set id is an error.
pub fn compile_symbol_sets(
    paths: &[PathBuf],
    constants: &Constants,
) -> Result<Vec<SymbolSet>, SchemaError> {
    let mut seen: HashMap<u32, String> = HashMap::new();
    let mut sets = Vec::with_capacity(paths.len());
    for path in paths {
        let set = compile_symbol_set(path, constants)?;
        let origin = path.display().to_string();
        if let Some(first) = seen.insert(set.number, origin.clone()) {
            return Err(SchemaError::DuplicateSet {
                id: set.number,
                first,
                second: origin,
            });
        }
        sets.push(set);
    }
    sets.sort_by_key(|set| set.number);
    Ok(sets)
}
