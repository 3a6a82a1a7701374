//! Constants resolver.
//!
//! Builds [`Constants`] from the taxonomy JSON document. Loading is fail-fast:
//! the first invalid record aborts the whole resolution, so a caller either
//! gets a complete taxonomy or an error.

use std::path::Path;

use indexmap::IndexMap;
use serde_json::{Map, Value};
use tracing::{debug, info};

use super::{
    is_valid_hex_key, Affiliation, Amplifier, Constants, Context, Dimension, Hqtfd, Status,
};
use crate::{source, SchemaError};

/// Keys every taxonomy document must define.
pub const REQUIRED_KEYS: [&str; 5] = [
    "contexts",
    "affiliations",
    "color modes",
    "dimensions",
    "full frame ordering",
];

const DOCUMENT: &str = "the constants file";

// =============================
// Public API
// =============================

/// Reads, comment-strips and resolves a taxonomy file.
pub fn load_constants<P: AsRef<Path>>(path: P) -> Result<Constants, SchemaError> {
    info!("Parsing constant file \"{}\"", path.as_ref().display());
    let document = source::read_document(path)?;
    resolve_constants(&document)
}

/// Resolves a taxonomy from JSON source text.
pub fn parse_constants(source: &str) -> Result<Constants, SchemaError> {
    let document = source::parse_document("constants", source)?;
    resolve_constants(&document)
}

/// Resolves a taxonomy from an already parsed JSON document.
pub fn resolve_constants(document: &Value) -> Result<Constants, SchemaError> {
    let root = document
        .as_object()
        .ok_or_else(|| invalid("document", "constants", "top level must be an object"))?;

    for key in REQUIRED_KEYS {
        if !root.contains_key(key) {
            return Err(SchemaError::MissingKey {
                key: key.to_string(),
                document: DOCUMENT.to_string(),
            });
        }
    }

    let mut constants = Constants::default();

    for (id, record) in object(root, "contexts")? {
        let context = context_from_json(id, record)?;
        constants.contexts.insert(context.id_code.clone(), context);
    }

    for mode in list(root, "color modes")? {
        let mode = mode
            .as_str()
            .ok_or_else(|| invalid("color mode", &mode.to_string(), "must be a string"))?;
        constants.color_modes.push(mode.to_lowercase());
    }

    for (id, record) in object(root, "affiliations")? {
        let affiliation = affiliation_from_json(id, record, &constants.color_modes)?;
        constants
            .affiliations
            .insert(affiliation.id_code.clone(), affiliation);
    }
    check_affiliation_references(&constants)?;

    constants.full_frame_ordering = resolve_full_frame_ordering(
        &constants,
        list(root, "full frame ordering")?,
    )?;
    check_full_frame_names(&constants)?;

    let raw_dimensions = object(root, "dimensions")?;
    for id in raw_dimensions.keys() {
        let frames = resolve_dimension_frames(id, raw_dimensions, &mut Vec::new())?;
        constants.dimensions.insert(
            id.clone(),
            Dimension {
                id_code: id.clone(),
                frames,
            },
        );
    }

    if let Some(statuses) = optional_object(root, "statuses")? {
        for (id, record) in statuses {
            let status = status_from_json(id, record)?;
            constants.statuses.insert(status.id_code.clone(), status);
        }
    }

    if let Some(hqtfds) = optional_object(root, "hqtfds")? {
        for (id, record) in hqtfds {
            let hqtfd = hqtfd_from_json(id, record)?;
            constants.hqtfds.insert(hqtfd.id_code.clone(), hqtfd);
        }
    }

    if let Some(amplifiers) = optional_object(root, "amplifiers")? {
        for (id, record) in amplifiers {
            let amplifier = amplifier_from_json(id, record, &constants)?;
            constants
                .amplifiers
                .insert(amplifier.id_code.clone(), amplifier);
        }
    }

    debug!("{}", constants);
    Ok(constants)
}

// =============================
// Record loaders
// =============================

fn context_from_json(id: &str, record: &Value) -> Result<Context, SchemaError> {
    const CATEGORY: &str = "context";
    require_hex_id(CATEGORY, id, 1)?;
    let record = record_object(CATEGORY, id, record)?;
    let names = names(CATEGORY, id, record, false)?;
    let base_context = match record.get("base context") {
        Some(value) => string(CATEGORY, id, "base context", value)?,
        None => id.to_string(),
    };
    Ok(Context {
        id_code: id.to_string(),
        names,
        base_context,
    })
}

fn affiliation_from_json(
    id: &str,
    record: &Value,
    color_modes: &[String],
) -> Result<Affiliation, SchemaError> {
    const CATEGORY: &str = "affiliation";
    require_hex_id(CATEGORY, id, 1)?;
    let record = record_object(CATEGORY, id, record)?;
    let names = names(CATEGORY, id, record, true)?;

    let mut colors = IndexMap::new();
    if let Some(raw) = record.get("colors") {
        let raw = raw
            .as_object()
            .ok_or_else(|| invalid(CATEGORY, id, "`colors` must be an object"))?;
        let missing: Vec<String> = color_modes
            .iter()
            .filter(|mode| !raw.contains_key(mode.as_str()))
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(SchemaError::IncompleteColorSet {
                affiliation: id.to_string(),
                missing,
            });
        }
        for mode in color_modes {
            let value = match &raw[mode.as_str()] {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            colors.insert(mode.clone(), value);
        }
    }

    Ok(Affiliation {
        id_code: id.to_string(),
        names,
        colors,
        dashed: flag(CATEGORY, id, record, "dashed", false)?,
        has_civilian_variant: flag(CATEGORY, id, record, "has civilian variant", true)?,
        frame_id: optional_reference(CATEGORY, id, record, "frame base")?,
        color_id: optional_reference(CATEGORY, id, record, "color base")?,
    })
}

fn status_from_json(id: &str, record: &Value) -> Result<Status, SchemaError> {
    const CATEGORY: &str = "status";
    require_hex_id(CATEGORY, id, 1)?;
    let record = record_object(CATEGORY, id, record)?;
    Ok(Status {
        id_code: id.to_string(),
        names: names(CATEGORY, id, record, true)?,
        dashed: flag(CATEGORY, id, record, "dashed", false)?,
    })
}

fn hqtfd_from_json(id: &str, record: &Value) -> Result<Hqtfd, SchemaError> {
    const CATEGORY: &str = "HQTFD";
    require_hex_id(CATEGORY, id, 1)?;
    let record = record_object(CATEGORY, id, record)?;
    Ok(Hqtfd {
        id_code: id.to_string(),
        names: names(CATEGORY, id, record, true)?,
        dashed: flag(CATEGORY, id, record, "dashed", false)?,
    })
}

fn amplifier_from_json(
    id: &str,
    record: &Value,
    constants: &Constants,
) -> Result<Amplifier, SchemaError> {
    const CATEGORY: &str = "amplifier";
    require_hex_id(CATEGORY, id, 2)?;
    let record = record_object(CATEGORY, id, record)?;
    let names = names(CATEGORY, id, record, true)?;
    let category = match record.get("category") {
        Some(value) => string(CATEGORY, id, "category", value)?,
        None => String::new(),
    };

    let mut applies_to = Vec::new();
    if let Some(raw) = record.get("applies to") {
        let raw = raw
            .as_array()
            .ok_or_else(|| invalid(CATEGORY, id, "`applies to` must be a list"))?;
        for dimension in raw {
            let dimension = string(CATEGORY, id, "applies to", dimension)?;
            if !constants.dimensions.contains_key(&dimension) {
                return Err(SchemaError::DanglingReference {
                    category: CATEGORY,
                    id: id.to_string(),
                    field: "dimension",
                    target: dimension,
                });
            }
            applies_to.push(dimension);
        }
    }

    Ok(Amplifier {
        id_code: id.to_string(),
        names,
        category,
        applies_to,
    })
}

// =============================
// Cross-record resolution
// =============================

/// Every `frame base` / `color base` must name an affiliation, and frame
/// chains must terminate.
fn check_affiliation_references(constants: &Constants) -> Result<(), SchemaError> {
    for affiliation in constants.affiliations.values() {
        let references = [
            ("frame base", &affiliation.frame_id),
            ("color base", &affiliation.color_id),
        ];
        for (field, target) in references {
            if let Some(target) = target {
                if !constants.affiliations.contains_key(target) {
                    return Err(SchemaError::DanglingReference {
                        category: "affiliation",
                        id: affiliation.id_code.clone(),
                        field,
                        target: target.clone(),
                    });
                }
            }
        }
        constants.base_frame_affiliation(affiliation)?;
        constants.base_color_affiliation(affiliation)?;
    }
    Ok(())
}

fn resolve_full_frame_ordering(
    constants: &Constants,
    ordering: &[Value],
) -> Result<Vec<String>, SchemaError> {
    let base_affiliations = constants.base_affiliations();
    let mut ret = Vec::with_capacity(ordering.len());
    for item in ordering {
        let name = item.as_str().ok_or_else(|| SchemaError::UnmatchedOrdering {
            name: item.to_string(),
        })?;
        let affiliation = base_affiliations
            .iter()
            .find(|a| a.primary_name() == name)
            .ok_or_else(|| SchemaError::UnmatchedOrdering {
                name: name.to_string(),
            })?;
        if ret.contains(&affiliation.id_code) {
            return Err(SchemaError::DuplicateOrdering {
                name: name.to_string(),
            });
        }
        ret.push(affiliation.id_code.clone());
    }
    Ok(ret)
}

/// Full-frame keys are looked up by display name, so no name may belong to
/// two affiliations of the ordering.
fn check_full_frame_names(constants: &Constants) -> Result<(), SchemaError> {
    let mut owners: IndexMap<&str, &str> = IndexMap::new();
    for affiliation in constants.full_frame_affiliations() {
        for name in &affiliation.names {
            let id = affiliation.id_code.as_str();
            match owners.get(name.as_str()) {
                Some(&first) if first != id => {
                    return Err(SchemaError::AmbiguousAffiliationName {
                        name: name.clone(),
                        first: first.to_string(),
                        second: id.to_string(),
                    });
                }
                Some(_) => {}
                None => {
                    owners.insert(name.as_str(), id);
                }
            }
        }
    }
    Ok(())
}

/// Resolves one dimension's frames: the `frame base` dimension's frames first,
/// then own `frames` by replacement, then own `decorators` appended.
/// `visiting` holds the ids on the current inheritance path.
fn resolve_dimension_frames(
    id: &str,
    dimensions: &Map<String, Value>,
    visiting: &mut Vec<String>,
) -> Result<IndexMap<String, Vec<String>>, SchemaError> {
    const CATEGORY: &str = "dimension";
    if visiting.iter().any(|v| v == id) {
        let mut chain = visiting.clone();
        chain.push(id.to_string());
        return Err(SchemaError::CyclicReference {
            category: CATEGORY,
            chain,
        });
    }
    let record = dimensions
        .get(id)
        .ok_or_else(|| SchemaError::DanglingReference {
            category: CATEGORY,
            id: visiting.last().cloned().unwrap_or_default(),
            field: "frame base",
            target: id.to_string(),
        })?;
    let record = record_object(CATEGORY, id, record)?;

    visiting.push(id.to_string());
    let mut frames = match record.get("frame base") {
        Some(base) => {
            let base = string(CATEGORY, id, "frame base", base)?;
            resolve_dimension_frames(&base, dimensions, visiting)?
        }
        None => IndexMap::new(),
    };
    visiting.pop();

    if let Some(own) = record.get("frames") {
        for (key, shapes) in frame_lists(id, "frames", own)? {
            frames.insert(key, shapes);
        }
    }
    if let Some(decorators) = record.get("decorators") {
        for (key, shapes) in frame_lists(id, "decorators", decorators)? {
            frames.entry(key).or_default().extend(shapes);
        }
    }
    Ok(frames)
}

fn frame_lists(
    id: &str,
    field: &str,
    value: &Value,
) -> Result<Vec<(String, Vec<String>)>, SchemaError> {
    const CATEGORY: &str = "dimension";
    let value = value
        .as_object()
        .ok_or_else(|| invalid(CATEGORY, id, &format!("`{}` must be an object", field)))?;
    value
        .iter()
        .map(|(key, shapes)| -> Result<(String, Vec<String>), SchemaError> {
            let reason = format!("`{}.{}` must be a list", field, key);
            let shapes = shapes
                .as_array()
                .ok_or_else(|| invalid(CATEGORY, id, &reason))?
                .iter()
                .map(|shape| string(CATEGORY, id, field, shape))
                .collect::<Result<Vec<_>, _>>()?;
            Ok((key.clone(), shapes))
        })
        .collect()
}

// =============================
// Field helpers
// =============================

fn invalid(category: &'static str, id: &str, reason: &str) -> SchemaError {
    SchemaError::InvalidRecord {
        category,
        id: id.to_string(),
        reason: reason.to_string(),
    }
}

fn require_hex_id(category: &'static str, id: &str, length: usize) -> Result<(), SchemaError> {
    if is_valid_hex_key(id, length) {
        Ok(())
    } else {
        Err(invalid(
            category,
            id,
            &format!("id must be exactly {} hexadecimal digit(s)", length),
        ))
    }
}

fn object<'a>(
    root: &'a Map<String, Value>,
    key: &str,
) -> Result<&'a Map<String, Value>, SchemaError> {
    root[key]
        .as_object()
        .ok_or_else(|| invalid("document", key, "must be an object"))
}

fn optional_object<'a>(
    root: &'a Map<String, Value>,
    key: &str,
) -> Result<Option<&'a Map<String, Value>>, SchemaError> {
    match root.get(key) {
        Some(_) => object(root, key).map(Some),
        None => Ok(None),
    }
}

fn list<'a>(root: &'a Map<String, Value>, key: &str) -> Result<&'a [Value], SchemaError> {
    root[key]
        .as_array()
        .map(Vec::as_slice)
        .ok_or_else(|| invalid("document", key, "must be a list"))
}

fn record_object<'a>(
    category: &'static str,
    id: &str,
    record: &'a Value,
) -> Result<&'a Map<String, Value>, SchemaError> {
    record
        .as_object()
        .ok_or_else(|| invalid(category, id, "record must be an object"))
}

fn string(
    category: &'static str,
    id: &str,
    field: &str,
    value: &Value,
) -> Result<String, SchemaError> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| invalid(category, id, &format!("`{}` must be a string", field)))
}

fn names(
    category: &'static str,
    id: &str,
    record: &Map<String, Value>,
    non_empty: bool,
) -> Result<Vec<String>, SchemaError> {
    let raw = record
        .get("names")
        .ok_or_else(|| invalid(category, id, "missing `names`"))?
        .as_array()
        .ok_or_else(|| invalid(category, id, "`names` must be a list"))?;
    let names = raw
        .iter()
        .map(|name| string(category, id, "names", name))
        .collect::<Result<Vec<_>, _>>()?;
    if non_empty && names.is_empty() {
        return Err(invalid(category, id, "`names` must not be empty"));
    }
    Ok(names)
}

fn flag(
    category: &'static str,
    id: &str,
    record: &Map<String, Value>,
    field: &str,
    default: bool,
) -> Result<bool, SchemaError> {
    match record.get(field) {
        None => Ok(default),
        Some(Value::Bool(b)) => Ok(*b),
        Some(_) => Err(invalid(category, id, &format!("`{}` must be a boolean", field))),
    }
}

fn optional_reference(
    category: &'static str,
    id: &str,
    record: &Map<String, Value>,
    field: &str,
) -> Result<Option<String>, SchemaError> {
    match record.get(field) {
        None => Ok(None),
        Some(value) => {
            let target = string(category, id, field, value)?;
            Ok(if target.is_empty() { None } else { Some(target) })
        }
    }
}
