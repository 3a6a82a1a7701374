//! Shared fixtures for the integration tests.
//!
//! The taxonomy mirrors a trimmed-down real constants file: four base
//! affiliations drawing their own frames, three derived ones, four color
//! modes and a two-level dimension hierarchy.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use milsymbol_schema::ast::{Element, SymbolSet};
use milsymbol_schema::compiler::{compile_element, compile_symbol_set_source};
use milsymbol_schema::taxonomy::{parse_constants, resolve_constants, Constants};
use milsymbol_schema::SchemaError;
use serde_json::{json, Map, Value};

pub const FIXTURES: &str = "tests/fixtures";

pub fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join(FIXTURES).join(name)
}

/// The taxonomy as a JSON value, for tests that tweak one field.
pub fn constants_value() -> Value {
    json!({
        "contexts": {
            "0": {"names": ["Reality"]},
            "1": {"names": ["Exercise"], "base context": "0"},
            "2": {"names": ["Simulation"], "base context": "0"}
        },
        "color modes": ["Light", "Medium", "Dark", "Unfilled"],
        "affiliations": {
            "0": {"names": ["Pending"], "frame base": "1", "color base": "1", "dashed": true},
            "1": {
                "names": ["Unknown"],
                "colors": {"light": "#FFFF80", "medium": "#FFFF00", "dark": "#E1DC00", "unfilled": "#FFFF00"}
            },
            "2": {"names": ["Assumed friend"], "frame base": "3", "color base": "3", "dashed": true},
            "3": {
                "names": ["Friend", "Friendly"],
                "colors": {"light": "#80E0FF", "medium": "#00A8DC", "dark": "#006B8C", "unfilled": "#00A8DC"}
            },
            "4": {
                "names": ["Neutral"],
                "colors": {"light": "#AAFFAA", "medium": "#00E200", "dark": "#00A000", "unfilled": "#00E200"}
            },
            "5": {"names": ["Suspect"], "frame base": "6", "color base": "6", "dashed": true},
            "6": {
                "names": ["Hostile", "Enemy"],
                "colors": {"light": "#FF8080", "medium": "#FF0000", "dark": "#C80000", "unfilled": "#FF0000"},
                "has civilian variant": false
            }
        },
        "full frame ordering": ["Friend", "Hostile", "Neutral", "Unknown"],
        "dimensions": {
            "Land unit": {
                "frames": {"3": ["rect"], "6": ["diamond"], "4": ["square"], "1": ["quatrefoil"]}
            },
            "Land equipment": {
                "frame base": "Land unit",
                "frames": {"3": ["circle"]},
                "decorators": {"6": ["dot"], "9": ["bar"]}
            },
            "Land installation": {
                "frame base": "Land equipment",
                "decorators": {"3": ["tower"]}
            }
        },
        "statuses": {
            "0": {"names": ["Present"]},
            "1": {"names": ["Planned"], "dashed": true}
        },
        "hqtfds": {
            "0": {"names": ["Not applicable"]},
            "2": {"names": ["Headquarters"]}
        },
        "amplifiers": {
            "11": {"names": ["Team", "Crew"], "category": "echelon", "applies to": ["Land unit"]}
        }
    })
}

pub fn constants() -> Constants {
    resolve_constants(&constants_value()).expect("fixture taxonomy resolves")
}

/// Resolves a taxonomy after applying `edit` to the fixture document.
pub fn constants_with(edit: impl FnOnce(&mut Value)) -> Result<Constants, SchemaError> {
    let mut value = constants_value();
    edit(&mut value);
    parse_constants(&value.to_string())
}

/// Compiles one element against a category block.
pub fn compile(item: Value, siblings: Value) -> Result<Vec<Element>, SchemaError> {
    let constants = constants();
    let siblings: Map<String, Value> = siblings.as_object().cloned().unwrap_or_default();
    compile_element(&item, &siblings, &constants)
}

/// Compiles a set document given as a JSON value.
pub fn compile_set(document: Value) -> Result<SymbolSet, SchemaError> {
    compile_symbol_set_source("inline.json", &document.to_string(), &constants())
}

/// A full-frame body covering every ordered affiliation with one path each.
pub fn full_frame_body() -> Value {
    json!({
        "Friend": [{"d": "M0,0 L1,1"}],
        "Hostile": [{"d": "M0,0 L2,2"}],
        "Neutral": [{"d": "M0,0 L3,3"}],
        "Unknown": [{"d": "M0,0 L4,4"}]
    })
}
