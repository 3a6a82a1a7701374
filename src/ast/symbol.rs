//! Compiled symbol layers and symbol sets.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::Element;

/// A full symbol component (an entity or a modifier).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolLayer {
    /// Two-digit code, unique within its category
    pub uid: String,
    /// Human-readable names; the first one names generated identifiers
    pub names: Vec<String>,
    pub elements: Vec<Element>,
    /// Tells the renderer to use civilian coloring regardless of affiliation
    pub civilian: bool,
}

impl SymbolLayer {
    pub fn primary_name(&self) -> &str {
        self.names.first().map(String::as_str).unwrap_or_default()
    }
}

/// An entire symbol set with entities and two sets of modifiers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolSet {
    /// Set code as written in the source, e.g. "05"
    pub id: String,
    /// Numeric value of `id`
    pub number: u32,
    pub name: String,
    pub icons: IndexMap<String, SymbolLayer>,
    pub m1: IndexMap<String, SymbolLayer>,
    pub m2: IndexMap<String, SymbolLayer>,
}

impl SymbolSet {
    /// The three categories in emission order, with their source keys.
    pub fn categories(&self) -> [(&'static str, &IndexMap<String, SymbolLayer>); 3] {
        [("IC", &self.icons), ("M1", &self.m1), ("M2", &self.m2)]
    }

    /// Numeric code of one of this set's layers.
    pub fn code_for(&self, layer: &SymbolLayer) -> Option<u32> {
        symbol_code(&self.id, &layer.uid)
    }
}

/// Numeric code of a symbol: the decimal concatenation of the set number and
/// the two-digit uid. Set "05" with uid "12" is 512, set "12" with uid "00" is
/// 1200. Returns `None` when either part is not decimal.
pub fn symbol_code(set_id: &str, uid: &str) -> Option<u32> {
    let set: u32 = set_id.parse().ok()?;
    let uid: u32 = uid.parse().ok()?;
    if uid > 99 {
        return None;
    }
    format!("{}{:02}", set, uid).parse().ok()
}
