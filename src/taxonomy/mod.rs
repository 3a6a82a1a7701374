//! Taxonomy model for the symbology constants.
//!
//! All records are built once by the [`resolver`] and are read-only lookup
//! tables afterwards. [`Constants`] is the aggregate root and is passed
//! explicitly to every compiler stage.

// ============================================================================
// IMPORTS
// ============================================================================

use std::fmt;

use indexmap::IndexMap;

use crate::SchemaError;

pub mod resolver;

pub use resolver::{load_constants, parse_constants, resolve_constants};

// ============================================================================
// ID CODES
// ============================================================================

/// Returns true if `key` is a non-empty hexadecimal string. A positive
/// `required_length` additionally pins the number of digits.
pub fn is_valid_hex_key(key: &str, required_length: usize) -> bool {
    if key.is_empty() {
        return false;
    }
    if required_length > 0 && key.chars().count() != required_length {
        return false;
    }
    key.chars().all(|c| c.is_ascii_hexdigit())
}

// ============================================================================
// RECORDS
// ============================================================================

/// A standard identity context (reality, exercise, simulation, ...).
#[derive(Debug, Clone, PartialEq)]
pub struct Context {
    /// One hexadecimal digit
    pub id_code: String,
    pub names: Vec<String>,
    /// The context this one belongs to; its own id when not declared
    pub base_context: String,
}

/// A standard identity affiliation.
#[derive(Debug, Clone, PartialEq)]
pub struct Affiliation {
    /// One hexadecimal digit
    pub id_code: String,
    pub names: Vec<String>,
    /// Color per color mode, in `Constants::color_modes` order. Empty when the
    /// affiliation borrows its colors through `color_id`.
    pub colors: IndexMap<String, String>,
    pub dashed: bool,
    pub has_civilian_variant: bool,
    /// Affiliation whose frames this one renders with
    pub frame_id: Option<String>,
    /// Affiliation whose colors this one renders with
    pub color_id: Option<String>,
}

impl Affiliation {
    /// The first display name. Validation guarantees one exists.
    pub fn primary_name(&self) -> &str {
        self.names.first().map(String::as_str).unwrap_or_default()
    }

    /// True when this affiliation draws its own frames: it has no
    /// `frame base`, or the `frame base` names itself.
    pub fn is_base(&self) -> bool {
        self.frame_id.as_ref().map_or(true, |f| *f == self.id_code)
    }
}

/// A dimension, which selects the frame shapes.
#[derive(Debug, Clone, PartialEq)]
pub struct Dimension {
    /// Human readable name for the dimension
    pub id_code: String,
    /// Frame shape tokens per frame key, after inheritance
    pub frames: IndexMap<String, Vec<String>>,
}

/// An operational status.
#[derive(Debug, Clone, PartialEq)]
pub struct Status {
    pub id_code: String,
    pub names: Vec<String>,
    pub dashed: bool,
}

/// A headquarters / task force / feint-dummy code.
#[derive(Debug, Clone, PartialEq)]
pub struct Hqtfd {
    pub id_code: String,
    pub names: Vec<String>,
    pub dashed: bool,
}

/// An amplifier (echelon, mobility, ...).
#[derive(Debug, Clone, PartialEq)]
pub struct Amplifier {
    /// Two hexadecimal digits
    pub id_code: String,
    pub names: Vec<String>,
    pub category: String,
    /// Dimension ids this amplifier may decorate
    pub applies_to: Vec<String>,
}

// ============================================================================
// CONSTANTS AGGREGATE
// ============================================================================

/// The resolved taxonomy.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Constants {
    pub contexts: IndexMap<String, Context>,
    pub affiliations: IndexMap<String, Affiliation>,
    pub dimensions: IndexMap<String, Dimension>,
    pub statuses: IndexMap<String, Status>,
    pub hqtfds: IndexMap<String, Hqtfd>,
    pub amplifiers: IndexMap<String, Amplifier>,
    /// Lower-cased, in declaration order
    pub color_modes: Vec<String>,
    /// Base affiliation ids in full-frame emission order
    pub full_frame_ordering: Vec<String>,
}

impl Constants {
    /// Follows `frame_id` references until an affiliation that draws its own
    /// frames is reached.
    pub fn base_frame_affiliation<'a>(
        &'a self,
        affiliation: &'a Affiliation,
    ) -> Result<&'a Affiliation, SchemaError> {
        self.follow_chain(affiliation, "frame base", |a| a.frame_id.as_deref())
    }

    /// Follows `color_id` references until an affiliation that owns its colors
    /// is reached.
    pub fn base_color_affiliation<'a>(
        &'a self,
        affiliation: &'a Affiliation,
    ) -> Result<&'a Affiliation, SchemaError> {
        self.follow_chain(affiliation, "color base", |a| a.color_id.as_deref())
    }

    fn follow_chain<'a>(
        &'a self,
        start: &'a Affiliation,
        field: &'static str,
        next: impl Fn(&Affiliation) -> Option<&str>,
    ) -> Result<&'a Affiliation, SchemaError> {
        let mut current = start;
        let mut chain = vec![start.id_code.clone()];
        while let Some(target) = next(current) {
            let found = self
                .affiliations
                .get(target)
                .ok_or_else(|| SchemaError::DanglingReference {
                    category: "affiliation",
                    id: current.id_code.clone(),
                    field,
                    target: target.to_string(),
                })?;
            // A self reference is a fixed point.
            if found.id_code == current.id_code {
                break;
            }
            if chain.contains(&found.id_code) {
                chain.push(found.id_code.clone());
                return Err(SchemaError::CyclicReference {
                    category: "affiliation",
                    chain,
                });
            }
            chain.push(found.id_code.clone());
            current = found;
        }
        Ok(current)
    }

    /// Base affiliations sorted by id code.
    pub fn base_affiliations(&self) -> Vec<&Affiliation> {
        let mut ret: Vec<&Affiliation> =
            self.affiliations.values().filter(|a| a.is_base()).collect();
        ret.sort_by(|a, b| a.id_code.cmp(&b.id_code));
        ret
    }

    /// The affiliations of `full_frame_ordering`, in order.
    pub fn full_frame_affiliations(&self) -> impl Iterator<Item = &Affiliation> + '_ {
        self.full_frame_ordering
            .iter()
            .filter_map(|id| self.affiliations.get(id))
    }

    /// Maps every display name of a full-frame affiliation to its id. This is
    /// the table full-frame element keys are resolved through. Resolution
    /// rejects a name shared by two of these affiliations, so each name maps
    /// to exactly one id.
    pub fn base_affiliation_names(&self) -> IndexMap<&str, &str> {
        let mut ret = IndexMap::new();
        for affiliation in self.full_frame_affiliations() {
            for name in &affiliation.names {
                ret.entry(name.as_str())
                    .or_insert(affiliation.id_code.as_str());
            }
        }
        ret
    }
}

// ============================================================================
// HUMAN-READABLE DUMP
// ============================================================================

fn quoted(names: &[String]) -> String {
    names
        .iter()
        .map(|n| format!("\"{}\"", n))
        .collect::<Vec<_>>()
        .join(", ")
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Context {} [{}]: ({})",
            self.id_code,
            self.base_context,
            quoted(&self.names)
        )
    }
}

impl fmt::Display for Affiliation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Affiliation {}: ({})", self.id_code, quoted(&self.names))?;
        if let Some(frame_id) = &self.frame_id {
            write!(f, " [Uses frame {}]", frame_id)?;
        }
        if let Some(color_id) = &self.color_id {
            write!(f, " [Uses color {}]", color_id)?;
        }
        if self.has_civilian_variant {
            write!(f, " +C")?;
        }
        Ok(())
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Dimension \"{}\"", self.id_code)?;
        for (key, shapes) in &self.frames {
            write!(f, " {}=[{}]", key, shapes.join(" "))?;
        }
        Ok(())
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Status {} ({})", self.id_code, self.names.join(" / "))
    }
}

impl fmt::Display for Hqtfd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HQTFD {} ({})", self.id_code, self.names.join(" / "))
    }
}

impl fmt::Display for Amplifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Amplifier {} [{}]: ({}) -> {}",
            self.id_code,
            self.category,
            quoted(&self.names),
            self.applies_to.join(", ")
        )
    }
}

impl fmt::Display for Constants {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn section<T: fmt::Display>(
            f: &mut fmt::Formatter<'_>,
            title: &str,
            items: impl Iterator<Item = T>,
        ) -> fmt::Result {
            writeln!(f, "\t{}:", title)?;
            for item in items {
                writeln!(f, "\t\t{}", item)?;
            }
            Ok(())
        }

        writeln!(f, "Constants set")?;
        section(f, "Contexts", self.contexts.values())?;
        section(f, "Color modes", self.color_modes.iter())?;
        section(f, "Affiliations", self.affiliations.values())?;
        section(
            f,
            "Full frame ordering",
            self.full_frame_affiliations().map(Affiliation::primary_name),
        )?;
        section(f, "Dimensions", self.dimensions.values())?;
        section(f, "Statuses", self.statuses.values())?;
        section(f, "Hqtfds", self.hqtfds.values())?;
        section(f, "Amplifiers", self.amplifiers.values())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn affiliation(id: &str, name: &str, frame_id: Option<&str>) -> Affiliation {
        Affiliation {
            id_code: id.to_string(),
            names: vec![name.to_string()],
            colors: IndexMap::new(),
            dashed: false,
            has_civilian_variant: true,
            frame_id: frame_id.map(str::to_string),
            color_id: None,
        }
    }

    fn constants_with(affiliations: Vec<Affiliation>) -> Constants {
        Constants {
            affiliations: affiliations
                .into_iter()
                .map(|a| (a.id_code.clone(), a))
                .collect(),
            ..Constants::default()
        }
    }

    #[test]
    fn test_hex_keys() {
        assert!(is_valid_hex_key("a", 1));
        assert!(is_valid_hex_key("F", 1));
        assert!(is_valid_hex_key("1f", 2));
        assert!(is_valid_hex_key("123", 0));
        assert!(!is_valid_hex_key("g", 1));
        assert!(!is_valid_hex_key("", 0));
        assert!(!is_valid_hex_key("12", 1));
        assert!(!is_valid_hex_key("1", 2));
    }

    #[test]
    fn test_frame_chain_walks_to_fixed_point() {
        let constants = constants_with(vec![
            affiliation("3", "friend", None),
            affiliation("2", "assumed friend", Some("3")),
            affiliation("9", "exercise assumed friend", Some("2")),
        ]);
        let start = &constants.affiliations["9"];
        let base = constants.base_frame_affiliation(start).unwrap();
        assert_eq!(base.id_code, "3");
    }

    #[test]
    fn test_frame_chain_cycle_is_rejected() {
        let constants = constants_with(vec![
            affiliation("1", "one", Some("2")),
            affiliation("2", "two", Some("1")),
        ]);
        let err = constants
            .base_frame_affiliation(&constants.affiliations["1"])
            .unwrap_err();
        let SchemaError::CyclicReference { chain, .. } = err else {
            panic!("expected a cycle error");
        };
        assert_eq!(chain, vec!["1", "2", "1"]);
    }

    #[test]
    fn test_base_affiliations_sorted_by_id() {
        let constants = constants_with(vec![
            affiliation("6", "hostile", None),
            affiliation("3", "friend", None),
            affiliation("2", "assumed friend", Some("3")),
        ]);
        let ids: Vec<&str> = constants
            .base_affiliations()
            .iter()
            .map(|a| a.id_code.as_str())
            .collect();
        assert_eq!(ids, vec!["3", "6"]);
    }

    #[test]
    fn test_self_frame_base_is_base() {
        let constants = constants_with(vec![
            affiliation("4", "neutral", Some("4")),
            affiliation("2", "assumed friend", Some("3")),
            affiliation("3", "friend", None),
        ]);
        assert!(constants.affiliations["4"].is_base());
        let ids: Vec<&str> = constants
            .base_affiliations()
            .iter()
            .map(|a| a.id_code.as_str())
            .collect();
        assert_eq!(ids, vec!["3", "4"]);
    }

    #[test]
    fn test_display_dump_lists_categories() {
        let mut constants = constants_with(vec![affiliation("3", "friend", None)]);
        constants.color_modes = vec!["light".to_string()];
        let dump = constants.to_string();
        assert!(dump.starts_with("Constants set"));
        assert!(dump.contains("Affiliation 3: (\"friend\") +C"));
        assert!(dump.contains("\t\tlight"));
    }
}
