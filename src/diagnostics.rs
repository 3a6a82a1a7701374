//!
//! Unified, `miette`-based diagnostics for the schema compiler.
//!
//! Every failure in the pipeline is a [`SchemaError`]. Errors fall into four
//! coarse classes (see [`ErrorType`]):
//!
//! - **Source**: the file could not be read, walked, or parsed as JSON.
//! - **Config**: the taxonomy is malformed or incomplete. Always fatal to the run.
//! - **Element**: an icon's JSON could not be compiled. Fatal to the icon, and
//!   therefore to the whole set file that owns it.
//! - **Emit**: the code emitter could not produce an artifact.
//!
//! Element errors raised while compiling a set file are wrapped in
//! [`SchemaError::Item`] so the report names the set, category, code and
//! display name of the offending entry.
//!
//! # Error Construction
//!
//! - Use `shape_err!` for element-shape errors:
//!   `shape_err!("full-frame key '{}' is not a base affiliation", key)`
//! - Construct the other variants directly; they carry structured fields.

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Type-safe error classification that corresponds to `SchemaError` variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorType {
    /// I/O, directory walking, JSON syntax
    Source,
    /// Taxonomy and set-level configuration errors
    Config,
    /// Element compilation errors
    Element,
    /// Code emission errors
    Emit,
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::Source => "source",
            ErrorType::Config => "config",
            ErrorType::Element => "element",
            ErrorType::Emit => "emit",
        }
    }
}

impl std::fmt::Display for ErrorType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Unified error type for all schema compiler failure modes.
#[derive(Error, Diagnostic, Debug)]
pub enum SchemaError {
    // ------------------------------------------------------------------
    // Source errors
    // ------------------------------------------------------------------
    #[error("failed to read '{path}'")]
    #[diagnostic(
        code(milsymbol::source::io),
        help("Check that the file exists and is readable.")
    )]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed JSON in '{path}': {message}")]
    #[diagnostic(code(milsymbol::source::json))]
    Json {
        path: String,
        message: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("here")]
        span: SourceSpan,
    },

    #[error("failed to walk '{path}': {message}")]
    #[diagnostic(code(milsymbol::source::discovery))]
    Discovery { path: String, message: String },

    // ------------------------------------------------------------------
    // Configuration errors
    // ------------------------------------------------------------------
    #[error("required key \"{key}\" not found in {document}")]
    #[diagnostic(code(milsymbol::config::missing_key))]
    MissingKey { key: String, document: String },

    #[error("invalid {category} record '{id}': {reason}")]
    #[diagnostic(code(milsymbol::config::invalid_record))]
    InvalidRecord {
        category: &'static str,
        id: String,
        reason: String,
    },

    #[error("affiliation '{affiliation}' is missing color modes [{}]", .missing.join(", "))]
    #[diagnostic(
        code(milsymbol::config::incomplete_color_set),
        help("A `colors` block must define every entry of `color modes`.")
    )]
    IncompleteColorSet {
        affiliation: String,
        missing: Vec<String>,
    },

    #[error("{category} '{id}' references undefined {field} '{target}'")]
    #[diagnostic(code(milsymbol::config::dangling_reference))]
    DanglingReference {
        category: &'static str,
        id: String,
        field: &'static str,
        target: String,
    },

    #[error("cyclic {category} reference: {}", .chain.join(" -> "))]
    #[diagnostic(code(milsymbol::config::cyclic_reference))]
    CyclicReference {
        category: &'static str,
        chain: Vec<String>,
    },

    #[error("full frame ordering entry \"{name}\" matches no base affiliation")]
    #[diagnostic(
        code(milsymbol::config::unmatched_ordering),
        help("Entries must equal the first display name of a base affiliation (no `frame base`, or one naming itself).")
    )]
    UnmatchedOrdering { name: String },

    #[error("full frame ordering names affiliation '{name}' more than once")]
    #[diagnostic(
        code(milsymbol::config::duplicate_ordering),
        help("Each base affiliation gets exactly one full-frame bucket.")
    )]
    DuplicateOrdering { name: String },

    #[error("display name '{name}' is shared by full-frame affiliations {first} and {second}")]
    #[diagnostic(code(milsymbol::config::ambiguous_affiliation_name))]
    AmbiguousAffiliationName {
        name: String,
        first: String,
        second: String,
    },

    #[error("symbol set id '{id}' is declared by both '{first}' and '{second}'")]
    #[diagnostic(code(milsymbol::config::duplicate_set))]
    DuplicateSet {
        id: u32,
        first: String,
        second: String,
    },

    #[error("generated identifier {identifier} is produced by both \"{first}\" and \"{second}\"")]
    #[diagnostic(
        code(milsymbol::config::identifier_collision),
        help("Rename one of the entries so their sanitized names differ.")
    )]
    IdentifierCollision {
        identifier: String,
        first: String,
        second: String,
    },

    // ------------------------------------------------------------------
    // Element errors
    // ------------------------------------------------------------------
    #[error("invalid element shape: {reason}")]
    #[diagnostic(code(milsymbol::element::invalid_shape))]
    InvalidElementShape { reason: String },

    #[error("unknown icon alias \"{name}\"")]
    #[diagnostic(
        code(milsymbol::element::unknown_alias),
        help("Aliases must name another entry with an `icon` list in the same category.")
    )]
    UnknownAlias { name: String },

    #[error("icon alias \"{name}\" expands to no elements")]
    #[diagnostic(code(milsymbol::element::empty_alias))]
    EmptyAlias { name: String },

    #[error("icon alias cycle: {}", .chain.join(" -> "))]
    #[diagnostic(code(milsymbol::element::alias_cycle))]
    AliasCycle { chain: Vec<String> },

    #[error("unrecognized color {token}")]
    #[diagnostic(
        code(milsymbol::element::bad_color),
        help("Colors must be a boolean, \"none\", or one of icon, icon_fill, white, yellow.")
    )]
    BadColor { token: String },

    #[error("unable to process {set}:{category}:{code} ({name})")]
    #[diagnostic(code(milsymbol::symbol::item))]
    Item {
        set: String,
        category: String,
        code: String,
        name: String,
        #[source]
        source: Box<SchemaError>,
    },

    // ------------------------------------------------------------------
    // Emission errors
    // ------------------------------------------------------------------
    #[error("font engine failed: {message}")]
    #[diagnostic(code(milsymbol::emit::font_engine))]
    FontEngine { message: String },

    #[error("failed to serialize {what}: {message}")]
    #[diagnostic(code(milsymbol::emit::serialize))]
    Serialize { what: String, message: String },
}

impl SchemaError {
    /// Returns the type-safe error classification for this error.
    pub fn error_type(&self) -> ErrorType {
        match self {
            SchemaError::Io { .. } | SchemaError::Json { .. } | SchemaError::Discovery { .. } => {
                ErrorType::Source
            }
            SchemaError::MissingKey { .. }
            | SchemaError::InvalidRecord { .. }
            | SchemaError::IncompleteColorSet { .. }
            | SchemaError::DanglingReference { .. }
            | SchemaError::CyclicReference { .. }
            | SchemaError::UnmatchedOrdering { .. }
            | SchemaError::DuplicateOrdering { .. }
            | SchemaError::AmbiguousAffiliationName { .. }
            | SchemaError::DuplicateSet { .. }
            | SchemaError::IdentifierCollision { .. } => ErrorType::Config,
            SchemaError::InvalidElementShape { .. }
            | SchemaError::UnknownAlias { .. }
            | SchemaError::EmptyAlias { .. }
            | SchemaError::AliasCycle { .. }
            | SchemaError::BadColor { .. } => ErrorType::Element,
            SchemaError::Item { source, .. } => source.error_type(),
            SchemaError::FontEngine { .. } | SchemaError::Serialize { .. } => ErrorType::Emit,
        }
    }

    /// Strips any `Item` wrappers and returns the error that caused them.
    pub fn root(&self) -> &SchemaError {
        match self {
            SchemaError::Item { source, .. } => source.root(),
            other => other,
        }
    }

    /// Builds a `Json` error pointing at the line and column serde reported.
    pub fn json(path: impl Into<String>, source: &str, err: &serde_json::Error) -> Self {
        let path = path.into();
        let offset = line_col_to_offset(source, err.line(), err.column());
        SchemaError::Json {
            message: err.to_string(),
            src: NamedSource::new(path.clone(), source.to_string()),
            span: SourceSpan::from((offset, 1)),
            path,
        }
    }
}

/// Converts a 1-based line and column into a byte offset, clamped to the source.
fn line_col_to_offset(source: &str, line: usize, column: usize) -> usize {
    if line == 0 {
        return 0;
    }
    let line_start: usize = source
        .split_inclusive('\n')
        .take(line - 1)
        .map(str::len)
        .sum();
    (line_start + column.saturating_sub(1)).min(source.len().saturating_sub(1))
}

/// Constructs a `SchemaError::InvalidElementShape` with a formatted reason.
#[macro_export]
macro_rules! shape_err {
    ($($arg:tt)*) => {
        $crate::SchemaError::InvalidElementShape {
            reason: format!($($arg)*),
        }
    };
}

#[cfg(test)]
mod diagnostics_tests {
    use miette::Report;

    use super::*;

    #[test]
    fn test_item_wrapper_keeps_root_and_type() {
        let err = SchemaError::Item {
            set: "10".to_string(),
            category: "IC".to_string(),
            code: "11".to_string(),
            name: "infantry".to_string(),
            source: Box::new(SchemaError::BadColor {
                token: "\"purple\"".to_string(),
            }),
        };
        assert_eq!(err.error_type(), ErrorType::Element);
        assert!(matches!(err.root(), SchemaError::BadColor { .. }));

        let output = format!("{:?}", Report::new(err));
        assert!(output.contains("10:IC:11"));
        assert!(output.contains("purple"));
    }

    #[test]
    fn test_json_error_points_into_source() {
        let source = "{\n  \"set\": \"10\",\n  \"name\": \n}";
        let err = serde_json::from_str::<serde_json::Value>(source).unwrap_err();
        let schema_err = SchemaError::json("broken.json", source, &err);
        assert_eq!(schema_err.error_type(), ErrorType::Source);

        let SchemaError::Json { span, .. } = &schema_err else {
            panic!("expected a JSON error");
        };
        assert!(span.offset() > source.find("name").unwrap());

        let output = format!("{:?}", Report::new(schema_err));
        assert!(output.contains("broken.json"));
    }

    #[test]
    fn test_offset_is_clamped() {
        assert_eq!(line_col_to_offset("ab\ncd", 2, 2), 4);
        assert_eq!(line_col_to_offset("ab", 9, 9), 1);
        assert_eq!(line_col_to_offset("ab", 0, 0), 0);
    }

    #[test]
    fn test_shape_err_macro() {
        let err = shape_err!("bad key {}", "purple");
        assert_eq!(err.to_string(), "invalid element shape: bad key purple");
    }
}
