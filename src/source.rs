//! Reading JSON source documents.
//!
//! Taxonomy and symbol-set files are JSON with one extension: any line whose
//! first non-blank character is `#` is a comment. Comment lines are blanked
//! (not removed) so serde's line numbers still match the file on disk.

use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::SchemaError;

static COMMENT_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^[ \t]*#[^\n]*$").expect("comment pattern is a valid regex")
});

/// Blanks every comment line in `source`.
pub fn strip_comments(source: &str) -> String {
    COMMENT_LINE.replace_all(source, "").into_owned()
}

/// Parses a comment-stripped JSON document. `name` labels diagnostics.
pub fn parse_document(name: &str, source: &str) -> Result<Value, SchemaError> {
    let stripped = strip_comments(source);
    serde_json::from_str(&stripped).map_err(|e| SchemaError::json(name, &stripped, &e))
}

/// Reads and parses a JSON document from disk. The file handle lives only for
/// the duration of the read.
pub fn read_document<P: AsRef<Path>>(path: P) -> Result<Value, SchemaError> {
    let path_str = path.as_ref().display().to_string();
    let source = std::fs::read_to_string(path.as_ref()).map_err(|e| SchemaError::Io {
        path: path_str.clone(),
        source: e,
    })?;
    parse_document(&path_str, &source)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comment_lines_are_blanked() {
        let source = "# header\n{\n  # inner\n  \"a\": 1\n}\n";
        let stripped = strip_comments(source);
        assert_eq!(stripped, "\n{\n\n  \"a\": 1\n}\n");
        assert_eq!(stripped.lines().count(), source.lines().count());
    }

    #[test]
    fn test_hash_inside_values_is_kept() {
        let value = parse_document("inline", "{\"color\": \"#FF0000\"}").unwrap();
        assert_eq!(value["color"], "#FF0000");
    }

    #[test]
    fn test_parse_error_is_source_error() {
        let err = parse_document("inline", "# only a comment\n{").unwrap_err();
        assert!(matches!(err, SchemaError::Json { .. }));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = read_document("definitely/not/here.json").unwrap_err();
        assert!(matches!(err, SchemaError::Io { .. }));
    }
}
