//! Symbol set file discovery.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::SchemaError;

/// Recursively collects the `.json` files under `root`, skipping any file
/// whose canonical path equals one in `exclude` (typically the constants
/// document living next to the sets).
///
/// The returned list is sorted so builds are deterministic.
pub fn discover_set_files<P: AsRef<Path>>(
    root: P,
    exclude: &[PathBuf],
) -> Result<Vec<PathBuf>, SchemaError> {
    let root = root.as_ref();
    let excluded: Vec<PathBuf> = exclude.iter().filter_map(|p| p.canonicalize().ok()).collect();

    let mut files = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry.map_err(|e| SchemaError::Discovery {
            path: root.display().to_string(),
            message: e.to_string(),
        })?;

        if !entry.file_type().is_file() || !is_json_file(entry.path()) {
            continue;
        }

        let path = entry.path();
        if let Ok(canonical) = path.canonicalize() {
            if excluded.contains(&canonical) {
                continue;
            }
        }
        files.push(path.to_path_buf());
    }
    files.sort();
    Ok(files)
}

fn is_json_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| ext.eq_ignore_ascii_case("json"))
}
