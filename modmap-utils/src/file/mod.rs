//! File system utilities
//!
//! Path normalization for code-unit paths and text-file reading for
//! extractor output and configuration files.

use std::fs;
use std::path::{Path, PathBuf};

/// Normalize a path lexically (collapses `.`, `..` and duplicate separators)
pub fn normalize_path(path: &Path) -> PathBuf {
    path_clean::clean(path)
}

/// Normalize a path given as a string, keeping `/` separators.
///
/// Code-unit paths are compared as strings, so `src/./a.ts` and `src/a.ts`
/// must map to the same key.
pub fn normalize_path_str(path: &str) -> String {
    if path.is_empty() {
        return String::new();
    }
    normalize_path(Path::new(path))
        .to_string_lossy()
        .replace('\\', "/")
}

/// Read a text file, falling back to lossy UTF-8 decoding
pub fn read_text_file(path: &Path) -> crate::Result<String> {
    if path.is_dir() {
        return Err(crate::UtilError::PathOperation(format!(
            "Expected a file but found a directory: {}",
            path.display()
        )));
    }

    match fs::read_to_string(path) {
        Ok(content) => Ok(content),
        Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
            let bytes = fs::read(path)?;
            Ok(String::from_utf8_lossy(&bytes).to_string())
        }
        Err(e) => Err(e.into()),
    }
}
