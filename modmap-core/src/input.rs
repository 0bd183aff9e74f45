//! Extractor output boundary
//!
//! Records are checked and flattened here before the engine sees them. The
//! engine itself assumes validated units.

use std::collections::HashSet;
use std::path::Path;

use modmap_utils::{normalize_path_str, read_text_file};
use tracing::{debug, warn};

use crate::models::{CodeUnit, FileRecord};
use crate::{Error, Result};

/// Read a JSON array of file records
pub fn load_file_records(path: &Path) -> Result<Vec<FileRecord>> {
    let content = read_text_file(path)?;
    let records: Vec<FileRecord> = serde_json::from_str(&content)?;
    debug!("Loaded {} file records from {}", records.len(), path.display());
    Ok(records)
}

/// Reject records with an empty file path or a unit with an empty id.
///
/// Empty unit names are allowed; they score neutrally.
pub fn validate_records(records: &[FileRecord]) -> Result<()> {
    for (position, record) in records.iter().enumerate() {
        if record.path.trim().is_empty() {
            return Err(Error::InvalidInput(format!(
                "file record #{position} has an empty path"
            )));
        }
        for unit in &record.units {
            if unit.id.trim().is_empty() {
                return Err(Error::InvalidInput(format!(
                    "unit {:?} in {} has an empty id",
                    unit.name, record.path
                )));
            }
        }
    }
    Ok(())
}

/// Flatten records into one unit list.
///
/// Every unit takes its record's normalized path. Units whose id was already
/// seen are dropped, keeping the first.
pub fn flatten_records(records: &[FileRecord]) -> Vec<CodeUnit> {
    let mut seen = HashSet::new();
    let mut units = Vec::new();

    for record in records {
        let path = normalize_path_str(&record.path);
        for unit in &record.units {
            if !seen.insert(unit.id.clone()) {
                warn!("Dropping duplicate unit id {} ({} in {})", unit.id, unit.name, path);
                continue;
            }

            let mut unit = unit.clone();
            unit.path.clone_from(&path);
            for dependency in &mut unit.dependencies {
                dependency.path = normalize_path_str(&dependency.path);
            }
            units.push(unit);
        }
    }
    units
}
