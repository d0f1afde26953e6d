//! Directory scanning for screenshot files.

use std::collections::BTreeSet;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use tracing::debug;

use super::types::{CompareError, CompareResult};

/// List the screenshot file names in `dir` that end with `.{extension}`.
///
/// A directory that does not exist yields an empty set. Any other read
/// failure is returned as an error. Subdirectories are skipped, even when
/// their name carries the extension.
pub fn list_screenshots(dir: &Path, extension: &str) -> CompareResult<BTreeSet<String>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            debug!(dir = %dir.display(), "screenshot directory absent, treating as empty");
            return Ok(BTreeSet::new());
        }
        Err(err) => return Err(CompareError::io(dir, err)),
    };

    let suffix = format!(".{}", extension.trim_start_matches('.'));
    let mut names = BTreeSet::new();

    for entry in entries {
        let entry = entry.map_err(|e| CompareError::io(dir, e))?;
        let file_type = entry.file_type().map_err(|e| CompareError::io(entry.path(), e))?;
        if file_type.is_dir() {
            continue;
        }

        let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
            debug!(path = %entry.path().display(), "skipping non UTF-8 file name");
            continue;
        };
        if name.ends_with(&suffix) {
            names.insert(name);
        }
    }

    debug!(dir = %dir.display(), count = names.len(), "scanned screenshot directory");
    Ok(names)
}
