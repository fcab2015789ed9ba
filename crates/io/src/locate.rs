//! Find a role's input file in the data directory.

use std::path::{Path, PathBuf};

use padron_recon::config::FileMatch;
use tracing::{debug, warn};

use crate::error::IoError;

/// Extensions we can read.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xls", "xlsb", "ods", "csv", "txt"];

/// Office lock files (`~$Report.xlsx`) sit next to open workbooks.
fn is_lock_file(name: &str) -> bool {
    name.starts_with("~$")
}

fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| SUPPORTED_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Resolve a role's file: an explicit `path` (relative to `dir`) wins,
/// otherwise the filename patterns are searched.
pub fn resolve_input(dir: &Path, file: &FileMatch) -> Result<PathBuf, IoError> {
    match &file.path {
        Some(path) => {
            let full = if path.is_absolute() { path.clone() } else { dir.join(path) };
            if full.is_file() {
                Ok(full)
            } else {
                Err(IoError::NotFound {
                    dir: dir.to_path_buf(),
                    patterns: vec![path.display().to_string()],
                })
            }
        }
        None => locate(dir, &file.contains, &file.exclude),
    }
}

/// First file (by name) in `dir` whose lowercase name contains every
/// `contains` pattern and no `exclude` pattern. Lock files and
/// unsupported extensions are ignored. Several matches log a warning.
pub fn locate(dir: &Path, contains: &[String], exclude: &[String]) -> Result<PathBuf, IoError> {
    let not_found = || IoError::NotFound {
        dir: dir.to_path_buf(),
        patterns: contains.to_vec(),
    };

    let entries = std::fs::read_dir(dir).map_err(|e| IoError::Read {
        path: dir.to_path_buf(),
        message: e.to_string(),
    })?;

    let contains: Vec<String> = contains.iter().map(|p| p.to_lowercase()).collect();
    let exclude: Vec<String> = exclude.iter().map(|p| p.to_lowercase()).collect();

    let mut candidates: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file() && is_supported(p))
        .filter(|p| {
            let Some(name) = p.file_name().and_then(|n| n.to_str()) else {
                return false;
            };
            if is_lock_file(name) {
                debug!(file = name, "skipping lock file");
                return false;
            }
            let name = name.to_lowercase();
            contains.iter().all(|c| name.contains(c.as_str()))
                && !exclude.iter().any(|x| name.contains(x.as_str()))
        })
        .collect();

    if candidates.is_empty() {
        return Err(not_found());
    }
    candidates.sort();

    if candidates.len() > 1 {
        let others: Vec<String> = candidates[1..]
            .iter()
            .filter_map(|p| p.file_name().and_then(|n| n.to_str()).map(str::to_string))
            .collect();
        warn!(
            chosen = %candidates[0].display(),
            ignored = %others.join(", "),
            "several files match, using the first"
        );
    }
    Ok(candidates.swap_remove(0))
}
