use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::warn;
use walkdir::WalkDir;

use crate::models::{Location, Record};

pub mod license_files;
pub mod spdx;

/// Directory names never descended into. Third-party directories are
/// deliberately absent, since that is where dependency licenses live.
pub const DEFAULT_EXCLUDE_DIRS: &[&str] = &[
    ".git",
    ".github",
    "build",
    "dist",
    "_build",
    "node_modules",
    "venv",
    ".venv",
    "python",
    "cmake",
    "rust",
    "test",
    "tests",
    "benchmark",
    "benchmarks",
    "docs",
    "examples",
];

/// Produces license records from one project tree.
pub trait Scanner {
    fn scan(&self, root: &Path) -> Result<Vec<Record>>;
}

/// Every regular file under `root` in a stable order (sorted by file name at
/// each level), skipping directories whose name is in `exclude_dirs`.
///
/// The root itself is always walked, whatever its name.
pub fn walk_files(root: &Path, exclude_dirs: &[String]) -> Vec<PathBuf> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0
                || !entry.file_type().is_dir()
                || !exclude_dirs
                    .iter()
                    .any(|d| entry.file_name().to_string_lossy() == d.as_str())
        })
        .filter_map(|entry| match entry {
            Ok(e) => Some(e),
            Err(err) => {
                warn!(error = %err, "skipping unreadable directory entry");
                None
            }
        })
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .collect()
}

/// Location of a discovered file, relative to the project it belongs to.
pub fn locate(path: &Path, root: &Path) -> Location {
    let (project, relative) = crate::engine::classifier::project_location(path, Some(root));
    Location::new(path.to_string_lossy().into_owned(), project, relative)
}

/// Read a file as text, replacing invalid UTF-8.
pub(crate) fn read_lossy(path: &Path) -> std::io::Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
