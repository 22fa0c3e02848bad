use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::warn;

const COMMON_DIR: &str = "common_licenses";
const INFREQUENT_DIR: &str = "infrequent_licenses";

/// On-disk license texts, one `<id>.txt` per license.
///
/// `common_licenses/` is curated and checked first; `infrequent_licenses/`
/// collects texts fetched from spdx.org.
#[derive(Debug, Clone)]
pub struct LicenseCache {
    dir: PathBuf,
}

impl LicenseCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Cached text for `id`, if any.
    pub fn lookup(&self, id: &str) -> Option<String> {
        if !is_file_safe(id) {
            return None;
        }
        for sub in [COMMON_DIR, INFREQUENT_DIR] {
            let path = self.dir.join(sub).join(format!("{id}.txt"));
            if !path.exists() {
                continue;
            }
            match fs::read_to_string(&path) {
                Ok(text) => return Some(text),
                Err(e) => warn!(path = %path.display(), error = %e, "could not read cached license"),
            }
        }
        None
    }

    /// Store a fetched text under `infrequent_licenses/`.
    pub fn store(&self, id: &str, text: &str) -> Result<PathBuf> {
        if !is_file_safe(id) {
            anyhow::bail!("refusing to cache license with identifier {:?}", id);
        }
        let dir = self.dir.join(INFREQUENT_DIR);
        fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;
        let path = dir.join(format!("{id}.txt"));
        fs::write(&path, text).with_context(|| format!("writing {}", path.display()))?;
        Ok(path)
    }
}

/// SPDX identifiers are letters, digits, `-`, `.` and `+`. Anything else could
/// escape the cache directory.
fn is_file_safe(id: &str) -> bool {
    !id.is_empty()
        && !id.starts_with('.')
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '+'))
}
