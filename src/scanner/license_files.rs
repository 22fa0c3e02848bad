use std::path::Path;

use anyhow::Result;
use tracing::{debug, info, warn};

use crate::license::identify::identify;
use crate::models::Record;

use super::{locate, read_lossy, walk_files};

/// Scanner for standalone license files.
///
/// Every file whose name starts with `LICENSE` becomes one record carrying the
/// file's full text. The identifier is inferred from the text when possible.
pub struct LicenseFileScanner {
    exclude_dirs: Vec<String>,
}

impl LicenseFileScanner {
    /// Create a new `LicenseFileScanner` that skips `exclude_dirs`.
    pub fn new(exclude_dirs: Vec<String>) -> Self {
        Self { exclude_dirs }
    }
}

impl super::Scanner for LicenseFileScanner {
    fn scan(&self, root: &Path) -> Result<Vec<Record>> {
        let mut records = Vec::new();

        for path in walk_files(root, &self.exclude_dirs) {
            let is_license = path
                .file_name()
                .map(|n| n.to_string_lossy().starts_with("LICENSE"))
                .unwrap_or(false);
            if !is_license {
                continue;
            }

            let text = match read_lossy(&path) {
                Ok(t) => t,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "could not read license file");
                    continue;
                }
            };

            let license_id = identify(&text);
            debug!(
                path = %path.display(),
                license = license_id.as_deref().unwrap_or("unidentified"),
                "found license file"
            );
            records.push(Record::license_file(locate(&path, root), license_id, text));
        }

        info!(root = %root.display(), count = records.len(), "license files scanned");
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RecordOrigin;
    use crate::scanner::{Scanner, DEFAULT_EXCLUDE_DIRS};
    use std::fs;
    use tempfile::TempDir;

    fn scanner() -> LicenseFileScanner {
        LicenseFileScanner::new(DEFAULT_EXCLUDE_DIRS.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn test_finds_license_prefixed_files() {
        let dir = TempDir::new().unwrap();
        let deps = dir.path().join("cpp/build/_deps");
        fs::create_dir_all(deps.join("fmt-src")).unwrap();
        fs::create_dir_all(deps.join("rmm-src")).unwrap();
        fs::write(
            deps.join("fmt-src/LICENSE.rst"),
            "Copyright (c) 2012 - present, Victor Zverovich\n\nPermission is hereby granted, free of charge, to any person",
        )
        .unwrap();
        fs::write(deps.join("rmm-src/LICENSE"), "Apache License\nVersion 2.0, January 2004").unwrap();
        fs::write(deps.join("rmm-src/README.md"), "not a license").unwrap();

        let records = scanner().scan(dir.path()).unwrap();
        // `build` is excluded by default
        assert!(records.is_empty());

        let records = LicenseFileScanner::new(vec![]).scan(dir.path()).unwrap();
        assert_eq!(records.len(), 2);

        let fmt = &records[0];
        assert_eq!(fmt.origin, RecordOrigin::LicenseFile);
        assert_eq!(fmt.location.project.as_deref(), Some("fmt"));
        assert_eq!(fmt.location.relative_path, "LICENSE.rst");
        assert_eq!(fmt.license_id.as_deref(), Some("MIT"));
        assert_eq!(fmt.copyright_lines, vec!["Copyright (c) 2012 - present, Victor Zverovich"]);

        let rmm = &records[1];
        assert_eq!(rmm.location.project.as_deref(), Some("rmm"));
        assert_eq!(rmm.license_id.as_deref(), Some("Apache-2.0"));
        assert!(rmm.raw_text.as_deref().unwrap().contains("Version 2.0"));
    }

    #[test]
    fn test_unidentified_text_is_kept() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("third_party/odd")).unwrap();
        fs::write(dir.path().join("third_party/odd/LICENSE.txt"), "Custom terms apply.").unwrap();

        let records = scanner().scan(dir.path()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].license_id, None);
        assert!(records[0].is_valid());
        assert_eq!(records[0].location.relative_path, "third_party/odd/LICENSE.txt");
    }

    #[test]
    fn test_invalid_utf8_is_read_lossily() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("LICENSE"), b"Copyright \xff 2020 Someone\n").unwrap();

        let records = scanner().scan(dir.path()).unwrap();
        assert_eq!(records.len(), 1);
        assert!(records[0].raw_text.as_deref().unwrap().contains('\u{fffd}'));
    }
}
