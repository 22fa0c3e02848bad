use std::path::Path;
use std::sync::LazyLock;

use anyhow::Result;
use regex::Regex;
use tracing::{debug, info};

use crate::license::spdx::clean_identifier;
use crate::models::Record;

use super::{locate, read_lossy, walk_files};

const COPYRIGHT_TAG: &str = "SPDX-FileCopyrightText:";
const LICENSE_TAG: &str = "SPDX-License-Identifier:";

/// Lines tolerated between a copyright block and its license identifier.
const MAX_GAP: usize = 10;

/// Owners treated as first-party when no list is configured.
pub const DEFAULT_FIRST_PARTY: &[&str] = &["NVIDIA"];

const RESERVED: &str = r"(?:\.\s*All rights reserved\.?)?$";

static RE_MARKER_YEARS: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)Copyright\s*\(c\)\s*(\d[\d\-,\s]*)\s+(.+?){RESERVED}")).ok()
});
static RE_PAREN_YEARS: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)Copyright\s*\((\d[\d\-,\s]*)\)\s+(.+?){RESERVED}")).ok()
});
static RE_MARKER_ONLY: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(&format!(r"(?i)Copyright\s*\(c\)\s+(.+?){RESERVED}")).ok());
static RE_BARE_YEARS: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)Copyright\s+(\d[\d\-,\s]*)\s+(.+?){RESERVED}")).ok()
});
static RE_TAG_YEARS: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(&format!(r"(?i)FileCopyrightText:\s*(\d[\d\-,\s]*)\s+(.+?){RESERVED}")).ok()
});

/// Copyright line shapes, tried in order. `true` when the shape carries years.
static SHAPES: [(&LazyLock<Option<Regex>>, bool); 5] = [
    (&RE_MARKER_YEARS, true),
    (&RE_PAREN_YEARS, true),
    (&RE_MARKER_ONLY, false),
    (&RE_BARE_YEARS, true),
    (&RE_TAG_YEARS, true),
];

/// One copyright statement pulled from an SPDX header.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Copyright {
    pub years: String,
    pub owner: String,
}

impl Copyright {
    /// Canonical `Copyright (c) ...` form used in reports.
    pub fn line(&self) -> String {
        if self.years.is_empty() {
            format!("Copyright (c) {}", self.owner)
        } else {
            format!("Copyright (c) {} {}", self.years, self.owner)
        }
    }
}

/// A license identifier with the third-party copyrights declared above it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpdxEntry {
    pub license_id: String,
    pub copyrights: Vec<Copyright>,
}

/// Split a copyright line into years and owner.
///
/// ```text
/// "Copyright (c) 2014-2022 Frank Example"          -> ("2014-2022", "Frank Example")
/// "Copyright (2019) Sandia Corporation"            -> ("2019", "Sandia Corporation")
/// "Copyright (c) Facebook, Inc. and its affiliates." -> ("", "Facebook, Inc. and its affiliates")
/// ```
pub fn extract_copyright_info(line: &str) -> Option<Copyright> {
    let line = clean_identifier(line);
    for &(shape, has_years) in SHAPES.iter() {
        let Some(re) = shape.as_ref() else { continue };
        let Some(caps) = re.captures(&line) else { continue };

        let (years, owner) = if has_years {
            (caps.get(1), caps.get(2))
        } else {
            (None, caps.get(1))
        };
        let owner = owner
            .map(|m| m.as_str().trim().trim_end_matches(['.', ',', ';']).trim())
            .unwrap_or_default();
        if owner.is_empty() {
            continue;
        }
        let years = years
            .map(|m| m.as_str().trim().trim_end_matches(',').trim())
            .unwrap_or_default();
        return Some(Copyright {
            years: years.to_string(),
            owner: owner.to_string(),
        });
    }
    None
}

fn is_first_party(line: &str, first_party: &[String]) -> bool {
    let upper = line.to_uppercase();
    first_party.iter().any(|m| upper.contains(&m.to_uppercase()))
}

/// Find third-party SPDX header blocks in `content`.
///
/// A block is one or more `SPDX-FileCopyrightText:` lines followed, within
/// [`MAX_GAP`] lines, by an `SPDX-License-Identifier:` line. First-party
/// copyright lines are skipped; a block with only first-party copyrights
/// yields nothing.
pub fn find_spdx_entries(content: &str, first_party: &[String]) -> Vec<SpdxEntry> {
    let lines: Vec<&str> = content.lines().map(str::trim).collect();
    let mut entries = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        let line = lines[i];
        i += 1;
        if !line.contains(COPYRIGHT_TAG) || is_first_party(line, first_party) {
            continue;
        }

        let mut copyrights: Vec<Copyright> = extract_copyright_info(line).into_iter().collect();
        let mut gap = 0;
        while i < lines.len() && gap <= MAX_GAP {
            let next = lines[i];
            if let Some((_, id)) = next.split_once(LICENSE_TAG) {
                let license_id = clean_identifier(id);
                if !license_id.is_empty() && !copyrights.is_empty() {
                    entries.push(SpdxEntry {
                        license_id,
                        copyrights: std::mem::take(&mut copyrights),
                    });
                }
                i += 1;
                break;
            }
            if next.contains(COPYRIGHT_TAG) {
                if !is_first_party(next, first_party) {
                    copyrights.extend(extract_copyright_info(next));
                }
            } else {
                gap += 1;
            }
            i += 1;
        }
    }

    entries
}

/// Scanner for SPDX header comments in source files.
///
/// Produces one record per (file, license identifier) holding the
/// third-party copyright lines, sorted by owner.
pub struct SpdxScanner {
    exclude_dirs: Vec<String>,
    first_party: Vec<String>,
}

impl SpdxScanner {
    /// Create a new `SpdxScanner`.
    pub fn new(exclude_dirs: Vec<String>, first_party: Vec<String>) -> Self {
        Self {
            exclude_dirs,
            first_party,
        }
    }
}

impl super::Scanner for SpdxScanner {
    fn scan(&self, root: &Path) -> Result<Vec<Record>> {
        let mut records = Vec::new();
        let mut scanned = 0usize;

        for path in walk_files(root, &self.exclude_dirs) {
            scanned += 1;
            let content = match read_lossy(&path) {
                Ok(c) => c,
                Err(e) => {
                    debug!(path = %path.display(), error = %e, "skipping unreadable file");
                    continue;
                }
            };

            // (license, copyrights) in order of first appearance
            let mut per_license: Vec<(String, Vec<Copyright>)> = Vec::new();
            for entry in find_spdx_entries(&content, &self.first_party) {
                match per_license.iter_mut().find(|(id, _)| *id == entry.license_id) {
                    Some((_, existing)) => existing.extend(entry.copyrights),
                    None => per_license.push((entry.license_id, entry.copyrights)),
                }
            }
            if per_license.is_empty() {
                continue;
            }

            let location = locate(&path, root);
            for (license_id, mut copyrights) in per_license {
                copyrights.sort_by(|a, b| (&a.owner, &a.years).cmp(&(&b.owner, &b.years)));
                copyrights.dedup();
                let lines = copyrights.iter().map(Copyright::line).collect();
                debug!(path = %path.display(), license = %license_id, "found SPDX header");
                records.push(Record::spdx_header(location.clone(), license_id, lines));
            }
        }

        info!(
            root = %root.display(),
            files = scanned,
            records = records.len(),
            "SPDX headers scanned"
        );
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RecordOrigin;
    use crate::scanner::Scanner;
    use std::fs;
    use tempfile::TempDir;

    fn nvidia() -> Vec<String> {
        DEFAULT_FIRST_PARTY.iter().map(|s| s.to_string()).collect()
    }

    fn info(line: &str) -> Option<(String, String)> {
        extract_copyright_info(line).map(|c| (c.years, c.owner))
    }

    #[test]
    fn test_copyright_with_marker_and_years() {
        assert_eq!(
            info("// SPDX-FileCopyrightText: Copyright (c) 2014-2022 Frank Example"),
            Some(("2014-2022".into(), "Frank Example".into()))
        );
        assert_eq!(
            info("Copyright (C) 2019, 2021 Acme Corp. All rights reserved."),
            Some(("2019, 2021".into(), "Acme Corp".into()))
        );
    }

    #[test]
    fn test_copyright_parenthesised_years() {
        assert_eq!(
            info("SPDX-FileCopyrightText: Copyright (2019) Sandia Corporation"),
            Some(("2019".into(), "Sandia Corporation".into()))
        );
    }

    #[test]
    fn test_copyright_without_years() {
        assert_eq!(
            info("SPDX-FileCopyrightText: Copyright (c) Facebook, Inc. and its affiliates."),
            Some(("".into(), "Facebook, Inc. and its affiliates".into()))
        );
    }

    #[test]
    fn test_copyright_bare_years() {
        assert_eq!(
            info(" * SPDX-FileCopyrightText: Copyright 2008 Google Inc. */"),
            Some(("2008".into(), "Google Inc".into()))
        );
        assert_eq!(
            info("# SPDX-FileCopyrightText: 2023 The Authors"),
            Some(("2023".into(), "The Authors".into()))
        );
    }

    #[test]
    fn test_copyright_unrecognised() {
        assert_eq!(info("SPDX-FileCopyrightText:"), None);
        assert_eq!(info("no copyright here"), None);
    }

    #[test]
    fn test_find_entries_skips_first_party() {
        let content = "\
/*
 * SPDX-FileCopyrightText: Copyright (c) 2024, NVIDIA CORPORATION.
 * SPDX-License-Identifier: Apache-2.0
 */
";
        assert!(find_spdx_entries(content, &nvidia()).is_empty());
    }

    #[test]
    fn test_find_entries_mixed_block() {
        let content = "\
// SPDX-FileCopyrightText: Copyright (c) 2011-2019 Jane Doe
// SPDX-FileCopyrightText: Copyright (c) 2024 NVIDIA CORPORATION
// SPDX-FileCopyrightText: Copyright (c) Example Org
// SPDX-License-Identifier: BSD-3-Clause */
int x;
";
        let entries = find_spdx_entries(content, &nvidia());
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].license_id, "BSD-3-Clause");
        let owners: Vec<&str> = entries[0].copyrights.iter().map(|c| c.owner.as_str()).collect();
        assert_eq!(owners, vec!["Jane Doe", "Example Org"]);
    }

    #[test]
    fn test_find_entries_identifier_too_far() {
        let mut content = String::from("// SPDX-FileCopyrightText: Copyright 2020 Far Away\n");
        for _ in 0..12 {
            content.push_str("// filler\n");
        }
        content.push_str("// SPDX-License-Identifier: MIT\n");
        assert!(find_spdx_entries(&content, &nvidia()).is_empty());
    }

    #[test]
    fn test_find_entries_multiple_blocks() {
        let content = "\
// SPDX-FileCopyrightText: Copyright 2020 First Co
// SPDX-License-Identifier: MIT
code();
// SPDX-FileCopyrightText: Copyright 2021 Second Co
//
// SPDX-License-Identifier: Apache-2.0 OR MIT
";
        let entries = find_spdx_entries(content, &nvidia());
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].license_id, "MIT");
        assert_eq!(entries[1].license_id, "Apache-2.0 OR MIT");
        assert_eq!(entries[1].copyrights[0].owner, "Second Co");
    }

    #[test]
    fn test_scan_aggregates_per_license() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("cpp/src");
        fs::create_dir_all(&src).unwrap();
        fs::write(
            src.join("hash.cuh"),
            "\
// SPDX-FileCopyrightText: Copyright (c) 2016 Zed Corp
// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: Copyright (c) 2015 Alpha Ltd
// SPDX-License-Identifier: MIT
",
        )
        .unwrap();
        fs::write(src.join("plain.cpp"), "int main() {}\n").unwrap();

        let scanner = SpdxScanner::new(vec![], nvidia());
        let records = scanner.scan(dir.path()).unwrap();
        assert_eq!(records.len(), 1);

        let record = &records[0];
        assert_eq!(record.origin, RecordOrigin::SpdxHeader);
        assert_eq!(record.license_id.as_deref(), Some("MIT"));
        assert_eq!(record.raw_text, None);
        assert_eq!(
            record.copyright_lines,
            vec!["Copyright (c) 2015 Alpha Ltd", "Copyright (c) 2016 Zed Corp"]
        );
        assert_eq!(record.location.relative_path, "cpp/src/hash.cuh");
    }
}
