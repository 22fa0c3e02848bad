use std::collections::BTreeMap;
use std::io::Write;

use crate::models::Group;

const HEAVY_RULE: &str =
    "================================================================================";
const LIGHT_RULE: &str =
    "--------------------------------------------------------------------------------";

/// Write the attribution report: a banner, then one entry per group in the
/// order given.
pub fn write_report<W: Write + ?Sized>(out: &mut W, groups: &[Group]) -> std::io::Result<()> {
    writeln!(out, "{HEAVY_RULE}")?;
    writeln!(out, "THIRD-PARTY SOFTWARE LICENSES")?;
    writeln!(out, "{HEAVY_RULE}")?;
    writeln!(out)?;
    writeln!(
        out,
        "This file contains license information for third-party software used in this project."
    )?;
    writeln!(out)?;

    if groups.is_empty() {
        writeln!(out, "No third-party licenses found.")?;
        writeln!(out)?;
        return Ok(());
    }

    for group in groups {
        write_group(out, group)?;
    }
    Ok(())
}

fn write_group<W: Write + ?Sized>(out: &mut W, group: &Group) -> std::io::Result<()> {
    writeln!(out, "{LIGHT_RULE}")?;
    writeln!(out, "License: {}", group.license_label())?;
    if !group.merged_years.is_empty() {
        writeln!(out, "Copyright years: {}", group.merged_years)?;
    }
    writeln!(out)?;

    if !group.copyright_lines.is_empty() {
        for line in &group.copyright_lines {
            writeln!(out, "  {line}")?;
        }
        writeln!(out)?;
    }

    writeln!(out, "  Locations:")?;
    for (project, paths) in locations_by_project(group) {
        for path in paths {
            writeln!(out, "    {project}: {path}")?;
        }
    }
    writeln!(out)?;

    if group.has_text() {
        writeln!(out, "  License Text:")?;
        writeln!(out)?;
        for line in group.display_text.lines() {
            if line.trim().is_empty() {
                writeln!(out)?;
            } else {
                writeln!(out, "    {line}")?;
            }
        }
        writeln!(out)?;
    } else {
        writeln!(out, "  (License text not available for {})", group.license_label())?;
        writeln!(out)?;
    }

    writeln!(out, "{LIGHT_RULE}")?;
    writeln!(out)?;
    Ok(())
}

/// Relative paths keyed by project name, both sorted, duplicates removed.
fn locations_by_project(group: &Group) -> BTreeMap<&str, Vec<&str>> {
    let mut map: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for loc in &group.locations {
        map.entry(loc.project_name())
            .or_default()
            .push(loc.relative_path.as_str());
    }
    for paths in map.values_mut() {
        paths.sort_unstable();
        paths.dedup();
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{group, GroupingOptions, ReferenceSets};
    use crate::models::{Location, Record};

    fn render(groups: &[Group]) -> String {
        let mut buf = Vec::new();
        write_report(&mut buf, groups).unwrap();
        String::from_utf8(buf).unwrap()
    }

    fn license_file(project: &str, rel: &str, id: Option<&str>, text: &str) -> Record {
        Record::license_file(
            Location::new(format!("/ws/{project}/{rel}"), Some(project.to_string()), rel),
            id.map(str::to_string),
            text.to_string(),
        )
    }

    #[test]
    fn test_empty_report() {
        let out = render(&[]);
        assert!(out.starts_with(HEAVY_RULE));
        assert!(out.contains("THIRD-PARTY SOFTWARE LICENSES"));
        assert!(out.contains("No third-party licenses found."));
    }

    #[test]
    fn test_group_entry_layout() {
        let records = vec![
            license_file("zlib", "LICENSE", Some("Zlib"), "Copyright (C) 1995-2017 Jean-loup Gailly\n\nzlib terms"),
            license_file("app", "third_party/zlib/LICENSE", Some("Zlib"), "Copyright (C) 1995-2022 Jean-loup Gailly\n\nzlib terms"),
        ];
        let outcome = group(&records, &GroupingOptions::default(), &ReferenceSets::default());
        assert_eq!(outcome.groups.len(), 1);

        let out = render(&outcome.groups);
        assert!(out.contains("License: Zlib\n"));
        assert!(out.contains("Copyright years: 1995-2022\n"));
        assert!(out.contains("  Locations:\n    app: third_party/zlib/LICENSE\n    zlib: LICENSE\n"));
        assert!(out.contains("  License Text:\n\n    Copyright (C) 1995-2017 Jean-loup Gailly\n\n    zlib terms\n"));
    }

    #[test]
    fn test_missing_text_placeholder() {
        let record = Record::spdx_header(
            Location::new("/ws/p/cpp/a.cu", Some("p".to_string()), "cpp/a.cu"),
            "BSD-3-Clause".to_string(),
            vec!["Copyright (c) 2019 Someone".to_string()],
        );
        let outcome = group(&[record], &GroupingOptions::default(), &ReferenceSets::default());

        let out = render(&outcome.groups);
        assert!(out.contains("  Copyright (c) 2019 Someone\n"));
        assert!(out.contains("    p: cpp/a.cu\n"));
        assert!(out.contains("(License text not available for BSD-3-Clause)"));
        assert!(!out.contains("License Text:"));
    }
}
