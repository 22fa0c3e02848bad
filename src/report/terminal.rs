use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::Result;
use colored::*;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use crate::engine::GroupingOutcome;
use crate::models::Group;

/// Render a colored summary of a grouping run: counters and a table of
/// groups.
pub fn render(outcome: &GroupingOutcome, paths: &[PathBuf], verbose: bool, quiet: bool) -> Result<()> {
    let stats = &outcome.stats;

    if quiet {
        println!(
            "Records: {}  Groups: {}  Suppressed: {}  Merged: {}  Rejected: {}",
            stats.input,
            stats.groups.to_string().green(),
            stats.suppressed.to_string().cyan(),
            stats.umbrella_merged.to_string().cyan(),
            stats.rejected.to_string().red(),
        );
        return Ok(());
    }

    println!(
        "\n {} v{}",
        "license-builder".bold(),
        env!("CARGO_PKG_VERSION")
    );
    for path in paths {
        println!(" Scanned: {}", path.display());
    }
    println!();

    println!(" ┌────────────────────────────────────────────────────┐");
    println!(" │  {:<48} │", "SUMMARY".bold());
    println!(" │  {:<48} │", format!("License records    : {:>4}", stats.input));
    println!(
        " │  {:<48} │",
        format!(
            "{}  Groups          : {:>4}  {}",
            "✓".green(),
            stats.groups,
            summarize_licenses(&outcome.groups)
        )
    );
    println!(
        " │  {:<48} │",
        format!("{}  CCCL suppressed : {:>4}", "↓".cyan(), stats.suppressed)
    );
    println!(
        " │  {:<48} │",
        format!("{}  Umbrella merged : {:>4}", "↓".cyan(), stats.umbrella_merged)
    );
    println!(
        " │  {:<48} │",
        format!("{}  Rejected        : {:>4}", "✗".red(), stats.rejected)
    );
    println!(" └────────────────────────────────────────────────────┘\n");

    if !outcome.groups.is_empty() {
        println!(" {} License groups:\n", "[GROUPS]".green().bold());
        render_table(&outcome.groups, verbose);
        println!();
    }

    if !outcome.rejected.is_empty() {
        println!(" {} Records without text or identifier:\n", "[REJECTED]".red().bold());
        for err in &outcome.rejected {
            println!("   {}", err);
        }
        println!();
    }

    Ok(())
}

fn render_table(groups: &[Group], verbose: bool) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("#").add_attribute(Attribute::Bold),
            Cell::new("License").add_attribute(Attribute::Bold),
            Cell::new("Years").add_attribute(Attribute::Bold),
            Cell::new("Locations").add_attribute(Attribute::Bold),
            Cell::new("Text").add_attribute(Attribute::Bold),
        ]);

    for (i, group) in groups.iter().enumerate() {
        let locations = if verbose {
            group
                .locations
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("\n")
        } else {
            match (group.locations.first(), group.locations.len()) {
                (Some(first), 1) => first.to_string(),
                (Some(first), n) => format!("{} (+{} more)", first, n - 1),
                (None, _) => String::new(),
            }
        };

        let (text_str, text_color) = if group.has_text() {
            ("✓", Color::Green)
        } else {
            ("✗", Color::DarkGrey)
        };

        let license_color = if group.license_id.is_some() {
            Color::Reset
        } else {
            Color::Yellow
        };

        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(group.license_label()).fg(license_color),
            Cell::new(&group.merged_years),
            Cell::new(locations),
            Cell::new(text_str)
                .fg(text_color)
                .set_alignment(CellAlignment::Center),
        ]);
    }

    println!("{}", table);
}

/// The three most frequent licenses across groups, e.g. `[MIT (4), Apache-2.0 (2)]`.
fn summarize_licenses(groups: &[Group]) -> String {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for group in groups {
        *counts.entry(group.license_label()).or_insert(0) += 1;
    }

    let mut pairs: Vec<(&str, usize)> = counts.into_iter().collect();
    pairs.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

    let summary: Vec<String> = pairs
        .iter()
        .take(3)
        .map(|(lic, cnt)| format!("{} ({})", lic, cnt))
        .collect();

    if summary.is_empty() {
        String::new()
    } else {
        format!("[{}]", summary.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{group, GroupingOptions, ReferenceSets};
    use crate::models::{Location, Record};

    fn header(path: &str, id: &str) -> Record {
        Record::spdx_header(Location::from_path(path), id.to_string(), vec![])
    }

    #[test]
    fn test_summarize_licenses_top_three() {
        let records = vec![
            header("a/x.c", "MIT"),
            header("b/x.c", "Zlib"),
            header("c/x.c", "ISC"),
            header("d/x.c", "BSL-1.0"),
        ];
        let outcome = group(&records, &GroupingOptions::default(), &ReferenceSets::default());
        assert_eq!(outcome.groups.len(), 4);
        assert_eq!(
            summarize_licenses(&outcome.groups),
            "[BSL-1.0 (1), ISC (1), MIT (1)]"
        );
    }

    #[test]
    fn test_summarize_licenses_empty() {
        assert_eq!(summarize_licenses(&[]), "");
    }

    #[test]
    fn test_render_does_not_fail() {
        let outcome = group(&[header("a/x.c", "MIT")], &GroupingOptions::default(), &ReferenceSets::default());
        assert!(render(&outcome, &[PathBuf::from("/ws")], true, false).is_ok());
        assert!(render(&outcome, &[], false, true).is_ok());
    }
}
