use std::sync::LazyLock;

use regex::Regex;

static RE_OPERATOR: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)\s+(?:AND|OR|WITH)\s+").ok());

/// Strip whitespace and trailing comment markers (`*/`, `//`) from an
/// identifier taken from a source header.
pub fn clean_identifier(raw: &str) -> String {
    raw.trim()
        .trim_end_matches(|c: char| c == '*' || c == '/' || c.is_whitespace())
        .to_string()
}

/// Split a compound SPDX expression into its license identifiers.
///
/// `"Apache-2.0 AND MIT"` → `["Apache-2.0", "MIT"]`. Parentheses are dropped;
/// an expression without operators yields itself.
pub fn license_components(expr: &str) -> Vec<String> {
    let stripped = expr.replace(['(', ')'], " ");
    let parts: Vec<String> = match RE_OPERATOR.as_ref() {
        Some(re) => re.split(&stripped).map(str::trim).map(str::to_string).collect(),
        None => vec![stripped.trim().to_string()],
    };
    let mut components: Vec<String> = Vec::new();
    for part in parts.into_iter().filter(|p| !p.is_empty()) {
        if !components.contains(&part) {
            components.push(part);
        }
    }
    if components.is_empty() {
        vec![expr.trim().to_string()]
    } else {
        components
    }
}

/// Normalize common non-SPDX strings to their SPDX equivalents.
pub fn normalize(raw: &str) -> String {
    let trimmed = raw.trim();
    match trimmed {
        "Apache 2.0" | "Apache License 2.0" | "Apache License, Version 2.0" | "Apache-2" => {
            "Apache-2.0".to_string()
        }
        "MIT License" | "The MIT License" => "MIT".to_string(),
        "BSD" | "BSD License" => "BSD-3-Clause".to_string(),
        "BSD 2-Clause" | "Simplified BSD" => "BSD-2-Clause".to_string(),
        "BSD 3-Clause" | "New BSD" | "Modified BSD" => "BSD-3-Clause".to_string(),
        "GNU GPL v2" | "GNU General Public License v2" | "GPL v2" | "GPLv2" => {
            "GPL-2.0".to_string()
        }
        "GNU GPL v3" | "GNU General Public License v3" | "GPL v3" | "GPLv3" => {
            "GPL-3.0".to_string()
        }
        "GNU LGPL v2.1" | "LGPL v2.1" | "LGPLv2.1" => "LGPL-2.1".to_string(),
        "GNU LGPL v3" | "LGPL v3" | "LGPLv3" => "LGPL-3.0".to_string(),
        "Mozilla Public License 2.0" | "MPL 2.0" | "MPLv2" => "MPL-2.0".to_string(),
        "ISC License" => "ISC".to_string(),
        "Boost" | "Boost Software License 1.0" => "BSL-1.0".to_string(),
        "CC0" | "Public Domain" => "CC0-1.0".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_identifier() {
        assert_eq!(clean_identifier("  MIT */"), "MIT");
        assert_eq!(clean_identifier("Apache-2.0 //"), "Apache-2.0");
        assert_eq!(clean_identifier("BSD-3-Clause"), "BSD-3-Clause");
    }

    #[test]
    fn test_license_components() {
        assert_eq!(license_components("Apache-2.0 AND MIT"), vec!["Apache-2.0", "MIT"]);
        assert_eq!(license_components("MIT or Apache-2.0"), vec!["MIT", "Apache-2.0"]);
        assert_eq!(
            license_components("(MIT OR Apache-2.0) AND MIT"),
            vec!["MIT", "Apache-2.0"]
        );
        assert_eq!(
            license_components("GPL-2.0 WITH Classpath-exception-2.0"),
            vec!["GPL-2.0", "Classpath-exception-2.0"]
        );
        assert_eq!(license_components("BSL-1.0"), vec!["BSL-1.0"]);
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("MIT License"), "MIT");
        assert_eq!(normalize("Apache License 2.0"), "Apache-2.0");
        assert_eq!(normalize("Zlib"), "Zlib");
    }
}
