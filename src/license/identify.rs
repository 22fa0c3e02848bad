use crate::license::spdx::{clean_identifier, normalize};

const SPDX_TAG: &str = "SPDX-License-Identifier:";

/// Phrases that identify a license text, checked in order. Every phrase of an
/// entry must appear (case-insensitive) for it to match.
const TEXT_SIGNATURES: &[(&str, &[&str])] = &[
    ("Apache-2.0", &["apache license", "version 2.0"]),
    ("BSL-1.0", &["boost software license"]),
    ("MPL-2.0", &["mozilla public license", "2.0"]),
    ("LGPL-3.0", &["gnu lesser general public license", "version 3"]),
    ("LGPL-2.1", &["gnu lesser general public license"]),
    ("GPL-3.0", &["gnu general public license", "version 3"]),
    ("GPL-2.0", &["gnu general public license"]),
    ("Unlicense", &["this is free and unencumbered software"]),
    ("ISC", &["permission to use, copy, modify, and/or distribute this software"]),
    ("MIT", &["permission is hereby granted, free of charge"]),
    (
        "BSD-3-Clause",
        &["redistribution and use in source and binary forms", "neither the name"],
    ),
    ("BSD-2-Clause", &["redistribution and use in source and binary forms"]),
    ("Zlib", &["this software is provided 'as-is'", "altered source versions"]),
];

/// Best-effort SPDX identifier for a LICENSE file's contents.
///
/// An explicit `SPDX-License-Identifier:` line wins; otherwise the text is
/// matched against known license phrasings.
pub fn identify(text: &str) -> Option<String> {
    if let Some(id) = text
        .lines()
        .find_map(|line| line.split_once(SPDX_TAG).map(|(_, id)| clean_identifier(id)))
        .filter(|id| !id.is_empty())
    {
        return Some(normalize(&id));
    }

    let lower = text.to_lowercase();
    TEXT_SIGNATURES
        .iter()
        .find(|(_, phrases)| phrases.iter().all(|p| lower.contains(p)))
        .map(|(id, _)| id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_tag() {
        assert_eq!(
            identify("// SPDX-License-Identifier: BSD-3-Clause */\nwhatever").as_deref(),
            Some("BSD-3-Clause")
        );
        assert_eq!(
            identify("SPDX-License-Identifier: Apache License 2.0").as_deref(),
            Some("Apache-2.0")
        );
    }

    #[test]
    fn test_apache_text() {
        let text = "                                 Apache License\n                           Version 2.0, January 2004";
        assert_eq!(identify(text).as_deref(), Some("Apache-2.0"));
    }

    #[test]
    fn test_mit_text() {
        let text = "MIT License\n\nCopyright (c) 2020 Example\n\nPermission is hereby granted, free of charge, to any person";
        assert_eq!(identify(text).as_deref(), Some("MIT"));
    }

    #[test]
    fn test_bsd_variants() {
        let two = "Redistribution and use in source and binary forms, with or without modification";
        assert_eq!(identify(two).as_deref(), Some("BSD-2-Clause"));
        let three = format!("{two}\n3. Neither the name of the copyright holder");
        assert_eq!(identify(&three).as_deref(), Some("BSD-3-Clause"));
    }

    #[test]
    fn test_lgpl_before_gpl() {
        let text = "GNU LESSER GENERAL PUBLIC LICENSE\nVersion 2.1, February 1999";
        assert_eq!(identify(text).as_deref(), Some("LGPL-2.1"));
    }

    #[test]
    fn test_unknown_text() {
        assert_eq!(identify("All rights reserved. Do not copy."), None);
        assert_eq!(identify(""), None);
    }
}
