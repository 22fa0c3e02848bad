//! Copyright-year normalization and year-range merging.
//!
//! Two license texts that differ only in their copyright years describe the
//! same obligation. [`normalize`] rewrites every recognised year token into
//! [`YEAR_PLACEHOLDER`] and returns the years it found as a [`YearSet`].
//!
//! Recognised grammar (case-insensitive markers):
//!
//! ```text
//! marker := "Copyright" | "Copyright (c)" | "Copyright (C)"
//! year   := DIGIT{4}
//! span   := year ( "-" year )?
//! token  := span ( "," span )*
//!
//! marked       := marker token
//! parenthesised := "Copyright" "(" token ")"
//! ```

use std::fmt;
use std::sync::LazyLock;

use regex::{Captures, Regex};
use serde::Serialize;
use tracing::debug;

/// Replacement for every recognised year token.
pub const YEAR_PLACEHOLDER: &str = "YYYY";

const YEAR_LIST: &str = r"\d{4}(?:[ \t]*-[ \t]*\d{4})?(?:[ \t]*,[ \t]*\d{4}(?:[ \t]*-[ \t]*\d{4})?)*";

static RE_MARKED: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)(?P<open>\bcopyright(?:[ \t]*\(c\))?[ \t]*)(?P<years>{YEAR_LIST})\b"
    ))
    .ok()
});

static RE_PARENTHESISED: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)(?P<open>\bcopyright[ \t]*\()[ \t]*(?P<years>{YEAR_LIST})[ \t]*(?P<close>\))"
    ))
    .ok()
});

/// One shape of copyright-year token.
struct YearForm {
    name: &'static str,
    regex: &'static LazyLock<Option<Regex>>,
}

/// Every accepted form, applied in order.
static FORMS: [YearForm; 2] = [
    YearForm {
        name: "parenthesised",
        regex: &RE_PARENTHESISED,
    },
    YearForm {
        name: "marked",
        regex: &RE_MARKED,
    },
];

/// Normalize `text` and collect the years of every recognised token.
///
/// Text without a copyright marker comes back unchanged with an empty set.
pub fn normalize(text: &str) -> (String, YearSet) {
    let mut years = YearSet::new();
    let mut normalized = text.to_string();

    for form in &FORMS {
        let Some(re) = form.regex.as_ref() else {
            debug!(form = form.name, "year pattern unavailable");
            continue;
        };
        if !re.is_match(&normalized) {
            continue;
        }
        normalized = re
            .replace_all(&normalized, |caps: &Captures| {
                let token = &caps["years"];
                match parse_token(token) {
                    Some(spans) => spans.into_iter().for_each(|(lo, hi)| years.insert(lo, hi)),
                    None => debug!(token, form = form.name, "unparseable copyright year token"),
                }
                let close = caps.name("close").map_or("", |m| m.as_str());
                format!("{}{}{}", &caps["open"], YEAR_PLACEHOLDER, close)
            })
            .into_owned();
    }

    (normalized, years)
}

/// Normalized text without the years.
pub fn normalize_text_only(text: &str) -> String {
    normalize(text).0
}

/// Years mentioned in copyright statements of `text`.
pub fn extract_years(text: &str) -> YearSet {
    normalize(text).1
}

/// Parse a year token such as `2019, 2020-2022`.
///
/// Returns `None` when any span is malformed (for instance a reversed range);
/// the whole token then contributes no years.
fn parse_token(token: &str) -> Option<Vec<(u16, u16)>> {
    token
        .split(',')
        .map(|span| {
            let mut bounds = span.split('-').map(|y| y.trim().parse::<u16>());
            let lo = bounds.next()?.ok()?;
            let hi = match bounds.next() {
                Some(hi) => hi.ok()?,
                None => lo,
            };
            if bounds.next().is_some() || hi < lo {
                return None;
            }
            Some((lo, hi))
        })
        .collect()
}

/// A set of years kept as sorted, disjoint, non-adjacent inclusive spans.
///
/// Ranges are stored by their endpoints; the years between them are never
/// enumerated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct YearSet {
    spans: Vec<(u16, u16)>,
}

impl YearSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    pub fn insert_year(&mut self, year: u16) {
        self.insert(year, year);
    }

    /// Insert the inclusive span `lo..=hi`, coalescing with overlapping or
    /// adjacent spans.
    pub fn insert(&mut self, lo: u16, hi: u16) {
        let (mut lo, mut hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
        let mut kept = Vec::with_capacity(self.spans.len() + 1);
        for &(a, b) in &self.spans {
            if b.saturating_add(1) < lo || hi.saturating_add(1) < a {
                kept.push((a, b));
            } else {
                lo = lo.min(a);
                hi = hi.max(b);
            }
        }
        kept.push((lo, hi));
        kept.sort_unstable();
        self.spans = kept;
    }

    pub fn extend(&mut self, other: &YearSet) {
        for &(lo, hi) in &other.spans {
            self.insert(lo, hi);
        }
    }

    /// The collapsed runs, ascending.
    pub fn spans(&self) -> &[(u16, u16)] {
        &self.spans
    }
}

impl FromIterator<u16> for YearSet {
    fn from_iter<I: IntoIterator<Item = u16>>(iter: I) -> Self {
        let mut set = YearSet::new();
        for year in iter {
            set.insert_year(year);
        }
        set
    }
}

/// Renders as `2020-2022, 2024`; empty sets render as an empty string.
impl fmt::Display for YearSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, &(lo, hi)) in self.spans.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            if lo == hi {
                write!(f, "{}", lo)?;
            } else {
                write!(f, "{}-{}", lo, hi)?;
            }
        }
        Ok(())
    }
}

impl Serialize for YearSet {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
