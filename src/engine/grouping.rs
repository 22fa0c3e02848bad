use std::collections::{BTreeSet, HashMap, HashSet};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::engine::classifier::ReferenceSets;
use crate::engine::key::{key_of, EquivalenceKey};
use crate::engine::years::{extract_years, YearSet};
use crate::error::RecordError;
use crate::models::{Group, ProjectTag, Record};

/// Switches for the grouping passes. All enabled by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GroupingOptions {
    /// Collapse umbrella-project groups that share a license identifier.
    pub deduplicate_rapids: bool,
    /// Drop CCCL component records when their CCCL root is present.
    pub handle_cccl: bool,
    /// Ignore copyright years when comparing license texts.
    pub normalize_years: bool,
}

impl Default for GroupingOptions {
    fn default() -> Self {
        Self {
            deduplicate_rapids: true,
            handle_cccl: true,
            normalize_years: true,
        }
    }
}

/// Counters describing one grouping run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GroupingStats {
    pub input: usize,
    pub rejected: usize,
    pub suppressed: usize,
    pub umbrella_merged: usize,
    pub groups: usize,
}

#[derive(Debug, Clone)]
pub struct GroupingOutcome {
    pub groups: Vec<Group>,
    pub rejected: Vec<RecordError>,
    pub stats: GroupingStats,
}

/// A valid record plus everything derived from it before folding.
struct Annotated<'a> {
    index: usize,
    record: &'a Record,
    tag: ProjectTag,
    key: EquivalenceKey,
    years: YearSet,
}

/// A group under construction.
struct GroupBuilder<'a> {
    key: EquivalenceKey,
    license_id: Option<String>,
    members: Vec<(usize, &'a Record)>,
    all_umbrella: bool,
    years: YearSet,
}

impl<'a> GroupBuilder<'a> {
    fn found(item: &Annotated<'a>) -> Self {
        Self {
            key: item.key,
            license_id: item.record.license().map(str::to_string),
            members: vec![(item.index, item.record)],
            all_umbrella: item.tag.is_umbrella(),
            years: item.years.clone(),
        }
    }

    fn push(&mut self, item: &Annotated<'a>) {
        self.members.push((item.index, item.record));
        self.all_umbrella &= item.tag.is_umbrella();
        self.years.extend(&item.years);
    }

    fn absorb(&mut self, other: GroupBuilder<'a>) {
        self.members.extend(other.members);
        self.all_umbrella &= other.all_umbrella;
        self.years.extend(&other.years);
    }

    fn finish(mut self) -> Group {
        self.members.sort_by_key(|(index, _)| *index);
        let first_seen = self.members.first().map_or(0, |(index, _)| *index);

        let display_text = self
            .members
            .iter()
            .find_map(|(_, r)| r.text())
            .unwrap_or_default()
            .to_string();

        let locations: BTreeSet<_> = self
            .members
            .iter()
            .map(|(_, r)| r.location.clone())
            .collect();

        let copyright_lines = {
            let mut seen = HashSet::new();
            self.members
                .iter()
                .flat_map(|(_, r)| r.copyright_lines.iter())
                .filter(|line| seen.insert(line.as_str()))
                .cloned()
                .collect()
        };

        Group {
            key: self.key,
            license_id: self.license_id,
            members: self.members.into_iter().map(|(_, r)| r.clone()).collect(),
            locations: locations.into_iter().collect(),
            merged_years: self.years.to_string(),
            copyright_lines,
            display_text,
            first_seen,
        }
    }
}

/// Group license records into report entries.
///
/// Invalid records (no text and no identifier) are rejected and reported in
/// [`GroupingOutcome::rejected`]; every other record ends up in exactly one
/// group unless CCCL suppression removes it. Groups come out in the order their
/// first member was discovered.
pub fn group(records: &[Record], options: &GroupingOptions, refs: &ReferenceSets) -> GroupingOutcome {
    let mut stats = GroupingStats {
        input: records.len(),
        ..GroupingStats::default()
    };

    let mut rejected = Vec::new();
    let mut valid = Vec::with_capacity(records.len());
    for (index, record) in records.iter().enumerate() {
        if record.is_valid() {
            valid.push((index, record));
        } else {
            warn!(location = %record.location, "skipping record without license text or identifier");
            rejected.push(RecordError::InvalidRecord {
                location: record.location.clone(),
            });
        }
    }
    stats.rejected = rejected.len();

    // Per-record work is independent; the indexed collect keeps discovery order.
    let annotated: Vec<Annotated<'_>> = valid
        .par_iter()
        .map(|&(index, record)| Annotated {
            index,
            record,
            tag: refs.classify(&record.location.path),
            key: key_of(record, options.normalize_years),
            years: record_years(record),
        })
        .collect();

    let surviving = if options.handle_cccl {
        suppress_cccl_components(annotated, &mut stats)
    } else {
        annotated
    };

    let mut builders = fold(&surviving);

    if options.deduplicate_rapids {
        builders = consolidate_umbrella(builders, &mut stats);
    }

    let groups: Vec<Group> = builders.into_iter().map(GroupBuilder::finish).collect();
    stats.groups = groups.len();

    info!(
        input = stats.input,
        rejected = stats.rejected,
        suppressed = stats.suppressed,
        umbrella_merged = stats.umbrella_merged,
        groups = stats.groups,
        "grouped license records"
    );

    GroupingOutcome {
        groups,
        rejected,
        stats,
    }
}

/// Years from the license text and from every copyright line.
fn record_years(record: &Record) -> YearSet {
    let mut years = record.text().map(extract_years).unwrap_or_default();
    for line in &record.copyright_lines {
        years.extend(&extract_years(line));
    }
    years
}

/// Drop components whose CCCL root was also discovered. A component without
/// its root stays.
fn suppress_cccl_components<'a>(
    annotated: Vec<Annotated<'a>>,
    stats: &mut GroupingStats,
) -> Vec<Annotated<'a>> {
    let roots: HashSet<String> = annotated
        .iter()
        .filter_map(|a| match &a.tag {
            ProjectTag::CcclRoot { root } => Some(root.clone()),
            _ => None,
        })
        .collect();

    annotated
        .into_iter()
        .filter(|a| match &a.tag {
            ProjectTag::CcclComponent { component, root } if roots.contains(root) => {
                debug!(path = %a.record.location.path, component = %component, "suppressed by CCCL root license");
                stats.suppressed += 1;
                false
            }
            _ => true,
        })
        .collect()
}

/// Fold records into groups by equivalence key, in discovery order.
fn fold<'a>(annotated: &[Annotated<'a>]) -> Vec<GroupBuilder<'a>> {
    let mut builders: Vec<GroupBuilder<'a>> = Vec::new();
    let mut by_key: HashMap<EquivalenceKey, usize> = HashMap::new();

    for item in annotated {
        match by_key.get(&item.key) {
            Some(&slot) => builders[slot].push(item),
            None => {
                by_key.insert(item.key, builders.len());
                builders.push(GroupBuilder::found(item));
            }
        }
    }

    builders
}

/// Merge every all-umbrella group into the first all-umbrella group with the
/// same license identifier, whatever their texts.
fn consolidate_umbrella<'a>(
    builders: Vec<GroupBuilder<'a>>,
    stats: &mut GroupingStats,
) -> Vec<GroupBuilder<'a>> {
    let mut merged: Vec<GroupBuilder<'a>> = Vec::with_capacity(builders.len());
    let mut by_license: HashMap<String, usize> = HashMap::new();

    for builder in builders {
        let license = match (&builder.license_id, builder.all_umbrella) {
            (Some(id), true) => id.clone(),
            _ => {
                merged.push(builder);
                continue;
            }
        };
        match by_license.get(&license) {
            Some(&slot) => {
                debug!(license = %license, "merging umbrella project licenses");
                merged[slot].absorb(builder);
                stats.umbrella_merged += 1;
            }
            None => {
                by_license.insert(license, merged.len());
                merged.push(builder);
            }
        }
    }

    merged
}
