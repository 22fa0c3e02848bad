//! Path-based project classification.
//!
//! [`ReferenceSets::classify`] decides whether a location belongs to an
//! umbrella project, to the CCCL root, or to one of the CCCL sub-components.
//! The rules live in a small table ([`RULES`]); each rule proposes at most one
//! [`Candidate`] and the candidate matched on the deepest path segment wins,
//! with table order breaking ties.

use std::collections::BTreeSet;
use std::path::{Component, Path};

use serde::Deserialize;

use crate::models::ProjectTag;

/// Sibling projects published together that share one license.
pub const DEFAULT_UMBRELLA_PROJECTS: &[&str] = &[
    "cudf", "cuml", "cugraph", "cuspatial", "cuxfilter", "cucim", "raft", "cuco", "cupy", "rmm",
    "kvikio", "ucx-py",
];

pub const DEFAULT_CCCL_ROOT: &str = "cccl";

/// Sub-libraries whose licenses are contained in the CCCL root license.
pub const DEFAULT_CCCL_COMPONENTS: &[&str] = &["cub", "thrust", "libcudacxx"];

const SRC_SUFFIXES: &[&str] = &["-src", "_src"];
const CONTEXT_DIRS: &[&str] = &["c", "cpp"];

/// Name lists the classifier matches path segments against.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ReferenceSets {
    pub umbrella_projects: BTreeSet<String>,
    pub cccl_root: String,
    pub cccl_components: BTreeSet<String>,
}

impl Default for ReferenceSets {
    fn default() -> Self {
        Self {
            umbrella_projects: DEFAULT_UMBRELLA_PROJECTS.iter().map(|s| s.to_string()).collect(),
            cccl_root: DEFAULT_CCCL_ROOT.to_string(),
            cccl_components: DEFAULT_CCCL_COMPONENTS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// A rule that fired, and how specific its match was.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Candidate {
    depth: usize,
    strength: u8,
    tag: ProjectTag,
}

type Rule = fn(&ReferenceSets, &[&str]) -> Option<Candidate>;

/// Classification rules in precedence order.
const RULES: &[Rule] = &[cccl_rule, umbrella_rule];

impl ReferenceSets {
    /// Lower-case every configured name so matching is case-insensitive.
    pub fn normalized(self) -> Self {
        Self {
            umbrella_projects: self.umbrella_projects.iter().map(|s| s.to_lowercase()).collect(),
            cccl_root: self.cccl_root.to_lowercase(),
            cccl_components: self.cccl_components.iter().map(|s| s.to_lowercase()).collect(),
        }
    }

    /// Classify a location path. Pure: the same path always yields the same
    /// tag.
    pub fn classify(&self, path: &str) -> ProjectTag {
        let segments = segments(path);
        let mut best: Option<Candidate> = None;

        for rule in RULES {
            let Some(candidate) = rule(self, &segments) else {
                continue;
            };
            // Earlier rules keep the spot on equal depth.
            if best.as_ref().map_or(true, |current| candidate.depth > current.depth) {
                best = Some(candidate);
            }
        }

        best.map_or(ProjectTag::Unclassified, |c| c.tag)
    }

    pub fn is_umbrella_project(&self, path: &str) -> bool {
        umbrella_rule(self, &segments(path)).is_some()
    }

    /// The CCCL component a path belongs to, if it sits below a CCCL root.
    pub fn cccl_component(&self, path: &str) -> Option<String> {
        match cccl_rule(self, &segments(path))?.tag {
            ProjectTag::CcclComponent { component, .. } => Some(component),
            _ => None,
        }
    }

    pub fn is_cccl_root(&self, path: &str) -> bool {
        matches!(
            cccl_rule(self, &segments(path)).map(|c| c.tag),
            Some(ProjectTag::CcclRoot { .. })
        )
    }
}

/// The deepest segment named like the CCCL root; a component name anywhere
/// below it makes the path a component rather than the root.
fn cccl_rule(refs: &ReferenceSets, segments: &[&str]) -> Option<Candidate> {
    let depth = segments
        .iter()
        .rposition(|s| clean_segment(s) == refs.cccl_root)?;
    let root = segments[..=depth].join("/");

    let component = segments[depth + 1..]
        .iter()
        .map(|s| clean_segment(s))
        .find(|s| refs.cccl_components.contains(s));

    let tag = match component {
        Some(component) => ProjectTag::CcclComponent { component, root },
        None => ProjectTag::CcclRoot { root },
    };
    Some(Candidate {
        depth,
        strength: 2,
        tag,
    })
}

/// Umbrella-name segments, strongest signal first: a `-src` suffix beats a
/// `c`/`cpp` directory underneath, which beats a bare name. Equal strength
/// goes to the deepest segment.
fn umbrella_rule(refs: &ReferenceSets, segments: &[&str]) -> Option<Candidate> {
    segments
        .iter()
        .enumerate()
        .filter_map(|(depth, seg)| {
            let name = clean_segment(seg);
            if !refs.umbrella_projects.contains(&name) {
                return None;
            }
            let strength = if has_src_suffix(seg) {
                2
            } else if segments
                .get(depth + 1)
                .is_some_and(|next| CONTEXT_DIRS.contains(&next.to_lowercase().as_str()))
            {
                1
            } else {
                0
            };
            Some(Candidate {
                depth,
                strength,
                tag: ProjectTag::UmbrellaMember { project: name },
            })
        })
        .max_by_key(|c| (c.strength, c.depth))
}

fn segments(path: &str) -> Vec<&str> {
    path.split(['/', '\\'])
        .filter(|s| !s.is_empty() && *s != ".")
        .collect()
}

/// Lower-case a segment and drop a trailing `-src`/`_src`.
fn clean_segment(segment: &str) -> String {
    let lower = segment.to_lowercase();
    for suffix in SRC_SUFFIXES {
        if let Some(stripped) = lower.strip_suffix(suffix) {
            return stripped.to_string();
        }
    }
    lower
}

fn has_src_suffix(segment: &str) -> bool {
    let lower = segment.to_lowercase();
    SRC_SUFFIXES.iter().any(|s| lower.ends_with(s))
}

/// Work out which project a discovered file belongs to and its path relative
/// to that project.
///
/// Scanning from the file upwards, a `<name>-src` directory names the project
/// and wins immediately. Otherwise the parent of the nearest `c`/`cpp`
/// directory is used, keeping that directory in the relative path. Failing
/// both, the scanned project root (if given) names the project.
pub fn project_location(path: &Path, project_root: Option<&Path>) -> (Option<String>, String) {
    let parts: Vec<String> = path
        .components()
        .filter_map(|c| match c {
            Component::Normal(p) => Some(p.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    let filename = parts.last().cloned().unwrap_or_default();

    let mut context_match: Option<(String, String)> = None;
    for i in (0..parts.len()).rev() {
        let part = &parts[i];

        if context_match.is_none() && i > 0 && CONTEXT_DIRS.contains(&part.as_str()) {
            context_match = Some((parts[i - 1].clone(), parts[i..].join("/")));
        }

        if let Some(project) = part.strip_suffix("-src") {
            let remaining = &parts[i + 1..];
            let relative = if remaining.is_empty() {
                filename.clone()
            } else {
                remaining.join("/")
            };
            return (Some(project.to_string()), relative);
        }
    }

    if let Some((project, relative)) = context_match {
        return (Some(project), relative);
    }

    if let Some(root) = project_root {
        if let Ok(relative) = path.strip_prefix(root) {
            let project = root
                .file_name()
                .map(|n| n.to_string_lossy().into_owned());
            let relative = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            return (project, relative);
        }
    }

    (None, filename)
}
