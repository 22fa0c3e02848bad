use std::fmt;

use serde::{Deserialize, Serialize};

use crate::engine::key::EquivalenceKey;

/// Where a license artifact was discovered.
///
/// Field order matters: the derived ordering sorts by project first, then by
/// the project-relative path, which is the order locations are listed in a
/// report.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Location {
    pub project: Option<String>,
    pub relative_path: String,
    pub path: String,
}

impl Location {
    pub fn new(path: impl Into<String>, project: Option<String>, relative_path: impl Into<String>) -> Self {
        Self {
            project,
            relative_path: relative_path.into(),
            path: path.into(),
        }
    }

    /// A location with no project information; the full path doubles as the
    /// relative path.
    pub fn from_path(path: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            project: None,
            relative_path: path.clone(),
            path,
        }
    }

    /// Project name as printed in reports.
    pub fn project_name(&self) -> &str {
        self.project.as_deref().unwrap_or("unknown")
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.project_name(), self.relative_path)
    }
}

/// How the scanner came across a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordOrigin {
    LicenseFile,
    SpdxHeader,
}

impl fmt::Display for RecordOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordOrigin::LicenseFile => write!(f, "license file"),
            RecordOrigin::SpdxHeader => write!(f, "SPDX header"),
        }
    }
}

/// One discovered license artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub location: Location,
    pub license_id: Option<String>,
    pub raw_text: Option<String>,
    pub copyright_lines: Vec<String>,
    pub origin: RecordOrigin,
}

impl Record {
    pub fn license_file(location: Location, license_id: Option<String>, text: String) -> Self {
        let copyright_lines = text
            .lines()
            .map(str::trim)
            .filter(|l| l.to_ascii_lowercase().starts_with("copyright"))
            .map(str::to_string)
            .collect();
        Self {
            location,
            license_id,
            raw_text: Some(text),
            copyright_lines,
            origin: RecordOrigin::LicenseFile,
        }
    }

    pub fn spdx_header(location: Location, license_id: String, copyright_lines: Vec<String>) -> Self {
        Self {
            location,
            license_id: Some(license_id),
            raw_text: None,
            copyright_lines,
            origin: RecordOrigin::SpdxHeader,
        }
    }

    /// License text, treating empty or whitespace-only text as absent.
    pub fn text(&self) -> Option<&str> {
        self.raw_text.as_deref().filter(|t| !t.trim().is_empty())
    }

    /// License identifier, treating an empty identifier as absent.
    pub fn license(&self) -> Option<&str> {
        self.license_id.as_deref().map(str::trim).filter(|id| !id.is_empty())
    }

    /// A record needs at least a text or an identifier to be grouped.
    pub fn is_valid(&self) -> bool {
        self.text().is_some() || self.license().is_some()
    }
}

/// Classification of a record's location.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ProjectTag {
    UmbrellaMember { project: String },
    /// `root` is the path prefix ending at the CCCL root directory.
    CcclRoot { root: String },
    CcclComponent { component: String, root: String },
    Unclassified,
}

impl ProjectTag {
    pub fn is_umbrella(&self) -> bool {
        matches!(self, ProjectTag::UmbrellaMember { .. })
    }
}

impl fmt::Display for ProjectTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectTag::UmbrellaMember { project } => write!(f, "umbrella-member ({})", project),
            ProjectTag::CcclRoot { .. } => write!(f, "cccl-root"),
            ProjectTag::CcclComponent { component, .. } => write!(f, "cccl-component ({})", component),
            ProjectTag::Unclassified => write!(f, "unclassified"),
        }
    }
}

/// One entry of the attribution report: records that share a license
/// obligation.
#[derive(Debug, Clone, Serialize)]
pub struct Group {
    pub key: EquivalenceKey,
    pub license_id: Option<String>,
    pub members: Vec<Record>,
    pub locations: Vec<Location>,
    pub merged_years: String,
    pub copyright_lines: Vec<String>,
    pub display_text: String,
    pub first_seen: usize,
}

impl Group {
    pub fn license_label(&self) -> &str {
        self.license_id.as_deref().unwrap_or("(unidentified)")
    }

    pub fn has_text(&self) -> bool {
        !self.display_text.is_empty()
    }
}
