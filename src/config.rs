use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::engine::{GroupingOptions, ReferenceSets};
use crate::scanner::spdx::DEFAULT_FIRST_PARTY;
use crate::scanner::DEFAULT_EXCLUDE_DIRS;

/// Root configuration structure, deserialized from `.license-builder/config.toml`.
///
/// Every section is optional; missing keys take their built-in defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Project names the classifier recognises.
    pub reference: ReferenceSets,
    /// Which grouping passes run.
    pub grouping: GroupingOptions,
    /// What the scanners walk and skip.
    pub scan: ScanConfig,
    /// Where license texts are cached.
    pub licenses: LicensesConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Directory names never descended into.
    pub exclude_dirs: Vec<String>,
    /// Copyright owners whose SPDX headers are not third-party.
    pub first_party: Vec<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            exclude_dirs: DEFAULT_EXCLUDE_DIRS.iter().map(|s| s.to_string()).collect(),
            first_party: DEFAULT_FIRST_PARTY.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LicensesConfig {
    /// Directory holding `common_licenses/` and `infrequent_licenses/`.
    /// Defaults to the user cache directory.
    pub cache_dir: Option<PathBuf>,
}

impl LicensesConfig {
    pub fn resolved_cache_dir(&self) -> Option<PathBuf> {
        self.cache_dir
            .clone()
            .or_else(|| dirs::cache_dir().map(|d| d.join("license-builder")))
    }
}

fn parse(path: &Path) -> Result<Config> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let config: Config =
        toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))?;
    Ok(Config {
        reference: config.reference.normalized(),
        ..config
    })
}

/// Load the configuration, searching in order:
///
/// 1. `config_override` — path passed via `--config`
/// 2. `<project_path>/.license-builder/config.toml`
/// 3. `~/.config/license-builder/config.toml`
/// 4. Built-in [`Config::default`]
pub fn load_config(project_path: &Path, config_override: Option<&Path>) -> Result<Config> {
    if let Some(path) = config_override {
        return parse(path);
    }

    let project_config = project_path.join(".license-builder").join("config.toml");
    if project_config.exists() {
        return parse(&project_config);
    }

    if let Some(home) = dirs::home_dir() {
        let home_config = home
            .join(".config")
            .join("license-builder")
            .join("config.toml");
        if home_config.exists() {
            return parse(&home_config);
        }
    }

    Ok(Config::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let cfg = Config::default();
        assert!(cfg.grouping.deduplicate_rapids);
        assert!(cfg.grouping.handle_cccl);
        assert!(cfg.grouping.normalize_years);
        assert!(cfg.reference.umbrella_projects.contains("raft"));
        assert_eq!(cfg.reference.cccl_root, "cccl");
        assert!(cfg.scan.exclude_dirs.iter().any(|d| d == "node_modules"));
        assert_eq!(cfg.scan.first_party, vec!["NVIDIA"]);
        assert_eq!(cfg.licenses.cache_dir, None);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let cfg: Config = toml::from_str(
            r#"
            [grouping]
            handle_cccl = false
            "#,
        )
        .unwrap();
        assert!(!cfg.grouping.handle_cccl);
        assert!(cfg.grouping.normalize_years);
        assert!(cfg.reference.cccl_components.contains("thrust"));
    }

    #[test]
    fn test_full_file() {
        let cfg: Config = toml::from_str(
            r#"
            [reference]
            umbrella_projects = ["acme", "widgets"]
            cccl_root = "bundle"
            cccl_components = ["part"]

            [grouping]
            deduplicate_rapids = false
            normalize_years = false

            [scan]
            exclude_dirs = [".git"]
            first_party = ["ACME"]

            [licenses]
            cache_dir = "/var/cache/licenses"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.reference.umbrella_projects.len(), 2);
        assert_eq!(cfg.reference.cccl_root, "bundle");
        assert!(!cfg.grouping.deduplicate_rapids);
        assert!(cfg.grouping.handle_cccl);
        assert_eq!(cfg.scan.exclude_dirs, vec![".git"]);
        assert_eq!(cfg.scan.first_party, vec!["ACME"]);
        assert_eq!(
            cfg.licenses.resolved_cache_dir(),
            Some(PathBuf::from("/var/cache/licenses"))
        );
    }

    #[test]
    fn test_project_config_is_found_and_normalized() {
        let dir = TempDir::new().unwrap();
        let cfg_dir = dir.path().join(".license-builder");
        fs::create_dir_all(&cfg_dir).unwrap();
        fs::write(
            cfg_dir.join("config.toml"),
            "[reference]\numbrella_projects = [\"RAFT\"]\n",
        )
        .unwrap();

        let cfg = load_config(dir.path(), None).unwrap();
        assert!(cfg.reference.umbrella_projects.contains("raft"));
        assert_eq!(cfg.reference.umbrella_projects.len(), 1);
    }

    #[test]
    fn test_override_wins_and_errors_surface() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("custom.toml");
        fs::write(&path, "[grouping]\nnormalize_years = false\n").unwrap();
        let cfg = load_config(dir.path(), Some(&path)).unwrap();
        assert!(!cfg.grouping.normalize_years);

        fs::write(&path, "[grouping\n").unwrap();
        assert!(load_config(dir.path(), Some(&path)).is_err());
        assert!(load_config(dir.path(), Some(&dir.path().join("missing.toml"))).is_err());
    }
}
