use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::source::{Destination, SrcConfig, src_config_path};
use super::verify::VerifyConfig;
use crate::Result;

const DEP_CONFIG_EXT: &str = ".dep.yaml";

/// `<repo_root>/.github/<name>.dep.yaml`
pub fn dep_config_path(repo_root: &Path, name: &str) -> PathBuf {
    repo_root
        .join(".github")
        .join(format!("{name}{DEP_CONFIG_EXT}"))
}

fn default_workdir() -> String {
    ".".to_string()
}

/// A command run in every destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateEntry {
    /// Relative to the destination root
    #[serde(default = "default_workdir")]
    pub workdir: String,
    pub command: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepPrConfig {
    pub branch: String,
    pub title: String,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub reviewers: Vec<String>,
    #[serde(default)]
    pub assignees: Vec<String>,
    #[serde(default)]
    pub auto_merge: bool,
}

/// Dependency update configuration, `.github/<name>.dep.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepConfig {
    pub name: String,
    /// Source config whose destinations are updated
    pub from_config: String,
    #[serde(default)]
    pub include_destinations: Vec<String>,
    #[serde(default)]
    pub exclude_destinations: Vec<String>,
    pub updates: Vec<UpdateEntry>,
    /// Unset `on_fail` means `skip`
    #[serde(default)]
    pub verify: VerifyConfig,
    pub pr: DepPrConfig,
    #[serde(default)]
    pub keep_pr_on_no_changes: bool,
}

impl DepConfig {
    pub fn load(path: &Path) -> Result<Self> {
        super::load_yaml(path)
    }

    /// Destinations of the referenced source config after include/exclude
    /// filtering.
    pub fn load_destinations(&self, repo_root: &Path) -> Result<Vec<Destination>> {
        let src = SrcConfig::load(&src_config_path(repo_root, &self.from_config))?;
        Ok(self.filter_destinations(src.destinations))
    }

    pub fn filter_destinations(&self, destinations: Vec<Destination>) -> Vec<Destination> {
        destinations
            .into_iter()
            .filter(|d| {
                self.include_destinations.is_empty() || self.include_destinations.contains(&d.name)
            })
            .filter(|d| !self.exclude_destinations.contains(&d.name))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const DEP_YAML: &str = r#"
name: uv-lock
from_config: python-template
exclude_destinations: [legacy]
updates:
  - command: uv lock --upgrade
pr:
  branch: deps/uv-lock
  title: "chore: update uv.lock"
  auto_merge: true
"#;

    #[test]
    fn parses_with_defaults() {
        let config: DepConfig = serde_yaml::from_str(DEP_YAML).unwrap();
        assert_eq!(config.updates[0].workdir, ".");
        assert_eq!(config.verify.on_fail, None);
        assert!(config.pr.auto_merge);
        assert!(config.pr.labels.is_empty());
    }

    #[test]
    fn loads_destinations_from_source_config() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join(".github")).unwrap();
        fs::write(
            src_config_path(temp.path(), "python-template"),
            "name: python-template\ndestinations:\n  - name: app\n  - name: legacy\n  - name: lib\n",
        )
        .unwrap();

        let mut config: DepConfig = serde_yaml::from_str(DEP_YAML).unwrap();
        let names = |dests: Vec<Destination>| dests.into_iter().map(|d| d.name).collect::<Vec<_>>();
        assert_eq!(
            names(config.load_destinations(temp.path()).unwrap()),
            vec!["app", "lib"]
        );

        config.include_destinations = vec!["lib".to_string(), "legacy".to_string()];
        assert_eq!(names(config.load_destinations(temp.path()).unwrap()), vec!["lib"]);
    }
}
