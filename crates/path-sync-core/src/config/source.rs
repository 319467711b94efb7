use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::{Component, Path, PathBuf};

use glob::Pattern;
use path_sync_blocks::CommentTable;
use path_sync_forge::MergeMethod;
use serde::{Deserialize, Serialize};

use super::verify::VerifyConfig;
use crate::{Error, Result};

/// Directories never synced from a directory or glob source.
pub const DEFAULT_EXCLUDE_DIRS: &[&str] = &[
    "__pycache__",
    ".git",
    ".venv",
    "venv",
    "node_modules",
    ".mypy_cache",
    ".pytest_cache",
    ".ruff_cache",
    ".tox",
];

pub const DEFAULT_BODY_TEMPLATE: &str = "\
<!-- path-sync: sha={src_sha_short} ts={src_commit_ts} -->
Synced from [{src_repo_name}]({src_repo_url}) @ `{src_sha_short}` ({src_commit_ts})

<details>
<summary>Sync Log</summary>

```
{sync_log}
```

</details>
";

const SRC_CONFIG_EXT: &str = ".src.yaml";

/// `<repo_root>/.github/<name>.src.yaml`
pub fn src_config_path(repo_root: &Path, name: &str) -> PathBuf {
    repo_root
        .join(".github")
        .join(format!("{name}{SRC_CONFIG_EXT}"))
}

fn default_true() -> bool {
    true
}

fn default_remote() -> String {
    "origin".to_string()
}

fn default_branch() -> String {
    "main".to_string()
}

fn default_exclude_dirs() -> BTreeSet<String> {
    DEFAULT_EXCLUDE_DIRS.iter().map(|d| d.to_string()).collect()
}

/// How a resolved file is written to the destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncMode {
    /// Ownership header plus section merge
    #[default]
    Sync,
    /// Overwrite whenever content differs
    Replace,
    /// Create once, never overwrite
    Scaffold,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoMergeConfig {
    #[serde(default)]
    pub method: MergeMethod,
    #[serde(default = "default_true")]
    pub delete_branch: bool,
    #[serde(default = "AutoMergeConfig::default_poll_interval")]
    pub poll_interval_seconds: u64,
    #[serde(default = "AutoMergeConfig::default_timeout")]
    pub timeout_seconds: u64,
}

impl AutoMergeConfig {
    fn default_poll_interval() -> u64 {
        30
    }

    fn default_timeout() -> u64 {
        900
    }
}

impl Default for AutoMergeConfig {
    fn default() -> Self {
        Self {
            method: MergeMethod::default(),
            delete_branch: true,
            poll_interval_seconds: Self::default_poll_interval(),
            timeout_seconds: Self::default_timeout(),
        }
    }
}

/// Per-extension comment syntax overrides for headers and section markers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderConfig {
    #[serde(default)]
    pub comment_prefixes: BTreeMap<String, String>,
    #[serde(default)]
    pub comment_suffixes: BTreeMap<String, String>,
}

impl HeaderConfig {
    /// Build the comment table. An extension with only a suffix override keeps
    /// its built-in prefix.
    pub fn comment_table(&self) -> CommentTable {
        let extensions: BTreeSet<&String> = self
            .comment_prefixes
            .keys()
            .chain(self.comment_suffixes.keys())
            .collect();
        let builtin = CommentTable::new();
        extensions.into_iter().fold(CommentTable::new(), |table, ext| {
            let sample = PathBuf::from(format!("file.{}", ext.trim_start_matches('.')));
            let fallback = builtin.style_for(&sample);
            let prefix = self
                .comment_prefixes
                .get(ext)
                .cloned()
                .or_else(|| fallback.as_ref().map(|s| s.prefix().to_string()))
                .unwrap_or_else(|| "#".to_string());
            let suffix = self
                .comment_suffixes
                .get(ext)
                .cloned()
                .or_else(|| fallback.as_ref().map(|s| s.suffix().to_string()))
                .unwrap_or_default();
            table.with_override(ext, prefix, suffix)
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrDefaults {
    /// Supports `{name}` and `{dest_name}`
    #[serde(default = "PrDefaults::default_title")]
    pub title: String,
    #[serde(default = "PrDefaults::default_body_template")]
    pub body_template: String,
    /// Appended after a `---` rule
    #[serde(default)]
    pub body_suffix: String,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub reviewers: Vec<String>,
    #[serde(default)]
    pub assignees: Vec<String>,
}

impl PrDefaults {
    fn default_title() -> String {
        "chore: sync {name} files".to_string()
    }

    fn default_body_template() -> String {
        DEFAULT_BODY_TEMPLATE.to_string()
    }
}

impl Default for PrDefaults {
    fn default() -> Self {
        Self {
            title: Self::default_title(),
            body_template: Self::default_body_template(),
            body_suffix: String::new(),
            labels: Vec::new(),
            reviewers: Vec::new(),
            assignees: Vec::new(),
        }
    }
}

/// What in the source maps to what in a destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathMapping {
    /// File, directory, or glob relative to the source root
    pub src_path: String,
    /// Destination path; empty means same as `src_path` (or the glob prefix)
    #[serde(default)]
    pub dest_path: String,
    #[serde(default)]
    pub sync_mode: SyncMode,
    #[serde(default = "default_exclude_dirs")]
    pub exclude_dirs: BTreeSet<String>,
    /// Globs matched against file names
    #[serde(default)]
    pub exclude_file_patterns: BTreeSet<String>,
    /// Wrap section-less files in a `synced` section; unset follows
    /// `wrap_synced_files`
    #[serde(default)]
    pub wrap: Option<bool>,
}

impl PathMapping {
    pub fn new(src_path: impl Into<String>) -> Self {
        Self {
            src_path: src_path.into(),
            dest_path: String::new(),
            sync_mode: SyncMode::default(),
            exclude_dirs: default_exclude_dirs(),
            exclude_file_patterns: BTreeSet::new(),
            wrap: None,
        }
    }

    pub fn with_dest(mut self, dest_path: impl Into<String>) -> Self {
        self.dest_path = dest_path.into();
        self
    }

    pub fn with_mode(mut self, mode: SyncMode) -> Self {
        self.sync_mode = mode;
        self
    }

    pub fn should_wrap(&self, config_default: bool) -> bool {
        self.wrap.unwrap_or(config_default)
    }

    pub fn resolved_dest_path(&self) -> &str {
        if self.dest_path.is_empty() {
            &self.src_path
        } else {
            &self.dest_path
        }
    }

    /// Whether a path relative to the source root is excluded, either by a
    /// directory component or by a file-name pattern.
    pub fn is_excluded(&self, rel: &Path) -> bool {
        let in_excluded_dir = rel.components().any(|c| match c {
            Component::Normal(part) => part
                .to_str()
                .is_some_and(|p| self.exclude_dirs.contains(p)),
            _ => false,
        });
        if in_excluded_dir {
            return true;
        }
        let Some(name) = rel.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        self.exclude_file_patterns
            .iter()
            .filter_map(|p| Pattern::new(p).ok())
            .any(|p| p.matches(name))
    }
}

/// One destination repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Destination {
    pub name: String,
    #[serde(default)]
    pub repo_url: String,
    /// Working tree location relative to the source root
    #[serde(default)]
    pub dest_path_relative: String,
    /// Sync branch; empty means `sync/<config name>`
    #[serde(default)]
    pub copy_branch: String,
    #[serde(default = "default_branch")]
    pub default_branch: String,
    /// Destination key -> section ids left untouched
    #[serde(default)]
    pub skip_sections: BTreeMap<String, Vec<String>>,
    /// Globs on the destination key
    #[serde(default)]
    pub skip_file_patterns: BTreeSet<String>,
    #[serde(default)]
    pub include_groups: Vec<String>,
    #[serde(default)]
    pub verify: Option<VerifyConfig>,
}

impl Destination {
    pub fn new(name: impl Into<String>, dest_path_relative: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            repo_url: String::new(),
            dest_path_relative: dest_path_relative.into(),
            copy_branch: String::new(),
            default_branch: default_branch(),
            skip_sections: BTreeMap::new(),
            skip_file_patterns: BTreeSet::new(),
            include_groups: Vec::new(),
            verify: None,
        }
    }

    pub fn resolved_copy_branch(&self, config_name: &str) -> String {
        if self.copy_branch.is_empty() {
            format!("sync/{config_name}")
        } else {
            self.copy_branch.clone()
        }
    }

    pub fn is_skipped(&self, dest_key: &str) -> bool {
        self.skip_file_patterns
            .iter()
            .filter_map(|p| Pattern::new(p).ok())
            .any(|p| p.matches(dest_key))
    }

    pub fn skip_sections_for(&self, dest_key: &str) -> &[String] {
        self.skip_sections
            .get(dest_key)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn resolve_verify(&self, fallback: Option<&VerifyConfig>) -> VerifyConfig {
        self.verify
            .as_ref()
            .or(fallback)
            .cloned()
            .unwrap_or_default()
    }
}

/// Source configuration, `.github/<name>.src.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SrcConfig {
    pub name: String,
    /// Remote of the source repository used for the PR link
    #[serde(default = "default_remote")]
    pub git_remote: String,
    #[serde(default)]
    pub src_repo_url: String,
    #[serde(default)]
    pub header_config: HeaderConfig,
    #[serde(default)]
    pub pr_defaults: PrDefaults,
    #[serde(default)]
    pub paths: Vec<PathMapping>,
    #[serde(default)]
    pub path_groups: BTreeMap<String, Vec<PathMapping>>,
    #[serde(default)]
    pub destinations: Vec<Destination>,
    #[serde(default)]
    pub verify: Option<VerifyConfig>,
    #[serde(default)]
    pub wrap_synced_files: bool,
    #[serde(default)]
    pub auto_merge: Option<AutoMergeConfig>,
    #[serde(default)]
    pub keep_pr_on_no_changes: bool,
    /// Bypass the open-PR idempotency check
    #[serde(default)]
    pub force_resync: bool,
}

impl SrcConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            git_remote: default_remote(),
            src_repo_url: String::new(),
            header_config: HeaderConfig::default(),
            pr_defaults: PrDefaults::default(),
            paths: Vec::new(),
            path_groups: BTreeMap::new(),
            destinations: Vec::new(),
            verify: None,
            wrap_synced_files: false,
            auto_merge: None,
            keep_pr_on_no_changes: false,
            force_resync: false,
        }
    }

    /// Parse and validate YAML content.
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self =
            serde_yaml::from_str(content).map_err(|e| Error::InvalidConfig {
                message: e.to_string(),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a config file.
    pub fn load(path: &Path) -> Result<Self> {
        let config: Self = super::load_yaml(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations that would fail half-way through a run.
    pub fn validate(&self) -> Result<()> {
        let mut names = HashSet::new();
        for dest in &self.destinations {
            if !names.insert(dest.name.as_str()) {
                return Err(Error::InvalidConfig {
                    message: format!("Duplicate destination name {:?}", dest.name),
                });
            }
            let mut seen = HashSet::new();
            for group in &dest.include_groups {
                if !self.path_groups.contains_key(group) {
                    return Err(Error::InvalidConfig {
                        message: format!(
                            "Destination {:?} references unknown path_group {:?}",
                            dest.name, group
                        ),
                    });
                }
                if !seen.insert(group.as_str()) {
                    return Err(Error::InvalidConfig {
                        message: format!(
                            "Destination {:?} has duplicate include_group {:?}",
                            dest.name, group
                        ),
                    });
                }
            }
            for pattern in &dest.skip_file_patterns {
                check_pattern(pattern)?;
            }
        }
        let mappings = self.paths.iter().chain(self.path_groups.values().flatten());
        for mapping in mappings {
            for pattern in &mapping.exclude_file_patterns {
                check_pattern(pattern)?;
            }
        }
        Ok(())
    }

    /// Own mappings followed by the destination's included groups.
    pub fn resolve_paths(&self, dest: &Destination) -> Vec<&PathMapping> {
        let groups = dest
            .include_groups
            .iter()
            .filter_map(|g| self.path_groups.get(g))
            .flatten();
        self.paths.iter().chain(groups).collect()
    }

    pub fn find_destination(&self, name: &str) -> Result<&Destination> {
        self.destinations
            .iter()
            .find(|d| d.name == name)
            .ok_or_else(|| Error::DestinationNotFound {
                name: name.to_string(),
            })
    }

    pub fn comment_table(&self) -> CommentTable {
        self.header_config.comment_table()
    }
}

fn check_pattern(pattern: &str) -> Result<()> {
    Pattern::new(pattern)
        .map(|_| ())
        .map_err(|e| Error::InvalidPattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })
}
