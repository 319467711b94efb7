//! YAML configuration for copy and dependency-update runs
//!
//! Configs live under `.github/` in the source repository:
//!
//! - `.github/<name>.src.yaml`: [`SrcConfig`], what to sync and where
//! - `.github/<name>.dep.yaml`: [`DepConfig`], commands to run across the
//!   destinations of a source config

mod dep;
mod source;
mod verify;

pub use dep::{DepConfig, DepPrConfig, UpdateEntry, dep_config_path};
pub use source::{
    AutoMergeConfig, DEFAULT_BODY_TEMPLATE, DEFAULT_EXCLUDE_DIRS, Destination, HeaderConfig,
    PathMapping, PrDefaults, SrcConfig, SyncMode, src_config_path,
};
pub use verify::{CommitConfig, OnFail, VerifyConfig, VerifyStep};

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;

use crate::{Error, Result};

/// Read and deserialize a YAML file.
pub fn load_yaml<T: DeserializeOwned>(path: &Path) -> Result<T> {
    if !path.exists() {
        return Err(Error::ConfigNotFound {
            path: path.to_path_buf(),
        });
    }
    let content = path_sync_fs::read_text(path)?;
    serde_yaml::from_str(&content).map_err(|source| Error::ConfigParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Walk up from `start` to the first directory containing `.git`.
pub fn find_repo_root(start: &Path) -> Result<PathBuf> {
    let start = path_sync_fs::canonical_root(start)?;
    start
        .ancestors()
        .find(|dir| dir.join(".git").exists())
        .map(Path::to_path_buf)
        .ok_or(Error::RepoRootNotFound { path: start.clone() })
}

/// Split a comma-separated CLI value, dropping empty entries.
pub fn split_csv(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
