//! Path mapping expansion
//!
//! Turns a [`PathMapping`] into concrete `(source file, destination key)`
//! pairs. The key is slash-normalized and relative to the destination root;
//! it is what skip patterns and `skip_sections` are matched against.

use std::path::{Path, PathBuf};

use path_sync_fs::{NormalizedPath, walk_files};

use crate::config::PathMapping;
use crate::log::SyncLog;
use crate::{Error, Result};

const GLOB_CHARS: &[char] = &['*', '?', '['];

/// One file to sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFile {
    pub source: PathBuf,
    pub dest_key: NormalizedPath,
}

impl ResolvedFile {
    pub fn dest_path(&self, dest_root: &Path) -> PathBuf {
        dest_root.join(self.dest_key.to_native())
    }
}

pub fn is_glob(pattern: &str) -> bool {
    pattern.contains(GLOB_CHARS)
}

/// Directory part of a glob before its first wildcard segment.
///
/// `configs/*.yaml` gives `configs`, `a/b*/c` gives `a`, `**/*.md` gives ``.
pub fn glob_prefix(pattern: &str) -> &str {
    let fixed = pattern
        .find(GLOB_CHARS)
        .map_or(pattern, |idx| &pattern[..idx]);
    fixed.rfind('/').map_or("", |idx| &fixed[..idx])
}

/// Expand `mapping` against `src_root`. Results are sorted by destination key.
///
/// A missing literal source and a glob without matches are logged as
/// warnings and produce no files.
pub fn resolve_mapping(
    mapping: &PathMapping,
    src_root: &Path,
    log: &mut SyncLog,
) -> Result<Vec<ResolvedFile>> {
    let mut files = if is_glob(&mapping.src_path) {
        resolve_glob(mapping, src_root, log)?
    } else {
        let source = src_root.join(NormalizedPath::new(&mapping.src_path).to_native());
        if source.is_dir() {
            resolve_dir(mapping, src_root, &source)?
        } else if source.is_file() {
            vec![ResolvedFile {
                source,
                dest_key: NormalizedPath::new(mapping.resolved_dest_path()),
            }]
        } else {
            log.warn(format!("Source not found: {}", mapping.src_path));
            Vec::new()
        }
    };
    files.sort_by(|a, b| a.dest_key.cmp(&b.dest_key));
    Ok(files)
}

fn resolve_dir(mapping: &PathMapping, src_root: &Path, dir: &Path) -> Result<Vec<ResolvedFile>> {
    let skip_dirs: Vec<&str> = mapping.exclude_dirs.iter().map(String::as_str).collect();
    let dest_base = NormalizedPath::new(mapping.resolved_dest_path());
    let mut files = Vec::new();
    for source in walk_files(dir, &skip_dirs)? {
        let Ok(from_root) = source.strip_prefix(src_root) else {
            continue;
        };
        if mapping.is_excluded(from_root) {
            continue;
        }
        let Ok(rel) = source.strip_prefix(dir) else {
            continue;
        };
        files.push(ResolvedFile {
            dest_key: dest_base.join(rel),
            source,
        });
    }
    Ok(files)
}

fn resolve_glob(
    mapping: &PathMapping,
    src_root: &Path,
    log: &mut SyncLog,
) -> Result<Vec<ResolvedFile>> {
    let pattern = NormalizedPath::new(&mapping.src_path);
    let prefix = glob_prefix(pattern.as_str());
    let anchor = src_root.join(NormalizedPath::new(prefix).to_native());
    let dest_base = if mapping.dest_path.is_empty() {
        NormalizedPath::new(prefix)
    } else {
        NormalizedPath::new(&mapping.dest_path)
    };

    let root = glob::Pattern::escape(&src_root.to_string_lossy().replace('\\', "/"));
    let full = format!("{}/{}", root.trim_end_matches('/'), pattern);
    let matches = glob::glob(&full).map_err(|e| Error::InvalidPattern {
        pattern: mapping.src_path.clone(),
        message: e.to_string(),
    })?;

    let mut files = Vec::new();
    let mut matched_any = false;
    for entry in matches {
        let source = match entry {
            Ok(path) => path,
            Err(e) => {
                log.warn(format!("Unreadable glob match {}: {e}", e.path().display()));
                continue;
            }
        };
        matched_any = true;
        if !source.is_file() {
            continue;
        }
        let (Ok(from_root), Ok(rel)) = (source.strip_prefix(src_root), source.strip_prefix(&anchor))
        else {
            continue;
        };
        if mapping.is_excluded(from_root) {
            continue;
        }
        files.push(ResolvedFile {
            dest_key: dest_base.join(rel),
            source,
        });
    }
    if !matched_any {
        log.warn(format!("Glob matched no files: {}", mapping.src_path));
    }
    Ok(files)
}
