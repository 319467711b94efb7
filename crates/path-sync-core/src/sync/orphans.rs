//! Orphan detection
//!
//! A file is an orphan when its header names the current configuration but
//! no mapping produced it in this run.

use std::collections::BTreeSet;
use std::path::Path;

use path_sync_blocks::file_config_name;
use path_sync_fs::{NormalizedPath, remove_file, walk_files};

use crate::Result;
use crate::log::SyncLog;

/// Destination keys of every file whose header names `config_name`.
pub fn find_managed_files(dest_root: &Path, config_name: &str) -> Result<Vec<NormalizedPath>> {
    let mut managed = Vec::new();
    for path in walk_files(dest_root, &[".git"])? {
        if file_config_name(&path)?.as_deref() != Some(config_name) {
            continue;
        }
        if let Ok(rel) = path.strip_prefix(dest_root) {
            managed.push(NormalizedPath::new(rel));
        }
    }
    Ok(managed)
}

/// Delete managed files not in `synced`. Returns how many were (or in a dry
/// run, would be) deleted.
pub fn cleanup_orphans(
    dest_root: &Path,
    config_name: &str,
    synced: &BTreeSet<NormalizedPath>,
    dry_run: bool,
    log: &mut SyncLog,
) -> Result<usize> {
    let mut deleted = 0;
    for key in find_managed_files(dest_root, config_name)? {
        if synced.contains(&key) {
            continue;
        }
        if dry_run {
            log.info(format!("[DRY RUN] Would delete orphan: {key}"));
        } else {
            remove_file(dest_root.join(key.to_native()))?;
            log.info(format!("Deleted orphan: {key}"));
        }
        deleted += 1;
    }
    Ok(deleted)
}
