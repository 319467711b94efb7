//! Sync engine
//!
//! For every file a destination's mappings resolve to, picks the write
//! strategy from the mapping's [`SyncMode`](crate::config::SyncMode) and
//! produces at most one write. After all mappings, files still carrying this
//! configuration's header but no longer produced are removed.

mod file;
mod orphans;

pub use file::{FileContext, FileOutcome, FilePlan, sync_file};
pub use orphans::{cleanup_orphans, find_managed_files};

use std::collections::BTreeSet;
use std::path::Path;

use path_sync_fs::NormalizedPath;

use crate::Result;
use crate::config::{Destination, SrcConfig};
use crate::log::SyncLog;
use crate::resolver::resolve_mapping;

/// Options for one destination's file sync
#[derive(Debug, Clone, Copy, Default)]
pub struct SyncOptions {
    pub dry_run: bool,
    pub force_overwrite: bool,
    pub skip_orphan_cleanup: bool,
}

/// Outcome of syncing one destination tree
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncResult {
    pub content_changes: usize,
    pub orphans_deleted: usize,
    /// Keys of every file considered this run, written or not
    pub synced: BTreeSet<NormalizedPath>,
}

impl SyncResult {
    pub fn total(&self) -> usize {
        self.content_changes + self.orphans_deleted
    }
}

/// Sync every mapping for `dest` into `dest_root`, then clean up orphans.
///
/// # Errors
///
/// Malformed section markers in a source or destination file abort the
/// destination with [`Error::Section`](crate::Error::Section).
pub fn sync_paths(
    config: &SrcConfig,
    dest: &Destination,
    src_root: &Path,
    dest_root: &Path,
    opts: SyncOptions,
    log: &mut SyncLog,
) -> Result<SyncResult> {
    let comments = config.comment_table();
    let ctx = FileContext {
        config_name: &config.name,
        comments: &comments,
        dry_run: opts.dry_run,
        force_overwrite: opts.force_overwrite,
    };

    let mut result = SyncResult::default();
    for mapping in config.resolve_paths(dest) {
        let wrap = mapping.should_wrap(config.wrap_synced_files);
        for file in resolve_mapping(mapping, src_root, log)? {
            let key = file.dest_key.as_str();
            if dest.is_skipped(key) {
                log.debug(format!("Skipping {key} (skip_file_patterns)"));
                continue;
            }
            let plan = FilePlan {
                mode: mapping.sync_mode,
                wrap,
                skip_sections: dest.skip_sections_for(key),
            };
            if sync_file(&ctx, &file, dest_root, plan, log)?.is_write() {
                result.content_changes += 1;
            }
            result.synced.insert(file.dest_key);
        }
    }

    if !opts.skip_orphan_cleanup {
        result.orphans_deleted =
            cleanup_orphans(dest_root, &config.name, &result.synced, opts.dry_run, log)?;
    }
    Ok(result)
}
