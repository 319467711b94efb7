//! Sync engine for path-sync
//!
//! A source repository declares, in `.github/<name>.src.yaml`, which of its
//! files belong in which destination repositories. This crate:
//!
//! - Loads and validates that configuration ([`config`])
//! - Expands path mappings into concrete files ([`resolver`])
//! - Writes them into a destination working tree, respecting ownership
//!   headers and destination-owned sections, and removes orphans ([`sync`])
//! - Skips destinations whose open PR already reflects the source commit
//!   ([`gate`])
//! - Runs verification commands with per-step failure policies ([`verify`])
//! - Pushes, opens or refreshes PRs and polls them for merge ([`pr`],
//!   [`automerge`])
//!
//! [`copy::run_copy`], [`dep_update::run_dep_update`] and
//! [`validate::validate_no_changes`] tie these together for the CLI.
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use path_sync_core::{SrcConfig, SyncLog, SyncOptions, src_config_path, sync_paths};
//!
//! let root = Path::new(".");
//! let config = SrcConfig::load(&src_config_path(root, "python-template"))?;
//! let dest = config.find_destination("api")?;
//! let mut log = SyncLog::new(&dest.name);
//! let result = sync_paths(&config, dest, root, Path::new("../api"), SyncOptions::default(), &mut log)?;
//! println!("{} changes", result.total());
//! # Ok::<(), path_sync_core::Error>(())
//! ```

pub mod automerge;
pub mod cmd;
pub mod config;
pub mod copy;
pub mod dep_update;
pub mod error;
pub mod gate;
pub mod log;
pub mod pr;
pub mod prompt;
pub mod resolver;
pub mod sync;
pub mod validate;
pub mod verify;
pub mod workspace;

pub use automerge::{MergeResult, format_summary, handle_auto_merge, wait_for_merge};
pub use config::{
    AutoMergeConfig, DepConfig, Destination, OnFail, PathMapping, SrcConfig, SyncMode,
    VerifyConfig, VerifyStep, dep_config_path, find_repo_root, src_config_path,
};
pub use copy::{CopyOptions, CopyReport, DestFailure, run_copy};
pub use dep_update::{DepRepoResult, DepStatus, DepUpdateOptions, DepUpdateReport, run_dep_update};
pub use error::{Error, Result};
pub use gate::{SyncMetadata, parse_sync_metadata, pr_already_synced};
pub use log::SyncLog;
pub use pr::PrRef;
pub use prompt::{AutoConfirm, Confirm};
pub use resolver::{ResolvedFile, resolve_mapping};
pub use sync::{SyncOptions, SyncResult, cleanup_orphans, sync_paths};
pub use validate::{ValidateOutcome, Violation, parse_skip_sections, validate_no_changes};
pub use verify::{VerifyOutcome, VerifyStatus, run_verify_steps};
