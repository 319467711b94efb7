//! Destination working trees

use std::fs;
use std::path::{Path, PathBuf};

use path_sync_git::{GitRepo, Vcs};

use crate::config::Destination;
use crate::prompt::Confirm;
use crate::{Error, Result};

/// `<work_dir>/<name>` when a work dir is given, otherwise the destination's
/// path relative to the source root.
pub fn resolve_dest_root(dest: &Destination, src_root: &Path, work_dir: Option<&Path>) -> PathBuf {
    match work_dir {
        Some(dir) => dir.join(&dest.name),
        None => src_root.join(&dest.dest_path_relative),
    }
}

/// Open the destination repository, cloning it when missing.
///
/// A directory that exists but is not a repository is replaced by a fresh
/// clone after confirmation. Dry runs never clone.
pub fn ensure_repo(
    dest: &Destination,
    path: &Path,
    dry_run: bool,
    confirm: &dyn Confirm,
) -> Result<GitRepo> {
    let unavailable = |reason: &str| Error::DestinationUnavailable {
        name: dest.name.clone(),
        path: path.to_path_buf(),
        reason: reason.to_string(),
    };

    if path.exists() {
        if let Ok(repo) = GitRepo::open(path) {
            return Ok(repo);
        }
        if dry_run {
            return Err(unavailable("not a git repository (dry run, not re-cloning)"));
        }
        if dest.repo_url.is_empty() {
            return Err(unavailable("not a git repository and no repo_url configured"));
        }
        let prompt = format!("{} is not a git repository. Delete and re-clone?", path.display());
        if !confirm.confirm(&prompt) {
            return Err(Error::Aborted {
                message: format!("declined to re-clone {}", dest.name),
            });
        }
        fs::remove_dir_all(path)?;
    } else if dry_run {
        return Err(unavailable("not cloned (dry run)"));
    } else if dest.repo_url.is_empty() {
        return Err(unavailable("missing and no repo_url configured"));
    }

    Ok(GitRepo::clone_from(&dest.repo_url, path)?)
}

/// Fetch, hard-reset the default branch to its remote state and recreate
/// `branch` from it.
pub fn reset_branch_from_default(
    vcs: &dyn Vcs,
    remote: &str,
    default_branch: &str,
    branch: &str,
) -> Result<()> {
    let upstream = format!("{remote}/{default_branch}");
    vcs.fetch(remote)?;
    if vcs.branch_exists(default_branch)? {
        vcs.checkout(default_branch)?;
    } else {
        vcs.create_branch(default_branch, Some(&upstream))?;
    }
    vcs.reset_hard(&upstream)?;
    if vcs.delete_branch(branch)? {
        tracing::debug!(branch = %branch, "Deleted stale branch");
    }
    vcs.create_branch(branch, None)?;
    Ok(())
}

/// Check out `branch`, creating it at HEAD when absent.
pub fn checkout_or_create(vcs: &dyn Vcs, branch: &str) -> Result<()> {
    if vcs.branch_exists(branch)? {
        vcs.checkout(branch)?;
    } else {
        vcs.create_branch(branch, None)?;
    }
    Ok(())
}
