//! Version-control collaborator trait

use std::path::{Path, PathBuf};

use crate::Result;
use crate::commits::CommitStamp;

/// Committer name used when the repository has no identity configured.
pub const BOT_NAME: &str = "path-sync[bot]";

/// Committer email used when the repository has no identity configured.
pub const BOT_EMAIL: &str = "path-sync[bot]@users.noreply.github.com";

/// Operations the sync engine needs from a working-tree repository.
///
/// Branch names are short names (`main`, `sync/cfg`); references accept
/// anything revparse understands (`origin/main`, a sha).
pub trait Vcs {
    /// Root of the working tree
    fn root(&self) -> &Path;

    /// Checked-out branch, or `None` when HEAD is detached or unborn
    fn current_branch(&self) -> Result<Option<String>>;

    /// The commit HEAD points at
    fn head_commit(&self) -> Result<CommitStamp>;

    /// URL configured for `remote`, if the remote exists
    fn remote_url(&self, remote: &str) -> Result<Option<String>>;

    /// Fetch all configured refspecs from `remote`
    fn fetch(&self, remote: &str) -> Result<()>;

    fn branch_exists(&self, branch: &str) -> Result<bool>;

    /// Check out an existing local branch
    fn checkout(&self, branch: &str) -> Result<()>;

    /// Create `branch` at `start` (HEAD when `None`) and check it out
    fn create_branch(&self, branch: &str, start: Option<&str>) -> Result<()>;

    /// Delete a local branch. Returns `false` if it did not exist.
    fn delete_branch(&self, branch: &str) -> Result<bool>;

    /// Hard-reset the current branch and working tree to `reference`
    fn reset_hard(&self, reference: &str) -> Result<()>;

    /// Whether the working tree has modified, deleted or untracked files
    fn is_dirty(&self) -> Result<bool>;

    /// Stage every change in the working tree, deletions included
    fn stage_all(&self) -> Result<()>;

    /// Stage the given path specs. Entries starting with `!` are unstaged
    /// again after the includes are added.
    fn stage_paths(&self, specs: &[String]) -> Result<()>;

    fn has_staged_changes(&self) -> Result<bool>;

    /// Commit the index. Returns the new sha, or `None` when nothing is
    /// staged. A bot identity is configured if the repository has none.
    fn commit(&self, message: &str) -> Result<Option<String>>;

    fn push(&self, remote: &str, branch: &str, force: bool) -> Result<()>;

    /// Whether `branch` exists on `remote` right now and has the same tree as
    /// HEAD. The tracking ref is refreshed, or dropped when the branch is gone.
    fn remote_branch_matches_head(&self, remote: &str, branch: &str) -> Result<bool>;

    /// Paths that differ between `base` and the working tree
    fn changed_paths(&self, base: &str) -> Result<Vec<PathBuf>>;

    /// Text content of `path` at `reference`, `None` if absent or binary
    fn file_at_ref(&self, path: &Path, reference: &str) -> Result<Option<String>>;
}
