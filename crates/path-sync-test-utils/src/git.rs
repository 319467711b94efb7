//! Git repository fixtures.
//!
//! Fixtures shell out to the `git` CLI so the code under test (which uses
//! `git2`) is checked against repositories built by a different tool.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;

/// Run `git` in `path` and return trimmed stdout.
///
/// # Panics
/// Panics if git cannot be spawned or exits non-zero.
pub fn git(path: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(path)
        .output()
        .unwrap_or_else(|e| panic!("git: failed to run `git {args:?}`: {e}"));
    if !output.status.success() {
        panic!(
            "git: `git {args:?}` failed in {}:\n{}",
            path.display(),
            String::from_utf8_lossy(&output.stderr)
        );
    }
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

fn configure_identity(path: &Path) {
    git(path, &["config", "user.email", "test@test.com"]);
    git(path, &["config", "user.name", "Test User"]);
    git(path, &["config", "commit.gpgsign", "false"]);
}

/// Initialises a real git repository with an initial commit on `main`.
///
/// Creates `README.md` and commits it with a configured test identity.
///
/// # Panics
/// Panics if any git operation fails.
pub fn real_git_repo_with_commit(path: &Path) {
    git(path, &["init"]);
    configure_identity(path);

    fs::write(path.join("README.md"), "# Test\n")
        .unwrap_or_else(|e| panic!("real_git_repo_with_commit: failed to write README.md: {e}"));

    git(path, &["add", "."]);
    git(path, &["commit", "-m", "Initial commit"]);
    git(path, &["branch", "-M", "main"]);
}

/// Stage everything in `path` and commit. Returns the new HEAD sha.
///
/// # Panics
/// Panics if any git operation fails.
pub fn commit_all(path: &Path, message: &str) -> String {
    git(path, &["add", "-A"]);
    git(path, &["commit", "--allow-empty", "-m", message]);
    git(path, &["rev-parse", "HEAD"])
}

/// A bare repository acting as `origin` plus a working clone of it.
///
/// The clone has one commit on `main`, already pushed, with `origin/main`
/// tracking set up.
pub struct RemotePair {
    _dir: TempDir,
    /// Path of the bare repository
    pub remote: PathBuf,
    /// Path of the working clone
    pub work: PathBuf,
}

impl Default for RemotePair {
    fn default() -> Self {
        Self::new()
    }
}

impl RemotePair {
    /// # Panics
    /// Panics if the temp directory or any git operation fails.
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap_or_else(|e| panic!("RemotePair: tempdir: {e}"));
        let remote = dir.path().join("remote.git");
        let work = dir.path().join("work");
        fs::create_dir_all(&remote).unwrap_or_else(|e| panic!("RemotePair: mkdir: {e}"));

        git(&remote, &["init", "--bare"]);
        git(&remote, &["symbolic-ref", "HEAD", "refs/heads/main"]);

        let remote_str = remote.to_string_lossy().to_string();
        let work_str = work.to_string_lossy().to_string();
        git(dir.path(), &["clone", &remote_str, &work_str]);
        configure_identity(&work);

        fs::write(work.join("README.md"), "# Destination\n")
            .unwrap_or_else(|e| panic!("RemotePair: failed to write README.md: {e}"));
        commit_all(&work, "Initial commit");
        git(&work, &["branch", "-M", "main"]);
        git(&work, &["push", "-u", "origin", "main"]);

        Self {
            _dir: dir,
            remote,
            work,
        }
    }

    /// Sha of `branch` in the bare remote, `None` if the branch is absent.
    pub fn remote_sha(&self, branch: &str) -> Option<String> {
        let output = Command::new("git")
            .args(["rev-parse", "--verify", "--quiet", &format!("refs/heads/{branch}")])
            .current_dir(&self.remote)
            .output()
            .ok()?;
        output
            .status
            .success()
            .then(|| String::from_utf8_lossy(&output.stdout).trim().to_string())
    }

    /// Content of `path` on `branch` in the bare remote.
    pub fn remote_file(&self, branch: &str, path: &str) -> Option<String> {
        let output = Command::new("git")
            .args(["show", &format!("{branch}:{path}")])
            .current_dir(&self.remote)
            .output()
            .ok()?;
        output
            .status
            .success()
            .then(|| String::from_utf8_lossy(&output.stdout).to_string())
    }
}
