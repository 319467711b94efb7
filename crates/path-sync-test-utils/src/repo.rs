//! [`TestRepo`] helper for working-tree scenarios.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::git;

/// A temporary directory with helpers for writing files and asserting on
/// them by relative path.
pub struct TestRepo {
    temp_dir: TempDir,
}

impl Default for TestRepo {
    fn default() -> Self {
        Self::new()
    }
}

impl TestRepo {
    /// Create an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap_or_else(|e| panic!("TestRepo: tempdir: {e}")),
        }
    }

    /// Create a temporary directory holding a git repository with one commit.
    pub fn with_git() -> Self {
        let repo = Self::new();
        git::real_git_repo_with_commit(repo.root());
        repo
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn path(&self, rel: &str) -> PathBuf {
        self.root().join(rel)
    }

    /// Write `content` at `rel`, creating parent directories.
    pub fn write(&self, rel: &str, content: &str) -> &Self {
        let full = self.path(rel);
        if let Some(parent) = full.parent() {
            fs::create_dir_all(parent)
                .unwrap_or_else(|e| panic!("TestRepo: mkdir {}: {e}", parent.display()));
        }
        fs::write(&full, content)
            .unwrap_or_else(|e| panic!("TestRepo: write {}: {e}", full.display()));
        self
    }

    /// # Panics
    /// Panics if the file cannot be read.
    pub fn read(&self, rel: &str) -> String {
        let full = self.path(rel);
        fs::read_to_string(&full)
            .unwrap_or_else(|e| panic!("TestRepo: read {}: {e}", full.display()))
    }

    pub fn assert_file_exists(&self, rel: &str) {
        let full = self.path(rel);
        assert!(full.exists(), "Expected file to exist: {}", full.display());
    }

    pub fn assert_file_not_exists(&self, rel: &str) {
        let full = self.path(rel);
        assert!(
            !full.exists(),
            "Expected file NOT to exist: {}",
            full.display()
        );
    }

    /// # Panics
    /// Panics if the file cannot be read or does not contain `content`.
    pub fn assert_file_contains(&self, rel: &str, content: &str) {
        let actual = self.read(rel);
        assert!(
            actual.contains(content),
            "File {rel} does not contain expected content.\nExpected: {content}\nActual: {actual}"
        );
    }
}
