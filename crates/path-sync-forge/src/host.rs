//! Review host abstraction

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::Result;
use crate::checks::CheckRun;

/// Pull-request state as reported by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PrState {
    Open,
    Merged,
    Closed,
}

impl PrState {
    /// Parse the host's state string (`OPEN`, `MERGED`, `CLOSED`).
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "OPEN" => Some(Self::Open),
            "MERGED" => Some(Self::Merged),
            "CLOSED" => Some(Self::Closed),
            _ => None,
        }
    }
}

impl fmt::Display for PrState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Merged => write!(f, "merged"),
            Self::Closed => write!(f, "closed"),
        }
    }
}

/// How an auto-merged pull request lands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeMethod {
    #[default]
    Merge,
    Squash,
    Rebase,
}

impl fmt::Display for MergeMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Merge => write!(f, "merge"),
            Self::Squash => write!(f, "squash"),
            Self::Rebase => write!(f, "rebase"),
        }
    }
}

/// Everything needed to open a pull request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrRequest {
    /// Head branch
    pub head: String,
    pub title: String,
    pub body: String,
    pub labels: Vec<String>,
    pub reviewers: Vec<String>,
    pub assignees: Vec<String>,
}

/// Result of a create request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    /// A new pull request was opened at this URL
    Created { url: String },
    /// A pull request for the head branch is already open
    AlreadyExists,
}

/// Operations the PR lifecycle needs from the code-review service.
///
/// `repo` is the local working tree of the destination; the host derives the
/// remote repository from it. `pr_ref` is a head branch name or a PR URL.
pub trait ReviewHost {
    fn create_pr(&self, repo: &Path, request: &PrRequest) -> Result<CreateOutcome>;

    /// Replace the description of the open PR for `head`
    fn update_pr_body(&self, repo: &Path, head: &str, body: &str) -> Result<()>;

    /// Description of the open PR for `head`, `None` if no PR is open
    fn open_pr_body(&self, repo: &Path, head: &str) -> Result<Option<String>>;

    fn has_open_pr(&self, repo: &Path, head: &str) -> Result<bool> {
        Ok(self.open_pr_body(repo, head)?.is_some())
    }

    /// Close the open PR for `head`, leaving `comment`
    fn close_pr(&self, repo: &Path, head: &str, comment: &str) -> Result<()>;

    fn pr_state(&self, repo: &Path, pr_ref: &str) -> Result<PrState>;

    fn pr_url(&self, repo: &Path, pr_ref: &str) -> Result<Option<String>>;

    fn pr_checks(&self, repo: &Path, pr_ref: &str) -> Result<Vec<CheckRun>>;

    fn enable_auto_merge(
        &self,
        repo: &Path,
        pr_ref: &str,
        method: MergeMethod,
        delete_branch: bool,
    ) -> Result<()>;
}
