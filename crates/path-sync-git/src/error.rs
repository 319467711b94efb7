//! Error types for path-sync-git

use std::path::PathBuf;

/// Result type for path-sync-git operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in path-sync-git operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("Filesystem error: {0}")]
    Fs(#[from] path_sync_fs::Error),

    #[error("Not a git repository: {path}")]
    NotARepository { path: PathBuf },

    #[error("Branch '{name}' not found")]
    BranchNotFound { name: String },

    #[error("Reference '{reference}' not found")]
    RefNotFound { reference: String },

    #[error("Remote '{name}' not found")]
    RemoteNotFound { name: String },

    #[error("Clone of {url} failed: {message}")]
    CloneFailed { url: String, message: String },

    #[error("Fetch failed: {message}")]
    FetchFailed { message: String },

    #[error("Push failed: {message}")]
    PushFailed { message: String },

    #[error("Commit {sha} has an out-of-range timestamp")]
    InvalidTimestamp { sha: String },
}
