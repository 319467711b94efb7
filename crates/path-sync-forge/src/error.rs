//! Error types for path-sync-forge

/// Result type for path-sync-forge operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur talking to the review host
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Failed to run '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{command}' failed (exit code {code:?}): {stderr}")]
    CommandFailed {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("Unexpected output from '{command}': {message}")]
    UnexpectedOutput { command: String, message: String },

    #[error("No pull request found for '{head}'")]
    PullRequestNotFound { head: String },

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
