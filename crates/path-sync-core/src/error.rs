//! Error types for path-sync-core

use std::path::PathBuf;

/// Result type for path-sync-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in path-sync-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration file not found at expected path
    #[error("Configuration not found at {path}")]
    ConfigNotFound { path: PathBuf },

    /// Configuration file could not be parsed
    #[error("Invalid configuration in {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// Configuration parsed but is inconsistent
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// Destination named on the command line or in a dependency config is unknown
    #[error("Destination not found: {name}")]
    DestinationNotFound { name: String },

    /// Destination working tree is missing and cannot be cloned
    #[error("Destination '{name}' not available at {path}: {reason}")]
    DestinationUnavailable {
        name: String,
        path: PathBuf,
        reason: String,
    },

    /// No repository root above the starting directory
    #[error("No git repository found from {path}")]
    RepoRootNotFound { path: PathBuf },

    /// Malformed section markers in a synced file
    #[error("Section error in {path}: {source}")]
    Section {
        path: PathBuf,
        #[source]
        source: path_sync_blocks::Error,
    },

    /// Invalid source path pattern
    #[error("Invalid pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    /// Shell command could not be started
    #[error("Failed to run '{command}': {source}")]
    CommandSpawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// A verification step with the `fail` policy failed
    #[error("Verification failed for {dest}")]
    VerificationFailed { dest: String },

    /// Invalid `--skip-sections` entry
    #[error("Invalid format '{entry}', expected path:section_id")]
    InvalidSkipSection { entry: String },

    /// User declined a required confirmation
    #[error("Aborted: {message}")]
    Aborted { message: String },

    // Transparent wrappers for underlying crate errors
    #[error(transparent)]
    Fs(#[from] path_sync_fs::Error),

    #[error(transparent)]
    Blocks(#[from] path_sync_blocks::Error),

    #[error(transparent)]
    Git(#[from] path_sync_git::Error),

    #[error(transparent)]
    Forge(#[from] path_sync_forge::Error),

    #[error(transparent)]
    Regex(#[from] regex::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
