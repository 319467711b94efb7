//! Error types for path-sync-blocks

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Filesystem error: {0}")]
    Fs(#[from] path_sync_fs::Error),

    #[error("Nested section '{inner}' inside '{outer}' at line {line}")]
    NestedSection {
        outer: String,
        inner: String,
        line: usize,
    },

    #[error("Mismatched section end at line {line}: expected '{expected}', found '{found}'")]
    MismatchedSection {
        expected: String,
        found: String,
        line: usize,
    },

    #[error("Unclosed section '{id}' opened at line {line}")]
    UnclosedSection { id: String, line: usize },

    #[error("Invalid marker pattern: {0}")]
    Regex(#[from] regex::Error),
}
