//! Slash-normalized relative paths
//!
//! Destination keys are compared against skip patterns and section skip
//! lists, so they must look the same on every platform.

use std::path::{Path, PathBuf};

/// A relative path normalized to forward slashes.
///
/// `.` segments, empty segments and trailing slashes are dropped, so
/// `./docs//guide/` and `docs/guide` produce the same key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct NormalizedPath {
    inner: String,
}

impl NormalizedPath {
    /// Create a new NormalizedPath from any path-like input.
    pub fn new(path: impl AsRef<Path>) -> Self {
        let raw = path.as_ref().to_string_lossy().replace('\\', "/");
        let leading_slash = raw.starts_with('/');
        let joined = raw
            .split('/')
            .filter(|seg| !seg.is_empty() && *seg != ".")
            .collect::<Vec<_>>()
            .join("/");
        let inner = if leading_slash {
            format!("/{joined}")
        } else {
            joined
        };
        Self { inner }
    }

    pub fn as_str(&self) -> &str {
        &self.inner
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Convert to a platform-native PathBuf for I/O operations.
    pub fn to_native(&self) -> PathBuf {
        self.inner.split('/').collect()
    }

    /// Join this path with a segment, normalizing the result.
    pub fn join(&self, segment: impl AsRef<Path>) -> Self {
        let segment = Self::new(segment);
        match (self.is_empty(), segment.is_empty()) {
            (true, _) => segment,
            (false, true) => self.clone(),
            (false, false) => Self {
                inner: format!("{}/{}", self.inner, segment.inner),
            },
        }
    }

    /// Get the file name component.
    pub fn file_name(&self) -> Option<&str> {
        self.inner.rsplit('/').next().filter(|name| !name.is_empty())
    }

    /// Get the extension if present. Dotfiles such as `.gitignore` have none.
    pub fn extension(&self) -> Option<&str> {
        self.file_name().and_then(|name| {
            let idx = name.rfind('.')?;
            if idx == 0 { None } else { Some(&name[idx + 1..]) }
        })
    }
}

impl AsRef<Path> for NormalizedPath {
    fn as_ref(&self) -> &Path {
        Path::new(&self.inner)
    }
}

impl std::fmt::Display for NormalizedPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

impl From<&str> for NormalizedPath {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for NormalizedPath {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&Path> for NormalizedPath {
    fn from(p: &Path) -> Self {
        Self::new(p)
    }
}

impl From<PathBuf> for NormalizedPath {
    fn from(p: PathBuf) -> Self {
        Self::new(p)
    }
}
