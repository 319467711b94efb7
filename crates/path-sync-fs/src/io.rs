//! Atomic I/O operations with file locking

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use fs2::FileExt;

use crate::{Error, Result};

/// File content as observed on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileBody {
    /// Valid UTF-8 text
    Text(String),
    /// Anything that does not decode as UTF-8
    Binary(Vec<u8>),
}

impl FileBody {
    /// Raw bytes regardless of the decoding outcome.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Self::Text(text) => text.as_bytes(),
            Self::Binary(bytes) => bytes,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Binary(_) => None,
        }
    }
}

/// Write content atomically to a file with locking.
///
/// The content goes to a sibling temp file that is then renamed over `path`,
/// so a destination file is never observed half-written. Missing parent
/// directories are created. The temp file is removed when any step fails.
pub fn write_atomic(path: impl AsRef<Path>, content: &[u8]) -> Result<()> {
    let target = path.as_ref();
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
    }

    let temp = sibling_temp_path(target);
    let written = fill_temp(&temp, target, content)
        .and_then(|()| fs::rename(&temp, target).map_err(|e| Error::io(target, e)));
    if written.is_err() {
        let _ = fs::remove_file(&temp);
    }
    written
}

/// `dir/.name.<pid>.tmp` next to `target`
fn sibling_temp_path(target: &Path) -> PathBuf {
    let name = target
        .file_name()
        .map(|n| n.to_string_lossy())
        .unwrap_or_default();
    target.with_file_name(format!(".{name}.{}.tmp", std::process::id()))
}

fn fill_temp(temp: &Path, target: &Path, content: &[u8]) -> Result<()> {
    let lock_failed = |_| Error::LockFailed {
        path: target.to_path_buf(),
    };
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(temp)
        .map_err(|e| Error::io(temp, e))?;
    file.lock_exclusive().map_err(lock_failed)?;
    file.write_all(content).map_err(|e| Error::io(temp, e))?;
    file.sync_all().map_err(|e| Error::io(temp, e))?;
    file.unlock().map_err(lock_failed)
}

/// Read a file as UTF-8 text.
pub fn read_text(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    fs::read_to_string(path).map_err(|e| Error::io(path, e))
}

/// Read a file, classifying it as text or binary.
pub fn read_body(path: impl AsRef<Path>) -> Result<FileBody> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|e| Error::io(path, e))?;
    Ok(match String::from_utf8(bytes) {
        Ok(text) => FileBody::Text(text),
        Err(e) => FileBody::Binary(e.into_bytes()),
    })
}

/// Write text content to a file atomically.
pub fn write_text(path: impl AsRef<Path>, content: &str) -> Result<()> {
    write_atomic(path, content.as_bytes())
}

/// Remove a file. A file that is already gone is not an error.
pub fn remove_file(path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(Error::io(path, e)),
    }
}
