//! Recursive file enumeration

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::{Error, Result};

/// List every regular file below `root`, pruning directories named in
/// `skip_dirs`. Entries are sorted by file name at each level so results are
/// stable across runs.
pub fn walk_files(root: impl AsRef<Path>, skip_dirs: &[&str]) -> Result<Vec<PathBuf>> {
    let root = root.as_ref();
    let mut files = Vec::new();

    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0
                || !entry.file_type().is_dir()
                || !skip_dirs
                    .iter()
                    .any(|skip| entry.file_name().to_str() == Some(*skip))
        });

    for entry in walker {
        let entry = entry.map_err(|e| Error::Walk {
            path: root.to_path_buf(),
            message: e.to_string(),
        })?;
        if entry.file_type().is_file() {
            files.push(entry.into_path());
        }
    }

    Ok(files)
}

/// Resolve a path to its canonical absolute form without UNC prefixes.
pub fn canonical_root(path: impl AsRef<Path>) -> Result<PathBuf> {
    let path = path.as_ref();
    dunce::canonicalize(path).map_err(|e| Error::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn skips_named_directories() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join(".git/objects")).unwrap();
        fs::create_dir_all(temp.path().join("src")).unwrap();
        fs::write(temp.path().join(".git/objects/x"), "obj").unwrap();
        fs::write(temp.path().join("src/main.rs"), "fn main() {}").unwrap();
        fs::write(temp.path().join("README.md"), "# hi").unwrap();

        let files = walk_files(temp.path(), &[".git"]).unwrap();
        let rel: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(temp.path()).unwrap().to_path_buf())
            .collect();

        assert_eq!(
            rel,
            vec![PathBuf::from("README.md"), PathBuf::from("src/main.rs")]
        );
    }
}
