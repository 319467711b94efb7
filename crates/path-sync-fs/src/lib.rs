//! Filesystem primitives for path-sync
//!
//! Provides slash-normalized destination keys, atomic writes and the tree
//! walk used by orphan detection.

pub mod error;
pub mod io;
pub mod path;
pub mod walk;

pub use error::{Error, Result};
pub use io::{FileBody, read_body, read_text, remove_file, write_atomic, write_text};
pub use path::NormalizedPath;
pub use walk::{canonical_root, walk_files};
