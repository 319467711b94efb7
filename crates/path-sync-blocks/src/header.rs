//! Ownership header stamping and detection.
//!
//! The header is a single comment line on the first line of a file, or the
//! second when the first is a shebang:
//!
//! ```text
//! #!/usr/bin/env bash
//! # path-sync copy -n my-config
//! ```

use std::path::Path;
use std::sync::LazyLock;

use path_sync_fs::{FileBody, read_body};
use regex::Regex;

use crate::Result;
use crate::syntax::CommentStyle;

/// Tool identity embedded in every marker.
pub const TOOL_NAME: &str = "path-sync";

static MARKER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*\S+ path-sync copy -n ([\w.\-]+)(?: \S+)?\s*$")
        .expect("Invalid header marker regex")
});

fn marker_text(config_name: &str) -> String {
    format!("{TOOL_NAME} copy -n {config_name}")
}

fn is_shebang(line: &str) -> bool {
    line.starts_with("#!")
}

/// Index of the marker line within `lines`, if any.
fn marker_index(lines: &[&str]) -> Option<usize> {
    let candidates = match lines.first() {
        Some(first) if is_shebang(first) => 1..2,
        _ => 0..1,
    };
    candidates
        .into_iter()
        .find(|&idx| lines.get(idx).is_some_and(|l| MARKER_REGEX.is_match(l)))
}

/// Prepend an ownership header for `config_name`.
///
/// A leading shebang line stays on line one.
pub fn stamp(body: &str, style: &CommentStyle, config_name: &str) -> String {
    let header = style.line(&marker_text(config_name));
    match body.split_once('\n') {
        Some((first, rest)) if is_shebang(first) => format!("{first}\n{header}\n{rest}"),
        None if is_shebang(body) => format!("{body}\n{header}\n"),
        _ => format!("{header}\n{body}"),
    }
}

/// Whether `body` carries an ownership header for any configuration.
pub fn has_marker(body: &str) -> bool {
    config_name(body).is_some()
}

/// The configuration identity named by the header, if present.
pub fn config_name(body: &str) -> Option<String> {
    let lines: Vec<&str> = body.lines().take(2).collect();
    let idx = marker_index(&lines)?;
    MARKER_REGEX
        .captures(lines[idx])
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Remove one header line. Bare content is returned unchanged.
pub fn strip(body: &str) -> String {
    let mut parts: Vec<&str> = body.split_inclusive('\n').collect();
    let trimmed: Vec<&str> = parts
        .iter()
        .take(2)
        .map(|p| p.trim_end_matches(['\n', '\r']))
        .collect();
    match marker_index(&trimmed) {
        Some(idx) => {
            parts.remove(idx);
            parts.concat()
        }
        None => body.to_string(),
    }
}

/// Read `path` and return the configuration named in its header.
///
/// Binary files never carry a header.
pub fn file_config_name(path: &Path) -> Result<Option<String>> {
    Ok(match read_body(path)? {
        FileBody::Text(text) => config_name(&text),
        FileBody::Binary(_) => None,
    })
}
