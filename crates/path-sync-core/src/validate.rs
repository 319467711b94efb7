//! Guard against hand edits to synced files on feature branches

use std::collections::BTreeMap;
use std::fmt;

use path_sync_blocks::{CommentTable, changed_sections, has_marker, has_sections, strip};
use path_sync_fs::{FileBody, NormalizedPath, read_body};
use path_sync_git::Vcs;

use crate::config::split_csv;
use crate::{Error, Result};

/// Section ids allowed to change, keyed by destination path.
pub type SkipSections = BTreeMap<String, Vec<String>>;

/// Parse `path:section_id,path:section_id`. The split is on the last `:`.
pub fn parse_skip_sections(value: &str) -> Result<SkipSections> {
    let mut skip = SkipSections::new();
    for entry in split_csv(value) {
        let parsed = entry
            .rsplit_once(':')
            .map(|(path, id)| (path.trim(), id.trim()))
            .filter(|(path, id)| !path.is_empty() && !id.is_empty());
        let Some((path, id)) = parsed else {
            return Err(Error::InvalidSkipSection { entry: entry.clone() });
        };
        skip.entry(path.to_string()).or_default().push(id.to_string());
    }
    Ok(skip)
}

/// A managed file edited outside the sections it may change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub path: NormalizedPath,
    /// Offending section, `None` for files without sections
    pub section: Option<String>,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.section {
            Some(id) => write!(f, "{}: section '{id}' was modified", self.path),
            None => write!(f, "{}: synced file was modified", self.path),
        }
    }
}

/// Compare every changed managed file against `base_ref`.
pub fn validate_no_unauthorized_changes(
    vcs: &dyn Vcs,
    base_ref: &str,
    skip: &SkipSections,
    comments: &CommentTable,
) -> Result<Vec<Violation>> {
    let mut violations = Vec::new();
    for rel in vcs.changed_paths(base_ref)? {
        let path = vcs.root().join(&rel);
        if !path.is_file() {
            continue;
        }
        let FileBody::Text(current) = read_body(&path)? else {
            continue;
        };
        if !has_marker(&current) {
            continue;
        }
        let key = NormalizedPath::new(&rel);
        let baseline = vcs.file_at_ref(&rel, base_ref)?.unwrap_or_default();
        let (baseline, current) = (strip(&baseline), strip(&current));

        let sectioned = comments
            .style_for(&path)
            .filter(|style| has_sections(&current, style) || has_sections(&baseline, style));
        match sectioned {
            Some(style) => {
                let allowed = skip.get(key.as_str()).map(Vec::as_slice).unwrap_or(&[]);
                let changed = changed_sections(&baseline, &current, &style, allowed)
                    .map_err(|source| Error::Section {
                        path: path.clone(),
                        source,
                    })?;
                violations.extend(changed.into_iter().map(|id| Violation {
                    path: key.clone(),
                    section: Some(id),
                }));
            }
            None if baseline != current => violations.push(Violation {
                path: key,
                section: None,
            }),
            None => {}
        }
    }
    Ok(violations)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidateOutcome {
    /// Check not applicable on this branch
    Skipped { reason: String },
    Checked { violations: Vec<Violation> },
}

impl ValidateOutcome {
    pub fn is_ok(&self) -> bool {
        match self {
            Self::Skipped { .. } => true,
            Self::Checked { violations } => violations.is_empty(),
        }
    }
}

/// Run the check unless HEAD is a sync branch or the base branch itself.
pub fn validate_no_changes(
    vcs: &dyn Vcs,
    remote: &str,
    base_branch: &str,
    skip: &SkipSections,
) -> Result<ValidateOutcome> {
    let branch = vcs.current_branch()?.unwrap_or_default();
    if branch.starts_with("sync/") {
        return Ok(ValidateOutcome::Skipped {
            reason: format!("on sync branch {branch}"),
        });
    }
    if branch == base_branch {
        return Ok(ValidateOutcome::Skipped {
            reason: format!("on base branch {branch}"),
        });
    }

    let base_ref = format!("{remote}/{base_branch}");
    let violations = validate_no_unauthorized_changes(vcs, &base_ref, skip, &CommentTable::new())?;
    for violation in &violations {
        tracing::error!(path = %violation.path, "{violation}");
    }
    Ok(ValidateOutcome::Checked { violations })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[test]
    fn parses_entries_on_last_colon() {
        let skip = parse_skip_sections("justfile:coverage, c:/x/file.sh:lint ,justfile:ci").unwrap();
        assert_eq!(
            skip,
            SkipSections::from([
                ("c:/x/file.sh".to_string(), vec!["lint".to_string()]),
                (
                    "justfile".to_string(),
                    vec!["coverage".to_string(), "ci".to_string()]
                ),
            ])
        );
    }

    #[test]
    fn empty_value_means_nothing_skipped() {
        assert!(parse_skip_sections("").unwrap().is_empty());
    }

    #[rstest]
    #[case("justfile")]
    #[case("justfile:")]
    #[case(":coverage")]
    fn rejects_malformed_entries(#[case] value: &str) {
        let err = parse_skip_sections(value).unwrap_err();
        assert_eq!(
            err.to_string(),
            format!("Invalid format '{value}', expected path:section_id")
        );
    }

    #[test]
    fn violation_messages() {
        let v = Violation {
            path: NormalizedPath::new("justfile"),
            section: Some("lint".into()),
        };
        assert_eq!(v.to_string(), "justfile: section 'lint' was modified");
    }
}
