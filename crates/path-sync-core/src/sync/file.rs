//! Per-file write strategies

use std::path::{Path, PathBuf};

use path_sync_blocks::{
    CommentStyle, CommentTable, SYNCED_SECTION_ID, build_sections, has_marker, has_sections,
    parse_sections, replace_sections, stamp, strip, wrap_section,
};
use path_sync_fs::{FileBody, read_body, write_atomic};

use crate::config::SyncMode;
use crate::log::SyncLog;
use crate::resolver::ResolvedFile;
use crate::{Error, Result};

/// Shared settings for every file of one destination.
#[derive(Debug, Clone, Copy)]
pub struct FileContext<'a> {
    /// Identity written into ownership headers
    pub config_name: &'a str,
    pub comments: &'a CommentTable,
    pub dry_run: bool,
    /// Write files whose header was removed
    pub force_overwrite: bool,
}

/// What happened to one destination file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOutcome {
    /// Written, or would be written in a dry run
    Written,
    Unchanged,
    /// Present without an ownership header
    OptedOut,
    /// No comment syntax registered for the destination file type
    Unsupported,
}

impl FileOutcome {
    pub fn is_write(self) -> bool {
        self == Self::Written
    }
}

/// How to treat one resolved file.
#[derive(Debug, Clone, Copy)]
pub struct FilePlan<'a> {
    pub mode: SyncMode,
    /// Wrap section-less content in a `synced` section
    pub wrap: bool,
    /// Section ids the destination keeps for itself
    pub skip_sections: &'a [String],
}

/// Apply one resolved file to the destination tree.
pub fn sync_file(
    ctx: &FileContext<'_>,
    file: &ResolvedFile,
    dest_root: &Path,
    plan: FilePlan<'_>,
    log: &mut SyncLog,
) -> Result<FileOutcome> {
    let target = Target {
        path: file.dest_path(dest_root),
        key: file.dest_key.as_str(),
    };
    let source = match read_body(&file.source)? {
        FileBody::Text(text) => strip(&text),
        FileBody::Binary(bytes) => return sync_binary(ctx, &target, &bytes, plan.mode, log),
    };

    match plan.mode {
        SyncMode::Scaffold if target.path.exists() => Ok(FileOutcome::Unchanged),
        SyncMode::Scaffold => write(ctx, &target, source.as_bytes(), log),
        SyncMode::Replace => {
            if target.path.exists() && read_body(&target.path)?.as_bytes() == source.as_bytes() {
                Ok(FileOutcome::Unchanged)
            } else {
                write(ctx, &target, source.as_bytes(), log)
            }
        }
        SyncMode::Sync => sync_managed(ctx, &target, &file.source, &source, plan, log),
    }
}

struct Target<'a> {
    path: PathBuf,
    key: &'a str,
}

impl Target<'_> {
    /// Current text, `None` when the file is absent. A binary file reads as
    /// empty text, which carries no header.
    fn existing(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }
        Ok(Some(match read_body(&self.path)? {
            FileBody::Text(text) => text,
            FileBody::Binary(_) => String::new(),
        }))
    }
}

fn sync_managed(
    ctx: &FileContext<'_>,
    target: &Target<'_>,
    source_path: &Path,
    source: &str,
    plan: FilePlan<'_>,
    log: &mut SyncLog,
) -> Result<FileOutcome> {
    let Some(style) = ctx.comments.style_for(&target.path) else {
        log.warn(format!(
            "No comment syntax for {}, cannot sync sections/headers",
            target.key
        ));
        return Ok(FileOutcome::Unsupported);
    };

    if has_sections(source, &style) {
        return sync_sections(ctx, target, source_path, source, &style, plan, log);
    }
    if plan.wrap {
        let wrapped = wrap_section(source, SYNCED_SECTION_ID, &style);
        return sync_sections(ctx, target, source_path, &wrapped, &style, plan, log);
    }

    if let Some(existing) = target.existing()? {
        let managed = has_marker(&existing);
        if !managed && !ctx.force_overwrite {
            log.info(format!("Skipping {} (header removed - opted out)", target.key));
            return Ok(FileOutcome::OptedOut);
        }
        if managed && strip(&existing) == source {
            return Ok(FileOutcome::Unchanged);
        }
    }

    let content = stamp(source, &style, ctx.config_name);
    write(ctx, target, content.as_bytes(), log)
}

fn sync_sections(
    ctx: &FileContext<'_>,
    target: &Target<'_>,
    source_path: &Path,
    source: &str,
    style: &CommentStyle,
    plan: FilePlan<'_>,
    log: &mut SyncLog,
) -> Result<FileOutcome> {
    let sections = parse_sections(source, style).map_err(|source| Error::Section {
        path: source_path.to_path_buf(),
        source,
    })?;
    let existing = target.existing()?;

    let body = match &existing {
        Some(existing) => {
            if !has_marker(existing) && !ctx.force_overwrite {
                log.info(format!("Skipping {} (header removed - opted out)", target.key));
                return Ok(FileOutcome::OptedOut);
            }
            replace_sections(&strip(existing), &sections, style, plan.skip_sections, true)
                .map_err(|source| Error::Section {
                    path: target.path.clone(),
                    source,
                })?
        }
        None if plan.skip_sections.is_empty() => source.to_string(),
        None => {
            let omitted: Vec<&str> = sections
                .iter()
                .map(|s| s.id.as_str())
                .filter(|id| plan.skip_sections.iter().any(|skip| skip == id))
                .collect();
            if !omitted.is_empty() {
                log.info(format!(
                    "{}: new file created without skipped sections: {}",
                    target.key,
                    omitted.join(", ")
                ));
            }
            build_sections(&sections, style, plan.skip_sections)
        }
    };

    let content = stamp(&body, style, ctx.config_name);
    if existing.as_deref() == Some(content.as_str()) {
        return Ok(FileOutcome::Unchanged);
    }
    write(ctx, target, content.as_bytes(), log)
}

fn sync_binary(
    ctx: &FileContext<'_>,
    target: &Target<'_>,
    bytes: &[u8],
    mode: SyncMode,
    log: &mut SyncLog,
) -> Result<FileOutcome> {
    if target.path.exists() {
        let unchanged = match mode {
            SyncMode::Scaffold => true,
            SyncMode::Replace | SyncMode::Sync => read_body(&target.path)?.as_bytes() == bytes,
        };
        if unchanged {
            return Ok(FileOutcome::Unchanged);
        }
    }
    write(ctx, target, bytes, log)
}

fn write(
    ctx: &FileContext<'_>,
    target: &Target<'_>,
    content: &[u8],
    log: &mut SyncLog,
) -> Result<FileOutcome> {
    if ctx.dry_run {
        log.info(format!("[DRY RUN] Would write: {}", target.key));
    } else {
        write_atomic(&target.path, content)?;
        log.info(format!("Wrote: {}", target.key));
    }
    Ok(FileOutcome::Written)
}
