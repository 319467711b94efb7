//! Section replacement and rendering.
//!
//! Replacement works on the scanned destination body. Plain lines and
//! destination-only blocks are copied through untouched; blocks whose id the
//! source provides get the source content between the destination's own
//! marker lines.

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::error::Result;
use crate::parser::{Chunk, MarkerKind, Section, marker_line, scan, section_map};
use crate::syntax::CommentStyle;

/// Section id used when a whole file body is wrapped.
pub const SYNCED_SECTION_ID: &str = "synced";

/// Wrap `content` in a single locked block named `id`.
///
/// A trailing newline on `content` ends up after the closing marker.
pub fn wrap_section(content: &str, id: &str, style: &CommentStyle) -> String {
    let (inner, trailing) = match content.strip_suffix('\n') {
        Some(inner) => (inner, "\n"),
        None => (content, ""),
    };
    let open = marker_line(style, MarkerKind::Locked, id);
    let close = marker_line(style, MarkerKind::Editable, id);
    if inner.is_empty() {
        format!("{open}\n{close}{trailing}")
    } else {
        format!("{open}\n{inner}\n{close}{trailing}")
    }
}

fn render_section(section: &Section, style: &CommentStyle) -> Vec<String> {
    let mut lines = Vec::new();
    for (idx, part) in section.parts.iter().enumerate() {
        if idx > 0 {
            lines.extend(section.parts[idx - 1].gap_after.iter().cloned());
        }
        lines.push(marker_line(style, MarkerKind::Locked, &section.id));
        lines.extend(part.lines.iter().cloned());
        lines.push(marker_line(style, MarkerKind::Editable, &section.id));
    }
    lines
}

/// Render a fresh body holding only the sections not listed in `skip`.
pub fn build_sections(sections: &[Section], style: &CommentStyle, skip: &[String]) -> String {
    let lines: Vec<String> = sections
        .iter()
        .filter(|s| !skip.contains(&s.id))
        .flat_map(|s| render_section(s, style))
        .collect();
    if lines.is_empty() {
        String::new()
    } else {
        format!("{}\n", lines.join("\n"))
    }
}

/// Replace destination sections with source content.
///
/// * Ids in `skip` are never touched.
/// * Destination-only ids are kept, or dropped when `remove_missing` is set.
/// * Source ids the destination lacks are inserted after the nearest
///   preceding source section the destination has, else before the nearest
///   following one, else where the first dropped block was, else at the end.
/// * When the source has more parts than the destination, the extra parts
///   follow the destination's last part; surplus destination parts are
///   dropped.
///
/// # Errors
/// Returns a structural error if the destination markers are malformed.
pub fn replace_sections(
    dest_body: &str,
    source: &[Section],
    style: &CommentStyle,
    skip: &[String],
    remove_missing: bool,
) -> Result<String> {
    let chunks = scan(dest_body, style)?;
    let skip: HashSet<&str> = skip.iter().map(String::as_str).collect();
    let src: HashMap<&str, &Section> = source.iter().map(|s| (s.id.as_str(), s)).collect();

    let mut dest_last_part: HashMap<&str, usize> = HashMap::new();
    for chunk in &chunks {
        if let Chunk::Block { id, part, .. } = chunk {
            dest_last_part.insert(id.as_str(), *part);
        }
    }

    let is_removed =
        |id: &str| remove_missing && !skip.contains(id) && !src.contains_key(id);
    let any_removed = dest_last_part.keys().any(|id| is_removed(id));

    let mut after: HashMap<&str, Vec<&Section>> = HashMap::new();
    let mut before: HashMap<&str, Vec<&Section>> = HashMap::new();
    let mut at_removed: Vec<&Section> = Vec::new();
    let mut at_end: Vec<&Section> = Vec::new();

    for (pos, section) in source.iter().enumerate() {
        let id = section.id.as_str();
        if skip.contains(id) || dest_last_part.contains_key(id) {
            continue;
        }
        let in_dest = |s: &&Section| dest_last_part.contains_key(s.id.as_str());
        let prev = source[..pos].iter().rev().find(in_dest);
        let next = source[pos + 1..].iter().find(in_dest);
        match (prev, next) {
            (Some(p), _) => after.entry(p.id.as_str()).or_default().push(section),
            (None, Some(n)) => before.entry(n.id.as_str()).or_default().push(section),
            (None, None) if any_removed => at_removed.push(section),
            (None, None) => at_end.push(section),
        }
    }

    let mut out: Vec<String> = Vec::new();
    let mut removed_slot_used = false;

    for chunk in &chunks {
        let (id, part, open, body, close) = match chunk {
            Chunk::Line(line) => {
                out.push(line.to_string());
                continue;
            }
            Chunk::Block {
                id,
                part,
                open,
                body,
                close,
                ..
            } => (id.as_str(), *part, *open, body, *close),
        };

        if part == 0
            && let Some(list) = before.get(id)
        {
            for section in list {
                out.extend(render_section(section, style));
            }
        }

        let is_last = dest_last_part.get(id).copied() == Some(part);

        if skip.contains(id) {
            out.push(open.to_string());
            out.extend(body.iter().map(|l| l.to_string()));
            out.push(close.to_string());
        } else if let Some(section) = src.get(id) {
            if let Some(src_part) = section.parts.get(part) {
                out.push(open.to_string());
                out.extend(src_part.lines.iter().cloned());
                out.push(close.to_string());
            }
            if is_last {
                for idx in (part + 1)..section.parts.len() {
                    out.extend(section.parts[idx - 1].gap_after.iter().cloned());
                    out.push(marker_line(style, MarkerKind::Locked, id));
                    out.extend(section.parts[idx].lines.iter().cloned());
                    out.push(marker_line(style, MarkerKind::Editable, id));
                }
            }
        } else if is_removed(id) {
            if !removed_slot_used {
                removed_slot_used = true;
                for section in &at_removed {
                    out.extend(render_section(section, style));
                }
            }
        } else {
            out.push(open.to_string());
            out.extend(body.iter().map(|l| l.to_string()));
            out.push(close.to_string());
        }

        if is_last && let Some(list) = after.get(id) {
            for section in list {
                out.extend(render_section(section, style));
            }
        }
    }

    if !at_end.is_empty() {
        let rendered: Vec<String> = at_end
            .iter()
            .flat_map(|s| render_section(s, style))
            .collect();
        // Keep a trailing newline at the very end of the file.
        let tail = if out.last().is_some_and(|l| l.is_empty()) {
            out.pop()
        } else {
            None
        };
        out.extend(rendered);
        out.extend(tail);
    }

    Ok(out.join("\n"))
}

/// Ids of sections whose content differs between two bodies, including
/// sections present in only one of them. Ids in `skip` are ignored.
pub fn changed_sections(
    baseline: &str,
    current: &str,
    style: &CommentStyle,
    skip: &[String],
) -> Result<Vec<String>> {
    let before = section_map(baseline, style)?;
    let after = section_map(current, style)?;
    let ids: BTreeSet<&String> = before.keys().chain(after.keys()).collect();
    Ok(ids
        .into_iter()
        .filter(|id| !skip.contains(*id) && before.get(*id) != after.get(*id))
        .cloned()
        .collect())
}
