//! Section marker scanning.
//!
//! A file body is split on `\n` and scanned line by line. Marker lines are
//! recognised in the comment style of the file:
//!
//! ```text
//! # === DO_NOT_EDIT: path-sync <id> ===   opens a locked block
//! # === OK_EDIT: path-sync <id> ===       closes it
//! ```
//!
//! At most one block is open at a time. Opening a block inside another, or
//! closing with a different id, is a structural error, as is reaching the end
//! of the body with a block still open. A closing marker with nothing open
//! only marks an editable stretch and is kept as plain text.

use std::collections::{BTreeMap, HashMap};

use regex::Regex;

use crate::error::{Error, Result};
use crate::header::TOOL_NAME;
use crate::syntax::CommentStyle;

/// One contiguous locked block of a section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionPart {
    /// Lines strictly between the two markers.
    pub lines: Vec<String>,
    /// 1-based line of the opening marker.
    pub start_line: usize,
    /// 1-based line of the closing marker.
    pub end_line: usize,
    /// Destination-owned lines between this part and the next part of the
    /// same section. Empty for the last part.
    pub gap_after: Vec<String>,
}

impl SectionPart {
    pub fn content(&self) -> String {
        self.lines.join("\n")
    }
}

/// A named section, possibly split into several parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub id: String,
    pub parts: Vec<SectionPart>,
}

impl Section {
    /// Content of all parts joined by newlines, gaps excluded.
    pub fn content(&self) -> String {
        self.parts
            .iter()
            .map(SectionPart::content)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum MarkerKind {
    Locked,
    Editable,
}

/// Scanned body: plain lines and complete blocks, in file order.
#[derive(Debug)]
pub(crate) enum Chunk<'a> {
    Line(&'a str),
    Block {
        id: String,
        part: usize,
        open: &'a str,
        body: Vec<&'a str>,
        close: &'a str,
        start_line: usize,
        end_line: usize,
    },
}

pub(crate) struct MarkerMatcher {
    regex: Regex,
}

impl MarkerMatcher {
    pub(crate) fn new(style: &CommentStyle) -> Result<Self> {
        let suffix = match style.suffix() {
            "" => String::new(),
            s => format!(r"\s*{}", regex::escape(s)),
        };
        let pattern = format!(
            r"^\s*{}\s*=== (DO_NOT_EDIT|OK_EDIT): {} ([\w.\-]+) ==={}\s*$",
            regex::escape(style.prefix()),
            regex::escape(TOOL_NAME),
            suffix
        );
        Ok(Self {
            regex: Regex::new(&pattern)?,
        })
    }

    pub(crate) fn classify<'l>(&self, line: &'l str) -> Option<(MarkerKind, &'l str)> {
        let caps = self.regex.captures(line)?;
        let kind = match caps.get(1)?.as_str() {
            "DO_NOT_EDIT" => MarkerKind::Locked,
            _ => MarkerKind::Editable,
        };
        Some((kind, caps.get(2)?.as_str()))
    }
}

pub(crate) fn marker_line(style: &CommentStyle, kind: MarkerKind, id: &str) -> String {
    let keyword = match kind {
        MarkerKind::Locked => "DO_NOT_EDIT",
        MarkerKind::Editable => "OK_EDIT",
    };
    style.line(&format!("=== {keyword}: {TOOL_NAME} {id} ==="))
}

struct OpenBlock<'a> {
    id: String,
    open: &'a str,
    body: Vec<&'a str>,
    start_line: usize,
}

pub(crate) fn scan<'a>(body: &'a str, style: &CommentStyle) -> Result<Vec<Chunk<'a>>> {
    let matcher = MarkerMatcher::new(style)?;
    let mut chunks = Vec::new();
    let mut open: Option<OpenBlock<'a>> = None;
    let mut part_counts: HashMap<String, usize> = HashMap::new();

    for (idx, line) in body.split('\n').enumerate() {
        let line_no = idx + 1;
        match (matcher.classify(line), open.take()) {
            (Some((MarkerKind::Locked, id)), Some(outer)) => {
                return Err(Error::NestedSection {
                    outer: outer.id,
                    inner: id.to_string(),
                    line: line_no,
                });
            }
            (Some((MarkerKind::Locked, id)), None) => {
                open = Some(OpenBlock {
                    id: id.to_string(),
                    open: line,
                    body: Vec::new(),
                    start_line: line_no,
                });
            }
            (Some((MarkerKind::Editable, id)), Some(block)) => {
                if block.id != id {
                    return Err(Error::MismatchedSection {
                        expected: block.id,
                        found: id.to_string(),
                        line: line_no,
                    });
                }
                let count = part_counts.entry(block.id.clone()).or_insert(0);
                chunks.push(Chunk::Block {
                    id: block.id,
                    part: *count,
                    open: block.open,
                    body: block.body,
                    close: line,
                    start_line: block.start_line,
                    end_line: line_no,
                });
                *count += 1;
            }
            (Some((MarkerKind::Editable, _)), None) => chunks.push(Chunk::Line(line)),
            (None, Some(mut block)) => {
                block.body.push(line);
                open = Some(block);
            }
            (None, None) => chunks.push(Chunk::Line(line)),
        }
    }

    if let Some(block) = open {
        return Err(Error::UnclosedSection {
            id: block.id,
            line: block.start_line,
        });
    }

    Ok(chunks)
}

/// Whether `body` contains at least one locked section marker.
///
/// Malformed bodies still report `true` so callers go on to parse them and
/// surface the structural error.
pub fn has_sections(body: &str, style: &CommentStyle) -> bool {
    let Ok(matcher) = MarkerMatcher::new(style) else {
        return false;
    };
    body.split('\n')
        .any(|line| matches!(matcher.classify(line), Some((MarkerKind::Locked, _))))
}

/// Parse all sections, ordered by first appearance.
pub fn parse_sections(body: &str, style: &CommentStyle) -> Result<Vec<Section>> {
    let chunks = scan(body, style)?;
    Ok(sections_from_chunks(&chunks))
}

pub(crate) fn sections_from_chunks(chunks: &[Chunk<'_>]) -> Vec<Section> {
    let mut sections: Vec<Section> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    // Plain lines seen since the last closed block.
    let mut pending_gap: Vec<&str> = Vec::new();
    let mut last_id: Option<&str> = None;

    for chunk in chunks {
        match chunk {
            Chunk::Line(line) => pending_gap.push(*line),
            Chunk::Block {
                id,
                body,
                start_line,
                end_line,
                ..
            } => {
                let part = SectionPart {
                    lines: body.iter().map(|l| l.to_string()).collect(),
                    start_line: *start_line,
                    end_line: *end_line,
                    gap_after: Vec::new(),
                };
                match index.get(id) {
                    Some(&pos) => {
                        if last_id == Some(id.as_str())
                            && let Some(prev) = sections[pos].parts.last_mut()
                        {
                            prev.gap_after = pending_gap.iter().map(|l| l.to_string()).collect();
                        }
                        sections[pos].parts.push(part);
                    }
                    None => {
                        index.insert(id.clone(), sections.len());
                        sections.push(Section {
                            id: id.clone(),
                            parts: vec![part],
                        });
                    }
                }
                pending_gap.clear();
                last_id = Some(id.as_str());
            }
        }
    }

    sections
}

/// Section id to joined content.
pub fn section_map(body: &str, style: &CommentStyle) -> Result<BTreeMap<String, String>> {
    Ok(parse_sections(body, style)?
        .into_iter()
        .map(|s| {
            let content = s.content();
            (s.id, content)
        })
        .collect())
}
