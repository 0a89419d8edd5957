//! Finding the link under the cursor.
//!
//! Given a document snapshot (its lines) and a cursor, [`resolve_at_cursor`]
//! returns the destination of the link the cursor is on, unwrapped from its
//! Markdown syntax. Strategies are tried in a fixed order and the first hit
//! wins:
//!
//! | # | Strategy | Example |
//! |---|----------|---------|
//! | 1 | Markdown link at cursor | `[text](target)`, `[text][ref]`, `[text][]`, `[ref]` |
//! | 2 | Standalone URL at cursor | `see https://example.com` |
//! | 3 | Reference definition line | `[ref]: target` |
//! | 4 | Bare file path token | `docs/guide.md:12` |
//!
//! Everything in this module is pure: no I/O, no shared state. Columns are
//! byte offsets into the line.

pub mod anchor;
pub mod navigation;
pub mod reference;
pub mod span;
pub mod url;


use serde::{Deserialize, Serialize};
use tracing::debug;

use self::reference::{parse_definition, parse_reference_link, resolve_reference};
use self::span::{inline_link_spans, locate_link_span, split_inline, LinkSpanKind};
use self::url::{find_all_url_occurrences, trim_unbalanced_closers};

/// 0-indexed cursor; `col` is a byte offset into the line at `row`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CursorPosition {
    pub row: usize,
    pub col: usize,
}

impl CursorPosition {
    pub fn new(row: usize, col: usize) -> CursorPosition {
        CursorPosition { row, col }
    }
}

/// Which strategy produced a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Strategy {
    InlineLink,
    ReferenceLink,
    StandaloneUrl,
    ReferenceDefinition,
    BarePath,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Resolved {
    /// Destination, trimmed but otherwise as written
    pub target: String,
    pub strategy: Strategy,
}

/// Characters that disqualify a whitespace-delimited token as a file path.
const NOT_A_PATH: [char; 8] = ['*', '?', '|', '"', '\'', '<', '>', '!'];

/// The destination of the link under the cursor, or `None` when there is
/// nothing to follow.
pub fn parse_line_at_cursor<S: AsRef<str>>(document: &[S], cursor: CursorPosition) -> Option<String> {
    resolve_at_cursor(document, cursor).map(|resolved| resolved.target)
}

/// Like [`parse_line_at_cursor`], also reporting which strategy matched.
pub fn resolve_at_cursor<S: AsRef<str>>(document: &[S], cursor: CursorPosition) -> Option<Resolved> {
    let line = document.get(cursor.row)?.as_ref();
    let col = cursor.col;

    let resolved = markdown_link_at(document, line, col)
        .or_else(|| standalone_url_at(line, col))
        .or_else(|| definition_on(line))
        .or_else(|| bare_path_at(line, col));

    match &resolved {
        Some(Resolved { target, strategy }) => {
            debug!(row = cursor.row, col, ?strategy, link_target = %target, "resolved link at cursor")
        }
        None => debug!(row = cursor.row, col, "no link at cursor"),
    }

    resolved
}

/// Strategy 1. An unresolved reference is not a hit; later strategies still run.
fn markdown_link_at<S: AsRef<str>>(document: &[S], line: &str, col: usize) -> Option<Resolved> {
    let span = locate_link_span(line, col)?;

    match span.kind {
        LinkSpanKind::Inline => {
            let (_text, target) = split_inline(&span.raw_text)?;
            let target = target.trim();
            (!target.is_empty()).then(|| Resolved {
                target: target.to_string(),
                strategy: Strategy::InlineLink,
            })
        }
        LinkSpanKind::Reference => {
            let link = parse_reference_link(&span.raw_text)?;
            // the candidate runs to the end of the line; the cursor must be on the link itself
            if col >= span.start_col + link.len {
                return None;
            }
            resolve_reference(link.label, document).map(|target| Resolved {
                target,
                strategy: Strategy::ReferenceLink,
            })
        }
    }
}

/// Strategy 2. URLs sitting inside an inline link belong to strategy 1.
fn standalone_url_at(line: &str, col: usize) -> Option<Resolved> {
    let inline = inline_link_spans(line);

    let occurrence = find_all_url_occurrences(line)
        .into_iter()
        .find(|occurrence| occurrence.contains(&col))?;

    if inline.iter().any(|span| span.overlaps(&occurrence)) {
        return None;
    }

    Some(Resolved {
        target: trim_unbalanced_closers(&line[occurrence]).to_string(),
        strategy: Strategy::StandaloneUrl,
    })
}

/// Strategy 3. Anywhere on a definition line resolves to its own target.
fn definition_on(line: &str) -> Option<Resolved> {
    let (_label, target) = parse_definition(line)?;
    (!target.is_empty()).then(|| Resolved {
        target: target.to_string(),
        strategy: Strategy::ReferenceDefinition,
    })
}

/// Strategy 4. The whitespace-delimited token under the cursor.
fn bare_path_at(line: &str, col: usize) -> Option<Resolved> {
    let bytes = line.as_bytes();
    let col = col.min(bytes.len());
    if bytes.get(col).is_some_and(|b| b.is_ascii_whitespace()) {
        return None;
    }

    let start = bytes[..col]
        .iter()
        .rposition(|b| b.is_ascii_whitespace())
        .map_or(0, |idx| idx + 1);
    let end = bytes[col..]
        .iter()
        .position(|b| b.is_ascii_whitespace())
        .map_or(bytes.len(), |idx| col + idx);

    let token = &line[start..end];
    if token.is_empty() || token.contains(NOT_A_PATH) {
        return None;
    }

    Some(Resolved {
        target: token.to_string(),
        strategy: Strategy::BarePath,
    })
}
