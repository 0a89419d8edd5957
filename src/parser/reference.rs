//! Reference-style links: `[text][label]`, `[text][]`, `[label]` and the
//! `[label]: target` definitions they point at.

use once_cell::sync::Lazy;
use regex::Regex;

use super::span::{find_byte, matching_close};

/// A reference link parsed from the start of a candidate span.
#[derive(Debug, PartialEq, Eq)]
pub struct ReferenceLink<'a> {
    pub text: &'a str,
    /// Label to look up; the text itself for `[text][]` and `[text]`.
    pub label: &'a str,
    /// Length of the construct in bytes, from the opening `[` through the last `]`.
    pub len: usize,
    /// Written as `[label]` with no second bracket pair
    pub shortcut: bool,
}

/// Parse a reference link at the start of `raw`.
///
/// Brackets in the text part nest, so `[see [x]][ref]` has the text
/// `see [x]`. The label part never contains brackets.
pub fn parse_reference_link(raw: &str) -> Option<ReferenceLink<'_>> {
    let bytes = raw.as_bytes();
    if bytes.first() != Some(&b'[') {
        return None;
    }

    let close = matching_close(bytes, 0)?;
    let text = &raw[1..close];

    match bytes.get(close + 1) {
        Some(b'[') => {
            let label_close = find_byte(bytes, close + 2, b']')?;
            let label = &raw[close + 2..label_close];
            if label.contains('[') {
                return None;
            }

            Some(ReferenceLink {
                text,
                label: if label.trim().is_empty() { text } else { label },
                len: label_close + 1,
                shortcut: false,
            })
        }
        // inline link or definition
        Some(b'(') | Some(b':') => None,
        _ if text.is_empty() => None,
        _ => Some(ReferenceLink {
            text,
            label: text,
            len: close + 1,
            shortcut: true,
        }),
    }
}

/// Split a definition line `[label]: target` into its parts.
pub fn parse_definition(line: &str) -> Option<(&str, &str)> {
    static DEFINITION_RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"^\s*\[(?<label>[^\]]*)\]:\s*(?<target>.+)$").unwrap());

    let captures = DEFINITION_RE.captures(line)?;
    match (captures.name("label"), captures.name("target")) {
        (Some(label), Some(target)) => Some((label.as_str(), target.as_str().trim())),
        _ => None,
    }
}

/// Find the target of the first definition of `label` in the document.
///
/// Labels compare exactly (case-sensitive) after trimming. When a label is
/// defined more than once the first definition wins.
pub fn resolve_reference<S: AsRef<str>>(label: &str, lines: &[S]) -> Option<String> {
    let label = label.trim();
    if label.is_empty() {
        return None;
    }

    lines.iter().find_map(|line| match parse_definition(line.as_ref()) {
        Some((defined, target)) if defined.trim() == label => Some(target.to_string()),
        _ => None,
    })
}
