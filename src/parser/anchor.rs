//! Internal anchors: heading slugs and attribute-list custom ids.

use once_cell::sync::Lazy;
use regex::Regex;

/// ASCII punctuation removed when slugging; `-` is kept.
const SLUG_PUNCTUATION: &str = "\"#$%&'()*+,./:;<=>?@[\\]^_`{|}~!";

/// Something an internal link can land on.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum AnchorCandidate<'a> {
    Heading {
        /// 0-indexed line
        line: usize,
        level: usize,
        /// Heading text without a trailing attribute list
        text: &'a str,
    },
    /// `{: #id ...}`
    CustomId { line: usize, id: &'a str },
}

impl AnchorCandidate<'_> {
    pub fn line(&self) -> usize {
        match self {
            AnchorCandidate::Heading { line, .. } | AnchorCandidate::CustomId { line, .. } => *line,
        }
    }

    /// Headings compare by slug, custom ids literally.
    pub fn matches(&self, target: &str) -> bool {
        match self {
            AnchorCandidate::Heading { text, .. } => title_to_anchor(text) == title_to_anchor(target),
            AnchorCandidate::CustomId { id, .. } => *id == target,
        }
    }
}

/// GitHub-style heading slug: drop ASCII punctuation except `-`, lower-case,
/// and turn each whitespace run into one `-`.
///
/// ```ignore
/// assert_eq!(title_to_anchor("Hello, World!"), "hello-world");
/// ```
pub fn title_to_anchor(title: &str) -> String {
    static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

    let stripped: String = title
        .trim()
        .chars()
        .filter(|c| !SLUG_PUNCTUATION.contains(*c))
        .collect();

    WHITESPACE_RE
        .replace_all(&stripped.to_lowercase(), "-")
        .into_owned()
}

/// Headings and custom ids in document order. Lines inside fenced code
/// blocks are skipped. A heading carrying an attribute list yields the
/// heading first, then its id.
pub fn anchor_candidates<S: AsRef<str>>(lines: &[S]) -> Vec<AnchorCandidate<'_>> {
    static HEADING_RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"^(?<starter>#+)\s*(?<heading_text>.+)$").unwrap());
    static CUSTOM_ID_RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"\{:\s*#(?<id>[\w\-_]+)[^}]*\}").unwrap());
    static TRAILING_ATTRS_RE: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"\s*\{[^}]*\}\s*$").unwrap());

    let mut candidates = vec![];
    let mut fence: Option<&str> = None;

    for (line_number, line) in lines.iter().enumerate() {
        let line = line.as_ref();

        if let Some(marker) = fence_marker(line) {
            match fence {
                None => fence = Some(marker),
                Some(open) if open == marker => fence = None,
                Some(_) => {}
            }
            continue;
        }
        if fence.is_some() {
            continue;
        }

        if let Some(captures) = HEADING_RE.captures(line) {
            if let (Some(starter), Some(text)) =
                (captures.name("starter"), captures.name("heading_text"))
            {
                let text = match TRAILING_ATTRS_RE.find(text.as_str()) {
                    Some(attrs) => &text.as_str()[..attrs.start()],
                    None => text.as_str(),
                };
                candidates.push(AnchorCandidate::Heading {
                    line: line_number,
                    level: starter.as_str().len(),
                    text: text.trim_end(),
                });
            }
        }

        if let Some(id) = CUSTOM_ID_RE.captures(line).and_then(|c| c.name("id")) {
            candidates.push(AnchorCandidate::CustomId {
                line: line_number,
                id: id.as_str(),
            });
        }
    }

    candidates
}

/// 0-indexed line of the first heading or custom id matching `target`
/// (a leading `#` is ignored).
pub fn find_anchor_line<S: AsRef<str>>(target: &str, lines: &[S]) -> Option<usize> {
    let target = target.strip_prefix('#').unwrap_or(target);
    if target.trim().is_empty() {
        return None;
    }

    anchor_candidates(lines)
        .into_iter()
        .find(|candidate| candidate.matches(target))
        .map(|candidate| candidate.line())
}

fn fence_marker(line: &str) -> Option<&'static str> {
    let trimmed = line.trim_start();
    if trimmed.starts_with("```") {
        Some("```")
    } else if trimmed.starts_with("~~~") {
        Some("~~~")
    } else {
        None
    }
}
