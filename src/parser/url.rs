//! Bare URL detection.

use std::ops::Range;

use once_cell::sync::Lazy;
use regex::Regex;

/// Characters allowed after `scheme://`: unreserved, reserved and `%`.
const URL_BODY: &str = r"[A-Za-z0-9.\-_~:/?#\[\]@!$&'()*+,;=%]+";

static URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!("https?://{URL_BODY}")).unwrap());

static WHOLE_URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!("^https?://{URL_BODY}$")).unwrap());

/// `true` when the whole (trimmed) string is an http(s) URL.
pub fn is_url(s: &str) -> bool {
    WHOLE_URL_RE.is_match(s.trim())
}

/// Every non-overlapping URL occurrence in `line`, left to right. Matches are
/// greedy, so a URL written inside `(...)` includes the closing paren; see
/// [`trim_unbalanced_closers`].
pub fn find_all_url_occurrences(line: &str) -> Vec<Range<usize>> {
    URL_RE.find_iter(line).map(|m| m.range()).collect()
}

/// Drop trailing `)` / `]` characters that have no opener inside the URL.
///
/// `https://a.com)` becomes `https://a.com`, while
/// `https://en.wikipedia.org/wiki/Rust_(language)` is returned unchanged.
pub fn trim_unbalanced_closers(url: &str) -> &str {
    let mut trimmed = url;
    loop {
        let unbalanced = match trimmed.as_bytes().last() {
            Some(b')') => count(trimmed, b')') > count(trimmed, b'('),
            Some(b']') => count(trimmed, b']') > count(trimmed, b'['),
            _ => false,
        };
        if !unbalanced {
            return trimmed;
        }
        trimmed = &trimmed[..trimmed.len() - 1];
    }
}

fn count(s: &str, byte: u8) -> usize {
    s.bytes().filter(|b| *b == byte).count()
}
