//! Locating the Markdown link construct that encloses a cursor column.
//!
//! Columns are byte offsets into the line. Only ASCII delimiters are ever
//! used as span boundaries, so every span lands on a char boundary.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LinkSpanKind {
    /// `[text](target)`, bracket through closing paren.
    Inline,
    /// A `[` at or before the cursor through the end of the line; the caller
    /// decides whether it holds `[text][ref]`.
    Reference,
}

/// A slice of a line that belongs to one link construct, `[start_col, end_col)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkSpan {
    pub start_col: usize,
    pub end_col: usize,
    pub raw_text: String,
    pub kind: LinkSpanKind,
}

impl LinkSpan {
    fn new(line: &str, start_col: usize, end_col: usize, kind: LinkSpanKind) -> LinkSpan {
        LinkSpan {
            start_col,
            end_col,
            raw_text: line[start_col..end_col].to_string(),
            kind,
        }
    }

    pub fn contains(&self, col: usize) -> bool {
        self.start_col <= col && col < self.end_col
    }

    pub fn overlaps(&self, range: &std::ops::Range<usize>) -> bool {
        self.start_col < range.end && range.start < self.end_col
    }
}

/// Return the link span enclosing `cursor_col`, if any.
///
/// Inline links win. When no inline link contains the cursor the nearest `[`
/// at or before the cursor is taken as a possible reference link; for
/// `[text][ref]` with the cursor in `[ref]` the span starts at the `[` that
/// opens `text`.
pub fn locate_link_span(line: &str, cursor_col: usize) -> Option<LinkSpan> {
    if let Some(span) = inline_link_spans(line)
        .into_iter()
        .find(|span| span.contains(cursor_col))
    {
        return Some(span);
    }

    reference_candidate(line, cursor_col)
}

/// Every inline link on the line, left to right.
///
/// Brackets nest, so `[see [x]](url)` is a single link and the inner `[x]`
/// never starts a link of its own. The destination ends at the first `)`;
/// parentheses inside a destination are not supported.
pub fn inline_link_spans(line: &str) -> Vec<LinkSpan> {
    let bytes = line.as_bytes();
    let mut spans = vec![];
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'[' {
            i += 1;
            continue;
        }

        match inline_link_end(bytes, i) {
            Some(end) => {
                spans.push(LinkSpan::new(line, i, end, LinkSpanKind::Inline));
                i = end;
            }
            // not a link: brackets inside it may still open one
            None => i += 1,
        }
    }

    spans
}

/// Split the raw text of an inline span into `(text, target)`.
pub fn split_inline(raw: &str) -> Option<(&str, &str)> {
    let bytes = raw.as_bytes();
    if bytes.first() != Some(&b'[') {
        return None;
    }

    let close = matching_close(bytes, 0)?;
    if bytes.get(close + 1) != Some(&b'(') {
        return None;
    }
    let paren_end = find_byte(bytes, close + 2, b')')?;

    Some((&raw[1..close], &raw[close + 2..paren_end]))
}

/// Exclusive end of the inline link opened by the `[` at `open`.
fn inline_link_end(bytes: &[u8], open: usize) -> Option<usize> {
    let close = matching_close(bytes, open)?;
    if bytes.get(close + 1) != Some(&b'(') {
        return None;
    }
    let paren_end = find_byte(bytes, close + 2, b')')?;
    Some(paren_end + 1)
}

fn reference_candidate(line: &str, cursor_col: usize) -> Option<LinkSpan> {
    let bytes = line.as_bytes();
    let search_end = cursor_col.saturating_add(1).min(bytes.len());
    let scanned = &bytes[..search_end];

    let mut unclosed = vec![];
    for (idx, byte) in scanned.iter().enumerate() {
        match byte {
            b'[' => unclosed.push(idx),
            b']' => {
                unclosed.pop();
            }
            _ => {}
        }
    }

    // outermost bracket still open at the cursor that closes later on the line
    let open = match unclosed
        .into_iter()
        .find(|open| matching_close(bytes, *open).is_some())
    {
        Some(open) => open,
        None if scanned.last() == Some(&b']') => matching_open(bytes, search_end - 1)?,
        None => return None,
    };

    let start = match open.checked_sub(1) {
        Some(prev) if bytes[prev] == b']' => matching_open(bytes, prev).unwrap_or(open),
        _ => open,
    };

    Some(LinkSpan::new(line, start, line.len(), LinkSpanKind::Reference))
}

/// Position of the `]` balancing the `[` at `open`.
pub(super) fn matching_close(bytes: &[u8], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (offset, byte) in bytes[open..].iter().enumerate() {
        match byte {
            b'[' => depth += 1,
            b']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + offset);
                }
            }
            _ => {}
        }
    }
    None
}

/// Position of the `[` balancing the `]` at `close`.
fn matching_open(bytes: &[u8], close: usize) -> Option<usize> {
    let mut depth = 0usize;
    for idx in (0..=close).rev() {
        match bytes[idx] {
            b']' => depth += 1,
            b'[' => {
                depth -= 1;
                if depth == 0 {
                    return Some(idx);
                }
            }
            _ => {}
        }
    }
    None
}

pub(super) fn find_byte(bytes: &[u8], from: usize, needle: u8) -> Option<usize> {
    bytes
        .get(from..)?
        .iter()
        .position(|b| *b == needle)
        .map(|offset| from + offset)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inline_span_covers_bracket_through_paren() {
        let line = "See [docs](guide.md) now";

        let span = locate_link_span(line, 6).unwrap();

        assert_eq!(span.kind, LinkSpanKind::Inline);
        assert_eq!((span.start_col, span.end_col), (4, 20));
        assert_eq!(span.raw_text, "[docs](guide.md)");
        assert_eq!(span.raw_text, &line[span.start_col..span.end_col]);
    }

    #[test]
    fn test_inline_span_includes_closing_paren_column() {
        let line = "[a](b)";

        assert_eq!(locate_link_span(line, 5).unwrap().kind, LinkSpanKind::Inline);
        assert_eq!(locate_link_span(line, 0).unwrap().kind, LinkSpanKind::Inline);
    }

    #[test]
    fn test_second_link_selected_by_cursor() {
        let line = "[one](1.md) and [two](2.md)";

        let first = locate_link_span(line, 2).unwrap();
        let second = locate_link_span(line, 20).unwrap();

        assert_eq!(first.raw_text, "[one](1.md)");
        assert_eq!(second.raw_text, "[two](2.md)");
    }

    #[test]
    fn test_nested_brackets_in_text_do_not_start_a_link() {
        let line = "[see [x]](target.md)";

        let spans = inline_link_spans(line);

        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].raw_text, line);
        assert_eq!(split_inline(&spans[0].raw_text), Some(("see [x]", "target.md")));
    }

    #[test]
    fn test_link_inside_plain_brackets_is_found() {
        let line = "[note: [b](c.md)]";

        let spans = inline_link_spans(line);

        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].raw_text, "[b](c.md)");
    }

    #[test]
    fn test_target_ends_at_first_paren() {
        let line = "[w](https://x.org/a_(b))";

        let spans = inline_link_spans(line);

        assert_eq!(spans[0].raw_text, "[w](https://x.org/a_(b)");
    }

    #[test]
    fn test_unterminated_constructs_are_not_inline() {
        assert!(inline_link_spans("[a](b").is_empty());
        assert!(inline_link_spans("[a (b)").is_empty());
        assert!(inline_link_spans("a] (b)").is_empty());
    }

    #[test]
    fn test_reference_candidate_from_text_part() {
        let line = "Read [the guide][guide] today";

        let span = locate_link_span(line, 8).unwrap();

        assert_eq!(span.kind, LinkSpanKind::Reference);
        assert_eq!(span.start_col, 5);
        assert_eq!(span.raw_text, "[the guide][guide] today");
    }

    #[test]
    fn test_reference_candidate_walks_back_from_label() {
        let line = "Read [the guide][guide] today";

        let span = locate_link_span(line, 19).unwrap();

        assert_eq!(span.kind, LinkSpanKind::Reference);
        assert_eq!(span.start_col, 5);
    }

    #[test]
    fn test_reference_candidate_skips_inner_brackets() {
        let line = "x [see [x]][ref] tail";

        for col in [3, 8, 10, 13] {
            let span = locate_link_span(line, col).unwrap();
            assert_eq!(span.start_col, 2, "column {col}");
        }
    }

    #[test]
    fn test_reference_candidate_ignores_stray_open_bracket() {
        let line = "a [ b [x][ref]";

        assert_eq!(locate_link_span(line, 7).unwrap().start_col, 6);
    }

    #[test]
    fn test_no_bracket_before_cursor() {
        assert_eq!(locate_link_span("plain text [later](x)", 3), None);
        assert_eq!(locate_link_span("", 0), None);
    }

    #[test]
    fn test_cursor_past_end_of_line() {
        let line = "[a][b]";

        let span = locate_link_span(line, 40).unwrap();

        assert_eq!(span.start_col, 0);
    }

    #[test]
    fn test_multibyte_text_keeps_spans_on_char_boundaries() {
        let line = "Ünïcödé [lïnk](ziel.md) ✓";

        let spans = inline_link_spans(line);

        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].raw_text, "[lïnk](ziel.md)");
        assert_eq!(split_inline(&spans[0].raw_text), Some(("lïnk", "ziel.md")));
    }
}
