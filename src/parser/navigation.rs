//! Jumping between links in a buffer.

use itertools::Itertools;

use super::reference::{parse_reference_link, resolve_reference};
use super::span::inline_link_spans;
use super::url::find_all_url_occurrences;
use super::CursorPosition;

/// Columns where a link starts on `line`: inline links, reference links and
/// standalone URLs. Shortcut references (`[label]`) only count when the
/// document defines the label.
pub fn link_starts<S: AsRef<str>>(line: &str, document: &[S]) -> Vec<usize> {
    let inline = inline_link_spans(line);
    let mut covered: Vec<std::ops::Range<usize>> = inline
        .iter()
        .map(|span| span.start_col..span.end_col)
        .collect();
    let mut starts: Vec<usize> = inline.iter().map(|span| span.start_col).collect();

    let mut i = 0;
    while let Some(offset) = line[i..].find('[') {
        let open = i + offset;
        if covered.iter().any(|range| range.contains(&open)) {
            i = open + 1;
            continue;
        }

        match parse_reference_link(&line[open..]) {
            Some(link)
                if !link.shortcut || resolve_reference(link.label, document).is_some() =>
            {
                starts.push(open);
                covered.push(open..open + link.len);
                i = open + link.len;
            }
            _ => i = open + 1,
        }
    }

    starts.extend(
        find_all_url_occurrences(line)
            .into_iter()
            .filter(|url| {
                !covered
                    .iter()
                    .any(|range| range.start < url.end && url.start < range.end)
            })
            .map(|url| url.start),
    );

    starts.into_iter().sorted().dedup().collect()
}

fn all_link_starts<S: AsRef<str>>(document: &[S]) -> Vec<CursorPosition> {
    document
        .iter()
        .enumerate()
        .flat_map(|(row, line)| {
            link_starts(line.as_ref(), document)
                .into_iter()
                .map(move |col| CursorPosition { row, col })
        })
        .collect()
}

/// Start of the first link after the cursor, wrapping to the top.
pub fn find_next_link<S: AsRef<str>>(
    document: &[S],
    cursor: CursorPosition,
) -> Option<CursorPosition> {
    let starts = all_link_starts(document);
    starts
        .iter()
        .find(|start| **start > cursor)
        .or_else(|| starts.first())
        .copied()
}

/// Start of the last link before the cursor, wrapping to the bottom.
pub fn find_previous_link<S: AsRef<str>>(
    document: &[S],
    cursor: CursorPosition,
) -> Option<CursorPosition> {
    let starts = all_link_starts(document);
    starts
        .iter()
        .rev()
        .find(|start| **start < cursor)
        .or_else(|| starts.last())
        .copied()
}
