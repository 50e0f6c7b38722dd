//! Marker extraction - finds `#-- ... --#` annotation spans in narrative text.

use std::collections::BTreeSet;

/// Opening delimiter of an annotation span.
pub const START_TOKEN: &str = "#--";

/// Closing delimiter of an annotation span.
pub const END_TOKEN: &str = "--#";

/// A delimited span located in a text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkerSpan<'a> {
    /// Byte offset of the start token.
    pub start: usize,
    /// Byte offset just past the end token.
    pub end: usize,
    /// Inner content with surrounding whitespace trimmed.
    pub content: &'a str,
}

/// Scan `text` for non-overlapping spans, left to right.
///
/// Each span closes at the first end token after its start token, so content
/// may cross lines but never contains an end token.
pub fn scan_spans(text: &str) -> Vec<MarkerSpan<'_>> {
    let mut spans = Vec::new();
    let mut cursor = 0;

    while let Some(offset) = text[cursor..].find(START_TOKEN) {
        let start = cursor + offset;
        let inner_start = start + START_TOKEN.len();
        let Some(inner_len) = text[inner_start..].find(END_TOKEN) else {
            break;
        };
        let inner_end = inner_start + inner_len;
        let end = inner_end + END_TOKEN.len();

        spans.push(MarkerSpan {
            start,
            end,
            content: text[inner_start..inner_end].trim(),
        });
        cursor = end;
    }

    spans
}

/// Return the annotations in `text` that are not yet in `seen`, in order of
/// appearance, adding each of them to `seen`.
///
/// Empty spans are skipped. A span repeated within the same text is returned
/// once.
pub fn extract_new(text: &str, seen: &mut BTreeSet<String>) -> Vec<String> {
    scan_spans(text)
        .into_iter()
        .filter(|span| !span.content.is_empty())
        .filter_map(|span| {
            if seen.insert(span.content.to_string()) {
                Some(span.content.to_string())
            } else {
                None
            }
        })
        .collect()
}

fn replace_spans(text: &str, replacement: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut cursor = 0;
    for span in scan_spans(text) {
        result.push_str(&text[cursor..span.start]);
        result.push_str(replacement);
        cursor = span.end;
    }
    result.push_str(&text[cursor..]);
    result
}

/// Remove every span, content included, from `text`.
///
/// Unmatched delimiter tokens are dropped as well, so the result never
/// contains either token. Surrounding whitespace is left alone.
pub fn strip(text: &str) -> String {
    let mut current = replace_spans(text, "");
    while current.contains(START_TOKEN) || current.contains(END_TOKEN) {
        current = replace_spans(&current, "")
            .replace(START_TOKEN, "")
            .replace(END_TOKEN, "");
    }
    current
}

/// Replace each span with a space, collapse whitespace runs and trim.
pub fn clean_context(text: &str) -> String {
    replace_spans(text, " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
