//! Low-level text scanning shared by the resolver and the locator.

use crate::position::ExactPosition;

/// Split `content` into lines, treating `\r\n` and `\n` as equivalent
/// separators so line indices do not depend on the file's line-ending style.
pub(crate) fn split_lines(content: &str) -> Vec<&str> {
    content
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect()
}

/// Byte offsets of every occurrence of `needle` in `haystack`.
///
/// After each hit the scan resumes one character past the match *start*, not
/// past its end, so occurrences may overlap: `"aa"` in `"aaa"` yields offsets
/// 0 and 1. Existing callers count on this, so it stays even though a
/// non-overlapping scan would look more natural.
pub(crate) fn occurrence_starts(haystack: &str, needle: &str) -> Vec<usize> {
    let mut starts = Vec::new();
    if needle.is_empty() {
        return starts;
    }

    let mut from = 0usize;
    while let Some(found) = haystack[from..].find(needle) {
        let at = from + found;
        starts.push(at);
        let step = haystack[at..].chars().next().map_or(1, char::len_utf8);
        from = at + step;
    }
    starts
}

/// Byte offset of the `n`-th (0-based) occurrence under the overlap-permitting
/// scan rule, or `None` if the line has fewer than `n + 1` occurrences.
pub(crate) fn nth_occurrence(haystack: &str, needle: &str, n: u32) -> Option<usize> {
    occurrence_starts(haystack, needle)
        .into_iter()
        .nth(n as usize)
}

pub(crate) fn utf16_len(text: &str) -> u32 {
    text.chars().map(|c| c.len_utf16() as u32).sum()
}

/// Convert a byte offset into a 0-based line/character position by walking
/// the content from its beginning.
///
/// `\r` is counted like any other character here, so CRLF files report
/// end-of-line columns that include the carriage return. Line splitting in
/// the resolver is CRLF-tolerant while this walk is not; edit anchors were
/// built against exactly this asymmetry, so it is kept rather than fixed.
pub(crate) fn offset_to_position(content: &str, offset: usize) -> ExactPosition {
    let mut line = 0u32;
    let mut character = 0u32;
    for (idx, ch) in content.char_indices() {
        if idx >= offset {
            break;
        }
        if ch == '\n' {
            line += 1;
            character = 0;
        } else {
            character += ch.len_utf16() as u32;
        }
    }
    ExactPosition { line, character }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_lines_handles_lf_and_crlf_identically() {
        assert_eq!(split_lines("a\nb\nc"), vec!["a", "b", "c"]);
        assert_eq!(split_lines("a\r\nb\r\nc"), vec!["a", "b", "c"]);
        assert_eq!(split_lines("a\nb\r\nc"), vec!["a", "b", "c"]);
    }

    #[test]
    fn split_lines_keeps_trailing_empty_line() {
        assert_eq!(split_lines("a\n"), vec!["a", ""]);
        assert_eq!(split_lines(""), vec![""]);
    }

    #[test]
    fn overlapping_occurrences_are_counted() {
        // Documented quirk: the scan advances by one character, not by the
        // match length.
        assert_eq!(occurrence_starts("aaa", "aa"), vec![0, 1]);
        assert_eq!(occurrence_starts("foo foo foo", "foo"), vec![0, 4, 8]);
    }

    #[test]
    fn empty_needle_never_matches() {
        assert!(occurrence_starts("abc", "").is_empty());
    }

    #[test]
    fn nth_occurrence_selects_by_index() {
        let line = "sum(x, x, x);";
        assert_eq!(nth_occurrence(line, "x", 0), Some(4));
        assert_eq!(nth_occurrence(line, "x", 1), Some(7));
        assert_eq!(nth_occurrence(line, "x", 2), Some(10));
        assert_eq!(nth_occurrence(line, "x", 3), None);
    }

    #[test]
    fn occurrence_scan_survives_multibyte_match_starts() {
        // The one-character advance must not land inside a UTF-8 sequence.
        let starts = occurrence_starts("😀😀😀", "😀😀");
        assert_eq!(starts.len(), 2);
    }

    #[test]
    fn offset_walk_tracks_lines_and_utf16_columns() {
        let content = "ab\nc😀d\ne";
        // Offset of 'd': "ab\nc" is 4 bytes, the emoji is 4 bytes.
        let pos = offset_to_position(content, 8);
        assert_eq!(
            pos,
            ExactPosition {
                line: 1,
                character: 3
            }
        );
    }

    #[test]
    fn offset_walk_counts_carriage_returns() {
        // Known asymmetry with split_lines: '\r' occupies a column here.
        let content = "ab\r\ncd";
        let pos = offset_to_position(content, 3);
        assert_eq!(
            pos,
            ExactPosition {
                line: 0,
                character: 2
            }
        );
        let pos = offset_to_position(content, 5);
        assert_eq!(
            pos,
            ExactPosition {
                line: 1,
                character: 1
            }
        );
    }
}
