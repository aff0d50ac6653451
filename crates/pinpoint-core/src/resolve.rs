use thiserror::Error;

use crate::position::{ExactPosition, FuzzyPosition};
use crate::scan;

/// Construction-time knobs for the line-window resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Lines searched above and below the hinted line when the exact line
    /// does not match.
    pub line_search_radius: u32,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            line_search_radius: 2,
        }
    }
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error(
        "symbol `{symbol_name}` not found within lines {searched_start}-{searched_end} \
         (line hint {line_hint}); adjust the line hint or widen the search radius"
    )]
    NotFoundInWindow {
        symbol_name: String,
        /// The original 1-based hint, echoed back for self-correction.
        line_hint: u32,
        /// 1-based first line of the searched window.
        searched_start: u32,
        /// 1-based last line of the searched window.
        searched_end: u32,
    },
    /// Upstream read failure, passed through unmodified.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Resolve a fuzzy anchor against already-read file content.
///
/// The hinted line is checked first; on a miss the search expands outward one
/// line at a time up to `radius`, checking the line above before the line
/// below at each distance, so a symbol at equal distance on both sides
/// resolves to the line above.
pub fn resolve_in_content(
    content: &str,
    fuzzy: &FuzzyPosition,
    radius: u32,
) -> Result<ExactPosition, ResolveError> {
    let lines = scan::split_lines(content);
    let target = fuzzy.line_hint.saturating_sub(1) as usize;

    if let Some(pos) = match_on_line(&lines, target, fuzzy) {
        return Ok(pos);
    }

    for offset in 1..=radius as usize {
        if let Some(above) = target.checked_sub(offset)
            && let Some(pos) = match_on_line(&lines, above, fuzzy)
        {
            return Ok(pos);
        }
        if let Some(pos) = match_on_line(&lines, target + offset, fuzzy) {
            return Ok(pos);
        }
    }

    let line_count = lines.len() as u32;
    Err(ResolveError::NotFoundInWindow {
        symbol_name: fuzzy.symbol_name.clone(),
        line_hint: fuzzy.line_hint,
        searched_start: fuzzy.line_hint.saturating_sub(radius).max(1),
        searched_end: fuzzy.line_hint.saturating_add(radius).min(line_count),
    })
}

/// Absent and out-of-range lines are uniformly "no match", not errors.
fn match_on_line(lines: &[&str], index: usize, fuzzy: &FuzzyPosition) -> Option<ExactPosition> {
    let line = lines.get(index)?;
    let byte = scan::nth_occurrence(line, &fuzzy.symbol_name, fuzzy.order_hint)?;
    Some(ExactPosition {
        line: index as u32,
        character: scan::utf16_len(&line[..byte]),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fuzzy(symbol: &str, line_hint: u32, order_hint: u32) -> FuzzyPosition {
        FuzzyPosition {
            symbol_name: symbol.to_string(),
            line_hint,
            order_hint,
        }
    }

    #[test]
    fn exact_line_hit_returns_first_occurrence_offset() {
        let content = "function hello() {}\nfunction goodbye() {}";
        let pos = resolve_in_content(content, &fuzzy("goodbye", 2, 0), 2).unwrap();
        assert_eq!(
            pos,
            ExactPosition {
                line: 1,
                character: 9
            }
        );
    }

    #[test]
    fn order_hint_picks_the_kth_occurrence() {
        let content = "sum(x, x, x);";
        for (order, character) in [(0, 4), (1, 7), (2, 10)] {
            let pos = resolve_in_content(content, &fuzzy("x", 1, order), 2).unwrap();
            assert_eq!(pos, ExactPosition { line: 0, character });
        }
    }

    #[test]
    fn missing_occurrence_on_exact_line_falls_back_to_window() {
        // Line 1 has only two `x`; the third lives one line below.
        let content = "sum(x, x);\nlet x = x + x + x;";
        let pos = resolve_in_content(content, &fuzzy("x", 1, 2), 2).unwrap();
        assert_eq!(pos.line, 1);
    }

    #[test]
    fn window_expands_up_to_the_radius() {
        let content = "a\ntarget\nb\nc\nd";
        // target sits on 1-based line 2, the hint says line 5: distance 3.
        let err = resolve_in_content(content, &fuzzy("target", 5, 0), 2).unwrap_err();
        match err {
            ResolveError::NotFoundInWindow {
                searched_start,
                searched_end,
                line_hint,
                ..
            } => {
                assert_eq!(line_hint, 5);
                assert_eq!(searched_start, 3);
                assert_eq!(searched_end, 5);
            }
            other => panic!("unexpected error: {other}"),
        }

        let pos = resolve_in_content(content, &fuzzy("target", 5, 0), 5).unwrap();
        assert_eq!(pos.line, 1);
    }

    #[test]
    fn widening_the_radius_never_loses_a_match() {
        let content = "one\ntwo\nthree\nfour\nfive\nsix";
        let anchor = fuzzy("five", 2, 0);
        let mut first_hit = None;
        for radius in 0..6 {
            let result = resolve_in_content(content, &anchor, radius);
            if let Some(expected) = first_hit {
                assert_eq!(result.unwrap(), expected);
            } else if let Ok(pos) = result {
                first_hit = Some(pos);
            }
        }
        assert!(first_hit.is_some());
    }

    #[test]
    fn equal_distance_prefers_the_line_above() {
        let content = "needle\nmiddle\nneedle";
        let pos = resolve_in_content(content, &fuzzy("needle", 2, 0), 2).unwrap();
        assert_eq!(pos.line, 0);
    }

    #[test]
    fn crlf_content_resolves_at_the_same_coordinates_as_lf() {
        let lf = "fn alpha() {}\nfn beta() {}\n";
        let crlf = "fn alpha() {}\r\nfn beta() {}\r\n";
        let anchor = fuzzy("beta", 2, 0);
        assert_eq!(
            resolve_in_content(lf, &anchor, 2).unwrap(),
            resolve_in_content(crlf, &anchor, 2).unwrap()
        );
    }

    #[test]
    fn column_is_reported_in_utf16_units() {
        let content = "let 😀emoji = 1;";
        let pos = resolve_in_content(content, &fuzzy("emoji", 1, 0), 2).unwrap();
        // "let " is 4 units, the emoji is a surrogate pair (2 units).
        assert_eq!(pos.character, 6);
    }

    #[test]
    fn hint_beyond_the_file_fails_with_clamped_range() {
        let content = "only\ntwo";
        let err = resolve_in_content(content, &fuzzy("absent", 100, 0), 2).unwrap_err();
        match err {
            ResolveError::NotFoundInWindow {
                searched_start,
                searched_end,
                ..
            } => {
                assert_eq!(searched_start, 98);
                assert_eq!(searched_end, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn hint_at_file_start_clamps_the_window_low_end() {
        let content = "absent-free line\nanother";
        let err = resolve_in_content(content, &fuzzy("missing", 1, 0), 2).unwrap_err();
        match err {
            ResolveError::NotFoundInWindow { searched_start, .. } => {
                assert_eq!(searched_start, 1);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn blank_lines_are_skipped_not_fatal() {
        let content = "\n\nfn here() {}\n\n";
        let pos = resolve_in_content(content, &fuzzy("here", 2, 0), 2).unwrap();
        assert_eq!(pos.line, 2);
    }
}
