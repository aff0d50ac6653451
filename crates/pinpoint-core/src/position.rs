use serde::{Deserialize, Serialize};

/// An exact, disk-accurate coordinate. Both fields are 0-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ExactPosition {
    pub line: u32,
    /// UTF-16 code unit offset within the line.
    pub character: u32,
}

/// A caller-supplied, approximate reference to a code location.
///
/// Line numbers drift as files change and the same token may repeat, so none
/// of these fields are trusted to be exact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FuzzyPosition {
    pub symbol_name: String,
    /// 1-based line number, as humans and LLMs report them.
    pub line_hint: u32,
    /// Which occurrence on the matched line is meant (0 = first).
    #[serde(default)]
    pub order_hint: u32,
}

/// A contiguous span of on-disk text, `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiskRange {
    pub start: ExactPosition,
    pub end: ExactPosition,
}

impl DiskRange {
    pub fn new(start: ExactPosition, end: ExactPosition) -> Self {
        debug_assert!(start <= end, "range start must not follow its end");
        Self { start, end }
    }
}
