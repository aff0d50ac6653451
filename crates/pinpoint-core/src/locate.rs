use thiserror::Error;

use crate::position::DiskRange;
use crate::scan;

/// How much of the requested text is echoed back in error messages.
const PREVIEW_CHARS: usize = 50;

#[derive(Debug, Error)]
pub enum LocateError {
    #[error("text not found: `{preview}`")]
    TextNotFound { preview: String },
    #[error(
        "text is ambiguous: appears {count} times: `{preview}`; \
         include more surrounding context to make it unique"
    )]
    TextAmbiguous { count: usize, preview: String },
    /// Upstream read failure, passed through unmodified.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Locate `literal` as a unique substring of already-read file content.
///
/// Occurrence counting uses the same advance-by-one-character scan as the
/// resolver, applied to the whole content rather than a single line.
pub fn locate_in_content(content: &str, literal: &str) -> Result<DiskRange, LocateError> {
    let starts = scan::occurrence_starts(content, literal);
    match starts.as_slice() {
        [] => Err(LocateError::TextNotFound {
            preview: preview(literal),
        }),
        [start] => {
            let start_pos = scan::offset_to_position(content, *start);
            let end_pos = scan::offset_to_position(content, *start + literal.len());
            Ok(DiskRange::new(start_pos, end_pos))
        }
        many => Err(LocateError::TextAmbiguous {
            count: many.len(),
            preview: preview(literal),
        }),
    }
}

fn preview(text: &str) -> String {
    let mut out: String = text.chars().take(PREVIEW_CHARS).collect();
    if text.chars().count() > PREVIEW_CHARS {
        out.push_str("...");
    }
    out
}
