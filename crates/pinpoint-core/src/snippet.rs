use serde::{Deserialize, Serialize};

/// Context lines surrounding a resolved position, for display in tool output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snippet {
    /// 0-based line number of the first line in `text`.
    pub start_line: u32,
    /// 0-based line number of the last line in `text` (inclusive).
    pub end_line: u32,
    pub text: String,
    pub truncated: bool,
}

pub fn context_snippet(
    content: &str,
    center_line: u32,
    context_lines: usize,
    max_chars: usize,
) -> Snippet {
    let lines: Vec<&str> = content.lines().collect();
    if lines.is_empty() {
        return Snippet {
            start_line: 0,
            end_line: 0,
            text: String::new(),
            truncated: false,
        };
    }

    let center = (center_line as usize).min(lines.len() - 1);
    let start = center.saturating_sub(context_lines);
    let end = (center + context_lines).min(lines.len() - 1);

    let mut text = lines[start..=end].join("\n");
    let mut truncated = false;
    if text.chars().count() > max_chars {
        text = text.chars().take(max_chars).collect();
        truncated = true;
    }

    Snippet {
        start_line: start as u32,
        end_line: end as u32,
        text,
        truncated,
    }
}
