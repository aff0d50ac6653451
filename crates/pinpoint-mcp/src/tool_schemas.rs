use std::borrow::Cow;
use std::sync::Arc;

use rmcp::model::{JsonObject, Tool};
use serde_json::json;

pub(crate) fn tool_resolve_symbol_position() -> Tool {
    Tool::new(
        Cow::Borrowed("resolve_symbol_position"),
        Cow::Borrowed(
            "Resolve a fuzzy anchor (symbol text + approximate 1-based line + occurrence index) \
             to an exact 0-based position on disk. Searches the hinted line first, then expands \
             outward within the configured radius.",
        ),
        Arc::new(schema(json!({
            "type": "object",
            "properties": {
                "file_path": { "type": "string" },
                "symbol_name": { "type": "string", "minLength": 1 },
                "line_hint": { "type": "integer", "minimum": 1 },
                "symbol_index": { "type": "integer", "minimum": 0, "default": 0 },
                "include_snippet": { "type": "boolean", "default": true },
                "snippet_context_lines": { "type": "integer", "minimum": 0, "default": 1, "maximum": 10 },
                "max_snippet_chars": { "type": "integer", "minimum": 40, "default": 400, "maximum": 4000 },
                "max_total_chars": { "type": "integer", "minimum": 2000, "default": 60000 }
            },
            "required": ["file_path", "symbol_name", "line_hint"],
            "additionalProperties": false
        }))),
    )
}

pub(crate) fn tool_locate_text_span() -> Tool {
    Tool::new(
        Cow::Borrowed("locate_text_span"),
        Cow::Borrowed(
            "Locate a literal text snippet that occurs exactly once in a file and return its \
             exact start/end span. Fails if the text is missing or appears more than once; \
             include more surrounding context to disambiguate.",
        ),
        Arc::new(schema(json!({
            "type": "object",
            "properties": {
                "file_path": { "type": "string" },
                "text": { "type": "string", "minLength": 1 },
                "max_total_chars": { "type": "integer", "minimum": 2000, "default": 60000 }
            },
            "required": ["file_path", "text"],
            "additionalProperties": false
        }))),
    )
}

pub(crate) fn tool_get_current_config() -> Tool {
    Tool::new(
        Cow::Borrowed("get_current_config"),
        Cow::Borrowed(
            "Show the effective pinpoint configuration: workspace root, allowed roots, \
             line search radius, output caps, and exposed tools.",
        ),
        Arc::new(schema(json!({
            "type": "object",
            "properties": {},
            "additionalProperties": false
        }))),
    )
}

fn schema(value: serde_json::Value) -> JsonObject {
    value
        .as_object()
        .cloned()
        .unwrap_or_default()
}
