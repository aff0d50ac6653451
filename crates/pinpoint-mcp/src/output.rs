use serde_json::{Value, json};

pub(crate) const DEFAULT_MAX_TOTAL_CHARS: usize = 60_000;
pub(crate) const MIN_MAX_TOTAL_CHARS: usize = 2_000;
pub(crate) const ABS_MAX_TOTAL_CHARS: usize = 2_000_000;

/// How much of a long input echo survives the truncation fallback.
const INPUT_ECHO_CHARS: usize = 200;

pub(crate) fn effective_max_total_chars(
    config: &pinpoint_core::config::PinpointConfig,
    requested: Option<usize>,
) -> (usize, Option<Value>) {
    let output = config.mcp.as_ref().and_then(|m| m.output.as_ref());

    let hard = output
        .and_then(|o| o.max_total_chars_hard)
        .unwrap_or(ABS_MAX_TOTAL_CHARS)
        .clamp(MIN_MAX_TOTAL_CHARS, ABS_MAX_TOTAL_CHARS);

    let default_value = output
        .and_then(|o| o.max_total_chars_default)
        .unwrap_or(DEFAULT_MAX_TOTAL_CHARS)
        .clamp(MIN_MAX_TOTAL_CHARS, hard);

    let effective = requested
        .unwrap_or(default_value)
        .clamp(MIN_MAX_TOTAL_CHARS, hard);

    let warning = requested.and_then(|req| {
        if req == effective {
            None
        } else {
            Some(json!({
                "kind": "max_total_chars_clamped",
                "message": "Requested max_total_chars was clamped by policy.",
                "requested": req,
                "effective": effective,
                "hard": hard,
                "min": MIN_MAX_TOTAL_CHARS
            }))
        }
    });

    (effective, warning)
}

/// Shrink `payload` until its serialized form fits within `max_total_chars`.
///
/// Staged: drop the snippet first, then shorten the echoed input text, and as
/// a last resort keep only metadata and warnings.
pub(crate) fn enforce_global_output_caps(max_total_chars: usize, payload: &mut Value) {
    crate::structured::ensure_common_fields(payload);

    if json_len(payload) <= max_total_chars {
        return;
    }

    let mut warnings = payload
        .get("warnings")
        .and_then(|v| v.as_array())
        .cloned()
        .unwrap_or_default();

    let mut changed = false;

    if payload
        .as_object_mut()
        .and_then(|obj| obj.remove("snippet"))
        .is_some()
    {
        warnings.push(json!({
            "kind": "global_cap_dropped_snippet",
            "message": "Dropped snippet to satisfy max_total_chars.",
            "max_total_chars": max_total_chars
        }));
        changed = true;
    }

    if json_len(payload) > max_total_chars
        && let Some(text) = payload
            .get_mut("input")
            .and_then(|v| v.get_mut("text"))
        && let Some(s) = text.as_str().map(str::to_string)
        && s.chars().count() > INPUT_ECHO_CHARS
    {
        let mut shortened: String = s.chars().take(INPUT_ECHO_CHARS).collect();
        shortened.push_str("...");
        *text = Value::String(shortened);
        warnings.push(json!({
            "kind": "global_cap_shortened_input",
            "message": "Shortened the echoed input text to satisfy max_total_chars.",
            "max_total_chars": max_total_chars
        }));
        changed = true;
    }

    if json_len(payload) > max_total_chars {
        if let Some(obj) = payload.as_object_mut() {
            obj.remove("input");
            obj.remove("position");
            obj.remove("position_1based");
            obj.remove("range");
            obj.remove("range_1based");
        }
        warnings.push(json!({
            "kind": "global_cap_cleared_results",
            "message": "Cleared results to satisfy max_total_chars.",
            "max_total_chars": max_total_chars
        }));
        changed = true;
    }

    if changed && let Some(obj) = payload.as_object_mut() {
        obj.insert("warnings".to_string(), Value::Array(warnings));
        obj.insert("truncated".to_string(), Value::Bool(true));
    }
}

fn json_len(value: &Value) -> usize {
    serde_json::to_string(value)
        .map(|s| s.len())
        .unwrap_or(usize::MAX)
}
