use std::path::{Path, PathBuf};

use rmcp::ErrorData as McpError;
use rmcp::model::{CallToolRequestParam, CallToolResult, Content};
use serde_json::{Value, json};
use tracing::warn;

use pinpoint_core::{FuzzyPosition, LocateError, ResolveError};

use crate::{
    LocateTextSpanArgs, PinpointMcpServer, ResolveSymbolPositionArgs, canonicalize_within,
    effective_max_total_chars, enforce_global_output_caps, parse_arguments, position_1based,
    position_value, range_1based, range_value, structured_ok,
};

impl PinpointMcpServer {
    pub(crate) async fn resolve_symbol_position(
        &self,
        request: CallToolRequestParam,
    ) -> Result<CallToolResult, McpError> {
        let args: ResolveSymbolPositionArgs = parse_arguments(request.arguments)?;

        if args.symbol_name.is_empty() {
            return Err(McpError::invalid_params("symbol_name must not be empty", None));
        }
        if args.line_hint == 0 {
            return Err(McpError::invalid_params(
                "line_hint is 1-based and must be >= 1",
                None,
            ));
        }

        let (max_total_chars, max_total_chars_warning) =
            effective_max_total_chars(&self.state.config, args.max_total_chars);
        let include_snippet = args.include_snippet.unwrap_or(true);
        let snippet_context_lines = args.snippet_context_lines.unwrap_or(1).min(10);
        let max_snippet_chars = args.max_snippet_chars.unwrap_or(400).clamp(40, 4000);

        let abs_file = canonicalize_within(
            &self.state.workspace_root,
            &self.state.allowed_roots,
            &PathBuf::from(&args.file_path),
        )
        .map_err(path_error_to_mcp)?;

        let fuzzy = FuzzyPosition {
            symbol_name: args.symbol_name.clone(),
            line_hint: args.line_hint,
            order_hint: args.symbol_index.unwrap_or(0),
        };

        let position = self
            .state
            .resolver
            .resolve_position(&abs_file, &fuzzy)
            .await
            .map_err(resolve_error_to_mcp)?;

        let snippet = if include_snippet {
            match snippet_for_file(
                &abs_file,
                position.line,
                snippet_context_lines,
                max_snippet_chars,
            )
            .await
            {
                Ok(s) => Some(s),
                Err(e) => {
                    warn!(
                        "snippet extraction failed for {}: {e}",
                        abs_file.display()
                    );
                    None
                }
            }
        } else {
            None
        };

        let mut warnings = Vec::<Value>::new();
        if let Some(w) = max_total_chars_warning {
            warnings.push(w);
        }

        let mut structured_content = structured_ok(
            "resolve_symbol_position",
            json!({
                "file_path": args.file_path,
                "symbol_name": args.symbol_name,
                "line_hint": args.line_hint,
                "symbol_index": fuzzy.order_hint,
                "max_total_chars": max_total_chars
            }),
        );
        if let Some(obj) = structured_content.as_object_mut() {
            obj.insert("position".to_string(), position_value(&position));
            obj.insert("position_1based".to_string(), position_1based(&position));
            if let Some(s) = snippet.as_ref() {
                obj.insert(
                    "snippet".to_string(),
                    serde_json::to_value(s).unwrap_or(Value::Null),
                );
            }
            obj.insert("warnings".to_string(), Value::Array(warnings));
        }
        enforce_global_output_caps(max_total_chars, &mut structured_content);

        Ok(CallToolResult {
            content: vec![Content::text(format!(
                "Resolved `{}` to {}:{} (1-based).",
                args.symbol_name,
                position.line.saturating_add(1),
                position.character.saturating_add(1)
            ))],
            structured_content: Some(structured_content),
            is_error: Some(false),
            meta: None,
        })
    }

    pub(crate) async fn locate_text_span(
        &self,
        request: CallToolRequestParam,
    ) -> Result<CallToolResult, McpError> {
        let args: LocateTextSpanArgs = parse_arguments(request.arguments)?;

        if args.text.is_empty() {
            return Err(McpError::invalid_params("text must not be empty", None));
        }

        let (max_total_chars, max_total_chars_warning) =
            effective_max_total_chars(&self.state.config, args.max_total_chars);

        let abs_file = canonicalize_within(
            &self.state.workspace_root,
            &self.state.allowed_roots,
            &PathBuf::from(&args.file_path),
        )
        .map_err(path_error_to_mcp)?;

        let range = self
            .state
            .resolver
            .find_exact_text(&abs_file, &args.text)
            .await
            .map_err(locate_error_to_mcp)?;

        let mut warnings = Vec::<Value>::new();
        if let Some(w) = max_total_chars_warning {
            warnings.push(w);
        }

        let mut structured_content = structured_ok(
            "locate_text_span",
            json!({
                "file_path": args.file_path,
                "text": args.text,
                "max_total_chars": max_total_chars
            }),
        );
        if let Some(obj) = structured_content.as_object_mut() {
            obj.insert("range".to_string(), range_value(&range));
            obj.insert("range_1based".to_string(), range_1based(&range));
            obj.insert("warnings".to_string(), Value::Array(warnings));
        }
        enforce_global_output_caps(max_total_chars, &mut structured_content);

        Ok(CallToolResult {
            content: vec![Content::text(format!(
                "Located text span at {}:{}..{}:{} (1-based).",
                range.start.line.saturating_add(1),
                range.start.character.saturating_add(1),
                range.end.line.saturating_add(1),
                range.end.character.saturating_add(1)
            ))],
            structured_content: Some(structured_content),
            is_error: Some(false),
            meta: None,
        })
    }
}

fn path_error_to_mcp(err: anyhow::Error) -> McpError {
    let message = err.to_string();
    let data = message
        .contains("outside allowed roots")
        .then(|| json!({ "pinpoint_error": { "kind": "outside_allowed_roots" } }));
    McpError::invalid_params(message, data)
}

fn resolve_error_to_mcp(err: ResolveError) -> McpError {
    match &err {
        ResolveError::NotFoundInWindow {
            symbol_name,
            line_hint,
            searched_start,
            searched_end,
        } => McpError::invalid_params(
            err.to_string(),
            Some(json!({
                "pinpoint_error": {
                    "kind": "not_found_in_window",
                    "symbol_name": symbol_name,
                    "line_hint": line_hint,
                    "searched_start": searched_start,
                    "searched_end": searched_end
                }
            })),
        ),
        ResolveError::Io(_) => McpError::internal_error(
            err.to_string(),
            Some(json!({ "pinpoint_error": { "kind": "io" } })),
        ),
    }
}

fn locate_error_to_mcp(err: LocateError) -> McpError {
    match &err {
        LocateError::TextNotFound { preview } => McpError::invalid_params(
            err.to_string(),
            Some(json!({
                "pinpoint_error": { "kind": "text_not_found", "preview": preview }
            })),
        ),
        LocateError::TextAmbiguous { count, preview } => McpError::invalid_params(
            err.to_string(),
            Some(json!({
                "pinpoint_error": { "kind": "text_ambiguous", "count": count, "preview": preview }
            })),
        ),
        LocateError::Io(_) => McpError::internal_error(
            err.to_string(),
            Some(json!({ "pinpoint_error": { "kind": "io" } })),
        ),
    }
}

async fn snippet_for_file(
    path: &Path,
    center_line: u32,
    context_lines: usize,
    max_chars: usize,
) -> anyhow::Result<pinpoint_core::snippet::Snippet> {
    let content = tokio::fs::read_to_string(path).await?;
    Ok(pinpoint_core::snippet::context_snippet(
        &content,
        center_line,
        context_lines,
        max_chars,
    ))
}

#[cfg(test)]
mod tests {
    use rmcp::model::CallToolRequestParam;
    use serde_json::{Value, json};
    use tempfile::TempDir;

    use crate::{McpOptions, PinpointMcpServer};

    fn workspace_with(content: &str) -> (TempDir, PinpointMcpServer) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("sample.ts"), content).unwrap();
        let server = PinpointMcpServer::new(McpOptions {
            config_path: None,
            workspace_root: Some(dir.path().to_path_buf()),
        })
        .unwrap();
        (dir, server)
    }

    fn request(name: &'static str, arguments: Value) -> CallToolRequestParam {
        CallToolRequestParam {
            name: name.into(),
            arguments: arguments.as_object().cloned(),
        }
    }

    fn pinpoint_error_kind(err: &rmcp::ErrorData) -> String {
        err.data
            .as_ref()
            .and_then(|d| d.get("pinpoint_error"))
            .and_then(|e| e.get("kind"))
            .and_then(|k| k.as_str())
            .unwrap_or_default()
            .to_string()
    }

    #[tokio::test]
    async fn resolves_a_symbol_through_a_real_workspace() {
        let (_dir, server) =
            workspace_with("function hello() {}\nfunction goodbye() {}\n");

        let result = server
            .resolve_symbol_position(request(
                "resolve_symbol_position",
                json!({ "file_path": "sample.ts", "symbol_name": "goodbye", "line_hint": 2 }),
            ))
            .await
            .unwrap();

        assert_eq!(result.is_error, Some(false));
        let sc = result.structured_content.unwrap();
        assert_eq!(sc["position"], json!({ "line": 1, "character": 9 }));
        assert_eq!(
            sc["position_1based"],
            json!({ "line": 2, "character": 10 })
        );
        assert!(sc.get("snippet").is_some());
    }

    #[tokio::test]
    async fn snippet_can_be_disabled() {
        let (_dir, server) = workspace_with("one\ntwo\nthree\n");

        let result = server
            .resolve_symbol_position(request(
                "resolve_symbol_position",
                json!({
                    "file_path": "sample.ts",
                    "symbol_name": "two",
                    "line_hint": 2,
                    "include_snippet": false
                }),
            ))
            .await
            .unwrap();

        let sc = result.structured_content.unwrap();
        assert!(sc.get("snippet").is_none());
    }

    #[tokio::test]
    async fn out_of_window_symbol_maps_to_a_typed_engine_error() {
        let (_dir, server) = workspace_with("a\ntarget\nb\nc\nd\ne\nf\ng\n");

        let err = server
            .resolve_symbol_position(request(
                "resolve_symbol_position",
                json!({ "file_path": "sample.ts", "symbol_name": "target", "line_hint": 8 }),
            ))
            .await
            .unwrap_err();

        assert_eq!(pinpoint_error_kind(&err), "not_found_in_window");
    }

    #[tokio::test]
    async fn locates_a_unique_span() {
        let (_dir, server) = workspace_with("const foo = 42;\n");

        let result = server
            .locate_text_span(request(
                "locate_text_span",
                json!({ "file_path": "sample.ts", "text": "foo = 42" }),
            ))
            .await
            .unwrap();

        let sc = result.structured_content.unwrap();
        assert_eq!(
            sc["range"],
            json!({
                "start": { "line": 0, "character": 6 },
                "end": { "line": 0, "character": 14 }
            })
        );
    }

    #[tokio::test]
    async fn repeated_text_maps_to_a_typed_ambiguity_error() {
        let (_dir, server) = workspace_with("foo foo foo\n");

        let err = server
            .locate_text_span(request(
                "locate_text_span",
                json!({ "file_path": "sample.ts", "text": "foo" }),
            ))
            .await
            .unwrap_err();

        assert_eq!(pinpoint_error_kind(&err), "text_ambiguous");
        let count = err
            .data
            .as_ref()
            .and_then(|d| d["pinpoint_error"]["count"].as_u64())
            .unwrap();
        assert_eq!(count, 3);
    }

    #[tokio::test]
    async fn files_outside_the_workspace_are_rejected() {
        let (_dir, server) = workspace_with("irrelevant\n");
        let outside = tempfile::tempdir().unwrap();
        let outside_file = outside.path().join("secret.txt");
        std::fs::write(&outside_file, "hidden\n").unwrap();

        let err = server
            .locate_text_span(request(
                "locate_text_span",
                json!({
                    "file_path": outside_file.to_string_lossy(),
                    "text": "hidden"
                }),
            ))
            .await
            .unwrap_err();

        assert!(err.message.contains("outside allowed roots"));
        assert_eq!(pinpoint_error_kind(&err), "outside_allowed_roots");
    }

    #[tokio::test]
    async fn missing_files_surface_as_internal_io_errors() {
        let (dir, server) = workspace_with("irrelevant\n");
        // Path is inside the workspace but does not exist, so canonicalize
        // fails before the engine ever runs.
        let err = server
            .resolve_symbol_position(request(
                "resolve_symbol_position",
                json!({
                    "file_path": dir.path().join("missing.ts").to_string_lossy(),
                    "symbol_name": "x",
                    "line_hint": 1
                }),
            ))
            .await
            .unwrap_err();

        assert!(err.message.contains("failed to canonicalize"));
    }
}
