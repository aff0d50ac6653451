use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use rmcp::ErrorData as McpError;
use rmcp::ServiceExt;
use rmcp::handler::server::ServerHandler;
use rmcp::model::CallToolRequestParam;
use rmcp::model::CallToolResult;
use rmcp::model::Content;
use rmcp::model::JsonObject;
use rmcp::model::ListToolsResult;
use rmcp::model::PaginatedRequestParam;
use rmcp::model::ServerCapabilities;
use rmcp::model::ServerInfo;
use rmcp::model::Tool;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;

mod handlers;
mod output;
mod structured;
mod tool_schemas;
mod tools;

use output::{effective_max_total_chars, enforce_global_output_caps};
use structured::{structured_error, structured_ok};

fn mcp_error_kind_name(code: i32) -> &'static str {
    match code {
        -32002 => "resource_not_found",
        -32600 => "invalid_request",
        -32601 => "method_not_found",
        -32602 => "invalid_params",
        -32603 => "internal_error",
        -32700 => "parse_error",
        _ => "mcp_error",
    }
}

fn pinpoint_error_kind_from_data(data: Option<&Value>) -> Option<&str> {
    data.and_then(|d| d.get("pinpoint_error"))
        .and_then(|e| e.get("kind"))
        .and_then(|k| k.as_str())
}

/// Actionable follow-ups for a failed tool call, so the caller can
/// self-correct without another round of guessing.
fn error_next_steps(tool: &str, err: &McpError) -> Vec<Value> {
    let message = err.message.as_ref();
    let kind = pinpoint_error_kind_from_data(err.data.as_ref());
    let mut steps = Vec::new();

    if kind == Some("not_found_in_window") {
        steps.push(json!({
            "kind": "retry",
            "tool": "resolve_symbol_position",
            "message": "Re-read the file to refresh your line numbers, then retry with a corrected line_hint. Line hints drift whenever the file changes."
        }));
        steps.push(json!({
            "kind": "config",
            "message": "If hints are systematically off by more than the searched range, raise `resolver.line_search_radius` in the pinpoint config."
        }));
    }

    if kind == Some("text_not_found") {
        steps.push(json!({
            "kind": "retry",
            "tool": "locate_text_span",
            "message": "Re-read the file and copy the text verbatim, including whitespace and line breaks; the match is exact, not fuzzy."
        }));
    }

    if kind == Some("text_ambiguous") {
        steps.push(json!({
            "kind": "retry",
            "tool": "locate_text_span",
            "message": "Include more surrounding lines so the text occurs exactly once in the file."
        }));
    }

    if kind == Some("outside_allowed_roots") || message.contains("outside allowed roots") {
        steps.push(json!({
            "kind": "config",
            "message": "Ensure `file_path` is under the configured `workspace_root`, or add its root to `mcp.allowed_roots`."
        }));
    }

    if kind == Some("io") {
        steps.push(json!({
            "kind": "retry",
            "message": "Verify the file path exists on disk and is readable; pinpoint reads current disk state, not editor buffers."
        }));
    }

    if tool != "get_current_config" {
        steps.push(json!({
            "kind": "tool",
            "tool": "get_current_config",
            "arguments": {},
            "message": "Confirm the effective config (workspace_root, allowed_roots, line_search_radius, output caps)."
        }));
    }

    steps
}

fn mcp_error_to_call_tool_result(
    tool: &str,
    input: Option<Value>,
    err: McpError,
) -> CallToolResult {
    let code = err.code.0;
    let kind = pinpoint_error_kind_from_data(err.data.as_ref())
        .map(str::to_string)
        .unwrap_or_else(|| mcp_error_kind_name(code).to_string());
    let message = err.message.to_string();
    let next_steps = error_next_steps(tool, &err);

    let mut structured = structured_error(tool, input, &kind, &message);
    if let Some(obj) = structured.as_object_mut() {
        obj.insert("message".to_string(), Value::String(message.clone()));
        obj.insert("mcp_error_code".to_string(), json!(code));

        if let Some(error_obj) = obj.get_mut("error").and_then(|v| v.as_object_mut()) {
            error_obj.insert("code".to_string(), json!(code));
            if let Some(data) = err.data {
                error_obj.insert("data".to_string(), data);
            }
        }

        if !next_steps.is_empty() {
            obj.insert("next_steps".to_string(), Value::Array(next_steps));
        }
    }

    CallToolResult {
        // Keep a short text fallback for clients that ignore structuredContent.
        content: vec![Content::text(message)],
        structured_content: Some(structured),
        is_error: Some(true),
        meta: None,
    }
}

pub async fn run_stdio() -> Result<()> {
    run_stdio_with_options(McpOptions::default()).await
}

#[derive(Debug, Clone, Default)]
pub struct McpOptions {
    pub config_path: Option<PathBuf>,
    pub workspace_root: Option<PathBuf>,
}

pub async fn run_stdio_with_options(options: McpOptions) -> Result<()> {
    let service = PinpointMcpServer::new(options)?;
    let running = service
        .serve((tokio::io::stdin(), tokio::io::stdout()))
        .await?;
    running.waiting().await?;
    Ok(())
}

#[derive(Clone)]
struct PinpointMcpServer {
    tools: Arc<Vec<Tool>>,
    state: Arc<PinpointState>,
}

struct PinpointState {
    workspace_root: PathBuf,
    allowed_roots: Vec<PathBuf>,
    config_source: String,
    config: pinpoint_core::config::PinpointConfig,
    resolver: pinpoint_core::SymbolResolver,
}

impl PinpointMcpServer {
    fn new(options: McpOptions) -> Result<Self> {
        let loaded = pinpoint_core::config::load_config(
            options.config_path.as_deref(),
            options.workspace_root.as_deref(),
        )
        .context("failed to load pinpoint config")?;
        let workspace_root = loaded.workspace_root;
        let config = loaded.config;

        let allowed_roots = pinpoint_core::config::allowed_roots(&config, &workspace_root);
        let resolver_config = pinpoint_core::config::resolver_config(&config);

        info!(
            "starting pinpoint MCP server workspace_root={} line_search_radius={}",
            workspace_root.display(),
            resolver_config.line_search_radius
        );

        let resolver = pinpoint_core::SymbolResolver::new(
            resolver_config,
            Arc::new(pinpoint_core::DiskContentSource),
        );

        let tools = tools::filter_tools_by_config(tools::all_tools(), config.mcp.as_ref());

        Ok(Self {
            tools: Arc::new(tools),
            state: Arc::new(PinpointState {
                workspace_root,
                allowed_roots,
                config_source: format!("{:?}", loaded.source),
                config,
                resolver,
            }),
        })
    }
}

impl ServerHandler for PinpointMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_tool_list_changed()
                .build(),
            ..ServerInfo::default()
        }
    }

    fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: rmcp::service::RequestContext<rmcp::service::RoleServer>,
    ) -> impl std::future::Future<Output = Result<ListToolsResult, McpError>> + Send + '_ {
        let tools = self.tools.clone();
        async move {
            Ok(ListToolsResult {
                tools: (*tools).clone(),
                next_cursor: None,
            })
        }
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: rmcp::service::RequestContext<rmcp::service::RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let tool = request.name.clone();
        let input = request.arguments.clone().map(Value::Object);

        let result = match request.name.as_ref() {
            "get_current_config" => self.get_current_config(request).await,
            "resolve_symbol_position" => self.resolve_symbol_position(request).await,
            "locate_text_span" => self.locate_text_span(request).await,
            other => Ok(CallToolResult {
                // Keep a short text fallback for clients that ignore structuredContent.
                content: vec![Content::text(format!(
                    "Tool '{other}' is not implemented yet."
                ))],
                structured_content: Some({
                    let input = request.arguments.clone().map(Value::Object);
                    let mut structured =
                        structured_error(other, input, "not_implemented", "not implemented yet");
                    if let Some(obj) = structured.as_object_mut() {
                        obj.insert(
                            "next_steps".to_string(),
                            Value::Array(vec![json!({
                                "kind": "command",
                                "command": "pinpoint --version",
                                "message": "Confirm your pinpoint version; the tool may be newer than this install."
                            })]),
                        );
                        obj.insert(
                            "message".to_string(),
                            Value::String("not implemented yet".to_string()),
                        );
                    }
                    structured
                }),
                is_error: Some(true),
                meta: None,
            }),
        };

        match result {
            Ok(r) => Ok(r),
            Err(err) => Ok(mcp_error_to_call_tool_result(&tool, input, err)),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ResolveSymbolPositionArgs {
    file_path: String,
    symbol_name: String,
    /// 1-based, as the caller sees line numbers.
    line_hint: u32,
    #[serde(default)]
    symbol_index: Option<u32>,
    #[serde(default)]
    include_snippet: Option<bool>,
    #[serde(default)]
    snippet_context_lines: Option<usize>,
    #[serde(default)]
    max_snippet_chars: Option<usize>,
    #[serde(default)]
    max_total_chars: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct LocateTextSpanArgs {
    file_path: String,
    text: String,
    #[serde(default)]
    max_total_chars: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct GetCurrentConfigArgs {}

fn position_value(pos: &pinpoint_core::ExactPosition) -> Value {
    json!({ "line": pos.line, "character": pos.character })
}

fn position_1based(pos: &pinpoint_core::ExactPosition) -> Value {
    json!({
        "line": pos.line.saturating_add(1),
        "character": pos.character.saturating_add(1),
    })
}

fn range_value(range: &pinpoint_core::DiskRange) -> Value {
    json!({
        "start": position_value(&range.start),
        "end": position_value(&range.end),
    })
}

fn range_1based(range: &pinpoint_core::DiskRange) -> Value {
    json!({
        "start": position_1based(&range.start),
        "end": position_1based(&range.end),
    })
}

fn parse_arguments<T: for<'de> Deserialize<'de>>(
    arguments: Option<JsonObject>,
) -> Result<T, McpError> {
    let arguments = arguments.unwrap_or_default();
    serde_json::from_value::<T>(Value::Object(arguments.into_iter().collect()))
        .map_err(|e| McpError::invalid_params(e.to_string(), None))
}

fn canonicalize_within(
    workspace_root: &Path,
    allowed_roots: &[PathBuf],
    file_path: &Path,
) -> anyhow::Result<PathBuf> {
    let combined = if file_path.is_absolute() {
        file_path.to_path_buf()
    } else {
        workspace_root.join(file_path)
    };

    let file = combined
        .canonicalize()
        .with_context(|| format!("failed to canonicalize file path: {combined:?}"))?;

    if !allowed_roots.iter().any(|root| file.starts_with(root)) {
        return Err(anyhow::anyhow!(
            "file_path is outside allowed roots (workspace_root={:?}, file_path={:?})",
            workspace_root,
            file,
        ));
    }
    Ok(file)
}
