use rmcp::ErrorData as McpError;
use rmcp::model::{CallToolRequestParam, CallToolResult, Content};
use serde_json::{Value, json};

use crate::{
    GetCurrentConfigArgs, PinpointMcpServer, effective_max_total_chars, enforce_global_output_caps,
    parse_arguments, structured_ok,
};

impl PinpointMcpServer {
    pub(crate) async fn get_current_config(
        &self,
        request: CallToolRequestParam,
    ) -> Result<CallToolResult, McpError> {
        let _args: GetCurrentConfigArgs = parse_arguments(request.arguments)?;

        let resolver_config = self.state.resolver.config();
        let (max_total_chars_default, _) = effective_max_total_chars(&self.state.config, None);
        let hard = self
            .state
            .config
            .mcp
            .as_ref()
            .and_then(|m| m.output.as_ref())
            .and_then(|o| o.max_total_chars_hard);

        let tool_names: Vec<String> = self.tools.iter().map(|t| t.name.to_string()).collect();

        let mut structured_content = structured_ok("get_current_config", json!({}));
        if let Some(obj) = structured_content.as_object_mut() {
            obj.insert(
                "workspace_root".to_string(),
                Value::String(self.state.workspace_root.to_string_lossy().to_string()),
            );
            obj.insert(
                "allowed_roots".to_string(),
                Value::Array(
                    self.state
                        .allowed_roots
                        .iter()
                        .map(|p| Value::String(p.to_string_lossy().to_string()))
                        .collect(),
                ),
            );
            obj.insert(
                "config_source".to_string(),
                Value::String(self.state.config_source.clone()),
            );
            obj.insert(
                "resolver".to_string(),
                json!({ "line_search_radius": resolver_config.line_search_radius }),
            );
            obj.insert(
                "output".to_string(),
                json!({
                    "max_total_chars_default": max_total_chars_default,
                    "max_total_chars_hard": hard,
                }),
            );
            obj.insert("tools".to_string(), json!(tool_names));
        }
        enforce_global_output_caps(max_total_chars_default, &mut structured_content);

        Ok(CallToolResult {
            content: vec![Content::text(format!(
                "pinpoint configuration for workspace {}.",
                self.state.workspace_root.display()
            ))],
            structured_content: Some(structured_content),
            is_error: Some(false),
            meta: None,
        })
    }
}
