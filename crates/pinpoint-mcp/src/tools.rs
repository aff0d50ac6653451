use rmcp::model::Tool;
use tracing::warn;

pub(crate) fn all_tools() -> Vec<Tool> {
    use crate::tool_schemas as schemas;
    vec![
        schemas::tool_get_current_config(),
        schemas::tool_resolve_symbol_position(),
        schemas::tool_locate_text_span(),
    ]
}

pub(crate) fn filter_tools_by_config(
    tools: Vec<Tool>,
    mcp: Option<&pinpoint_core::config::McpConfig>,
) -> Vec<Tool> {
    let Some(tools_cfg) = mcp.and_then(|m| m.tools.as_ref()) else {
        return tools;
    };

    let normalize = |s: &str| s.trim().to_ascii_lowercase();
    let known: std::collections::HashSet<String> = tools
        .iter()
        .map(|t| normalize(t.name.as_ref()))
        .filter(|n| !n.is_empty())
        .collect();

    let mut allow_set = std::collections::HashSet::<String>::new();
    for item in tools_cfg.allow.iter().flatten() {
        let n = normalize(item);
        if !n.is_empty() {
            allow_set.insert(n);
        }
    }

    let mut exclude_set = std::collections::HashSet::<String>::new();
    for item in tools_cfg.exclude.iter().flatten() {
        let n = normalize(item);
        if !n.is_empty() {
            exclude_set.insert(n);
        }
    }

    let has_allow = !allow_set.is_empty();

    let filtered: Vec<Tool> = tools
        .into_iter()
        .filter(|tool| {
            let name = normalize(tool.name.as_ref());
            if has_allow {
                return allow_set.contains(&name);
            }
            !exclude_set.contains(&name)
        })
        .collect();

    if has_allow {
        for wanted in allow_set {
            if !known.contains(&wanted) {
                warn!("mcp.tools.allow includes unknown tool: {wanted}");
            }
        }
    } else {
        for denied in exclude_set {
            if !known.contains(&denied) {
                warn!("mcp.tools.exclude includes unknown tool: {denied}");
            }
        }
    }

    filtered
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_tools_are_exposed_without_config() {
        let names: Vec<String> = filter_tools_by_config(all_tools(), None)
            .into_iter()
            .map(|t| t.name.to_string())
            .collect();
        assert_eq!(
            names,
            vec![
                "get_current_config",
                "resolve_symbol_position",
                "locate_text_span"
            ]
        );
    }

    #[test]
    fn allow_list_restricts_exposure() {
        let mcp: pinpoint_core::config::McpConfig = serde_json::from_str(
            r#"{ "tools": { "allow": ["locate_text_span"] } }"#,
        )
        .unwrap();
        let names: Vec<String> = filter_tools_by_config(all_tools(), Some(&mcp))
            .into_iter()
            .map(|t| t.name.to_string())
            .collect();
        assert_eq!(names, vec!["locate_text_span"]);
    }

    #[test]
    fn exclude_list_is_ignored_when_allow_is_set() {
        let mcp: pinpoint_core::config::McpConfig = serde_json::from_str(
            r#"{ "tools": { "allow": ["resolve_symbol_position"], "exclude": ["resolve_symbol_position"] } }"#,
        )
        .unwrap();
        let names: Vec<String> = filter_tools_by_config(all_tools(), Some(&mcp))
            .into_iter()
            .map(|t| t.name.to_string())
            .collect();
        assert_eq!(names, vec!["resolve_symbol_position"]);
    }

    #[test]
    fn exclude_list_removes_tools() {
        let mcp: pinpoint_core::config::McpConfig =
            serde_json::from_str(r#"{ "tools": { "exclude": ["get_current_config"] } }"#).unwrap();
        let names: Vec<String> = filter_tools_by_config(all_tools(), Some(&mcp))
            .into_iter()
            .map(|t| t.name.to_string())
            .collect();
        assert!(!names.contains(&"get_current_config".to_string()));
        assert!(names.contains(&"resolve_symbol_position".to_string()));
    }
}
