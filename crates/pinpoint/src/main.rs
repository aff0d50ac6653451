use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;

#[derive(Debug, Parser)]
#[command(name = "pinpoint")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run MCP server over stdio (for Codex/Claude Code/etc.)
    Mcp {
        /// Optional path to a pinpoint config file (.toml or .json)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Override workspace root (defaults to config or current directory)
        #[arg(long)]
        workspace_root: Option<PathBuf>,
    },
    /// Print environment/config diagnostics for pinpoint
    Doctor {
        /// Optional path to a pinpoint config file (.toml or .json)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Override workspace root (defaults to config or current directory)
        #[arg(long)]
        workspace_root: Option<PathBuf>,
        /// Emit machine-readable JSON instead of plain lines
        #[arg(long)]
        json: bool,
    },
    /// Resolve a fuzzy symbol anchor to an exact position (one-shot)
    Resolve {
        /// File to resolve in (absolute or relative to the workspace root)
        #[arg(long)]
        file: PathBuf,
        /// Symbol text to look for
        #[arg(long)]
        symbol: String,
        /// Approximate 1-based line number
        #[arg(long)]
        line: u32,
        /// Which occurrence on the line is meant (0 = first)
        #[arg(long, default_value_t = 0)]
        index: u32,
        /// Override the configured line search radius
        #[arg(long)]
        radius: Option<u32>,
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long)]
        workspace_root: Option<PathBuf>,
        /// Emit machine-readable JSON instead of plain lines
        #[arg(long)]
        json: bool,
    },
    /// Locate a unique literal text span in a file (one-shot)
    Locate {
        /// File to search (absolute or relative to the workspace root)
        #[arg(long)]
        file: PathBuf,
        /// Literal text that must occur exactly once
        #[arg(long)]
        text: String,
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long)]
        workspace_root: Option<PathBuf>,
        /// Emit machine-readable JSON instead of plain lines
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    match args.command {
        Command::Mcp {
            config,
            workspace_root,
        } => {
            pinpoint_mcp::run_stdio_with_options(pinpoint_mcp::McpOptions {
                config_path: config,
                workspace_root,
            })
            .await
        }
        Command::Doctor {
            config,
            workspace_root,
            json,
        } => doctor(config, workspace_root, json),
        Command::Resolve {
            file,
            symbol,
            line,
            index,
            radius,
            config,
            workspace_root,
            json,
        } => resolve_one_shot(file, symbol, line, index, radius, config, workspace_root, json).await,
        Command::Locate {
            file,
            text,
            config,
            workspace_root,
            json,
        } => locate_one_shot(file, text, config, workspace_root, json).await,
    }
}

fn doctor(config: Option<PathBuf>, workspace_root: Option<PathBuf>, json: bool) -> Result<()> {
    let loaded = pinpoint_core::config::load_config(config.as_deref(), workspace_root.as_deref())?;
    let resolver = pinpoint_core::config::resolver_config(&loaded.config);
    let roots = pinpoint_core::config::allowed_roots(&loaded.config, &loaded.workspace_root);

    if json {
        let payload = json!({
            "config_source": format!("{:?}", loaded.source),
            "workspace_root": loaded.workspace_root.to_string_lossy(),
            "allowed_roots": roots.iter().map(|p| p.to_string_lossy()).collect::<Vec<_>>(),
            "resolver": { "line_search_radius": resolver.line_search_radius },
            "mcp_output": loaded.config.mcp.as_ref().and_then(|m| m.output.as_ref()).map(|o| json!({
                "max_total_chars_default": o.max_total_chars_default,
                "max_total_chars_hard": o.max_total_chars_hard,
            })),
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    println!("config_source: {:?}", loaded.source);
    println!("workspace_root: {}", loaded.workspace_root.display());
    println!("resolver.line_search_radius: {}", resolver.line_search_radius);
    for (idx, root) in roots.iter().enumerate() {
        println!("allowed_roots[{idx}]: {}", root.display());
    }
    if let Some(output) = loaded.config.mcp.as_ref().and_then(|m| m.output.as_ref()) {
        println!(
            "mcp.output.max_total_chars: default={:?} hard={:?}",
            output.max_total_chars_default, output.max_total_chars_hard
        );
    } else {
        println!("mcp.output: <not configured>");
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn resolve_one_shot(
    file: PathBuf,
    symbol: String,
    line: u32,
    index: u32,
    radius: Option<u32>,
    config: Option<PathBuf>,
    workspace_root: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let (engine, file) = engine_for(config, workspace_root, file, radius)?;
    let fuzzy = pinpoint_core::FuzzyPosition {
        symbol_name: symbol.clone(),
        line_hint: line,
        order_hint: index,
    };

    let position = engine
        .resolve_position(&file, &fuzzy)
        .await
        .with_context(|| format!("failed to resolve `{symbol}` in {}", file.display()))?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "file": file.to_string_lossy(),
                "symbol": symbol,
                "position": { "line": position.line, "character": position.character },
                "position_1based": {
                    "line": position.line + 1,
                    "character": position.character + 1
                },
            }))?
        );
    } else {
        println!(
            "{}:{}:{} (1-based {}:{})",
            file.display(),
            position.line,
            position.character,
            position.line + 1,
            position.character + 1
        );
    }
    Ok(())
}

async fn locate_one_shot(
    file: PathBuf,
    text: String,
    config: Option<PathBuf>,
    workspace_root: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let (engine, file) = engine_for(config, workspace_root, file, None)?;

    let range = engine
        .find_exact_text(&file, &text)
        .await
        .with_context(|| format!("failed to locate text in {}", file.display()))?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&json!({
                "file": file.to_string_lossy(),
                "range": {
                    "start": { "line": range.start.line, "character": range.start.character },
                    "end": { "line": range.end.line, "character": range.end.character },
                },
            }))?
        );
    } else {
        println!(
            "{}:{}:{}..{}:{}",
            file.display(),
            range.start.line,
            range.start.character,
            range.end.line,
            range.end.character
        );
    }
    Ok(())
}

fn engine_for(
    config: Option<PathBuf>,
    workspace_root: Option<PathBuf>,
    file: PathBuf,
    radius_override: Option<u32>,
) -> Result<(pinpoint_core::SymbolResolver, PathBuf)> {
    let loaded = pinpoint_core::config::load_config(config.as_deref(), workspace_root.as_deref())?;
    let mut resolver_config = pinpoint_core::config::resolver_config(&loaded.config);
    if let Some(radius) = radius_override {
        resolver_config.line_search_radius = radius;
    }

    let file = if file.is_absolute() {
        file
    } else {
        loaded.workspace_root.join(file)
    };

    let engine = pinpoint_core::SymbolResolver::new(
        resolver_config,
        Arc::new(pinpoint_core::DiskContentSource),
    );
    Ok((engine, file))
}
