use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::resolve::ResolverConfig;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub struct PinpointConfig {
    #[serde(default)]
    pub workspace_root: Option<PathBuf>,
    #[serde(default)]
    pub resolver: Option<ResolverSection>,
    #[serde(default)]
    pub mcp: Option<McpConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub struct ResolverSection {
    /// Lines searched above and below a hinted line (defaults to 2).
    #[serde(default)]
    #[serde(alias = "lineSearchRadius")]
    pub line_search_radius: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub struct McpConfig {
    #[serde(default)]
    pub output: Option<McpOutputConfig>,
    #[serde(default)]
    pub tools: Option<McpToolsConfig>,
    /// Extra roots (absolute or relative to `workspace_root`) that tools may
    /// read from, in addition to the workspace root itself.
    #[serde(default)]
    #[serde(alias = "allowedRoots")]
    pub allowed_roots: Option<Vec<PathBuf>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct McpToolsConfig {
    /// If set and non-empty, only these tools are exposed through MCP.
    #[serde(default)]
    pub allow: Option<Vec<String>>,
    /// Tools to exclude from MCP exposure (ignored when `allow` is set and non-empty).
    #[serde(default)]
    pub exclude: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct McpOutputConfig {
    #[serde(default)]
    pub max_total_chars_default: Option<usize>,
    #[serde(default)]
    pub max_total_chars_hard: Option<usize>,
}

#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: PinpointConfig,
    pub workspace_root: PathBuf,
    pub source: ConfigSource,
}

#[derive(Debug, Clone)]
pub enum ConfigSource {
    None,
    Path(PathBuf),
    Env(PathBuf),
    Workspace(PathBuf),
}

pub fn load_config(
    cli_config_path: Option<&Path>,
    cli_workspace_root: Option<&Path>,
) -> Result<LoadedConfig> {
    if let Some(path) = cli_config_path {
        let config = read_config_file(path)?;
        let workspace_root =
            resolve_workspace_root(cli_workspace_root, config.workspace_root.as_deref())?;
        return Ok(LoadedConfig {
            config,
            workspace_root,
            source: ConfigSource::Path(path.to_path_buf()),
        });
    }

    if let Ok(path) = std::env::var("PINPOINT_CONFIG_PATH")
        && !path.trim().is_empty()
    {
        let path = PathBuf::from(path);
        let config = read_config_file(&path)?;
        let workspace_root =
            resolve_workspace_root(cli_workspace_root, config.workspace_root.as_deref())?;
        return Ok(LoadedConfig {
            config,
            workspace_root,
            source: ConfigSource::Env(path),
        });
    }

    let fallback_root = cli_workspace_root
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));
    let workspace_root = fallback_root
        .canonicalize()
        .unwrap_or(fallback_root.clone());

    for candidate in workspace_config_candidates(&workspace_root) {
        if candidate.exists() {
            let config = read_config_file(&candidate)?;
            let effective_root =
                resolve_workspace_root(Some(&workspace_root), config.workspace_root.as_deref())?;
            return Ok(LoadedConfig {
                config,
                workspace_root: effective_root,
                source: ConfigSource::Workspace(candidate),
            });
        }
    }

    Ok(LoadedConfig {
        config: PinpointConfig::default(),
        workspace_root,
        source: ConfigSource::None,
    })
}

fn resolve_workspace_root(cli: Option<&Path>, from_config: Option<&Path>) -> Result<PathBuf> {
    if let Some(cli) = cli {
        return cli
            .canonicalize()
            .with_context(|| format!("failed to canonicalize workspace_root: {cli:?}"));
    }
    if let Some(cfg) = from_config {
        return cfg
            .canonicalize()
            .with_context(|| format!("failed to canonicalize workspace_root: {cfg:?}"));
    }
    let cwd = std::env::current_dir().context("failed to get current_dir")?;
    Ok(cwd.canonicalize().unwrap_or(cwd))
}

fn workspace_config_candidates(workspace_root: &Path) -> Vec<PathBuf> {
    vec![
        workspace_root.join(".pinpoint").join("config.toml"),
        workspace_root.join(".pinpoint").join("config.json"),
        workspace_root.join("pinpoint.toml"),
        workspace_root.join("pinpoint.json"),
    ]
}

fn read_config_file(path: &Path) -> Result<PinpointConfig> {
    let bytes =
        std::fs::read(path).with_context(|| format!("failed to read config file: {path:?}"))?;
    let ext = path.extension().and_then(OsStr::to_str).unwrap_or("");

    if ext.eq_ignore_ascii_case("toml") {
        let s = String::from_utf8(bytes).context("config file is not valid UTF-8")?;
        let cfg: PinpointConfig = toml::from_str(&s).context("failed to parse TOML config")?;
        return Ok(cfg);
    }
    if ext.eq_ignore_ascii_case("json") {
        let cfg: PinpointConfig =
            serde_json::from_slice(&bytes).context("failed to parse JSON config")?;
        return Ok(cfg);
    }

    Err(anyhow!(
        "unsupported config extension (expected .toml or .json): {path:?}"
    ))
}

/// Effective resolver config after applying defaults.
pub fn resolver_config(config: &PinpointConfig) -> ResolverConfig {
    match config
        .resolver
        .as_ref()
        .and_then(|r| r.line_search_radius)
    {
        Some(radius) => ResolverConfig {
            line_search_radius: radius,
        },
        None => ResolverConfig::default(),
    }
}

/// Roots that MCP tools are allowed to read from: the workspace root plus any
/// configured extras, canonicalized and most specific first.
pub fn allowed_roots(config: &PinpointConfig, workspace_root: &Path) -> Vec<PathBuf> {
    let mut out = Vec::<PathBuf>::new();
    let mut push = |p: PathBuf| {
        let canon = p.canonicalize().unwrap_or(p);
        if !out.contains(&canon) {
            out.push(canon);
        }
    };

    push(workspace_root.to_path_buf());
    for extra in config
        .mcp
        .as_ref()
        .and_then(|m| m.allowed_roots.as_ref())
        .into_iter()
        .flatten()
    {
        let abs = if extra.is_absolute() {
            extra.clone()
        } else {
            workspace_root.join(extra)
        };
        push(abs);
    }

    out.sort_by_key(|p| std::cmp::Reverse(p.components().count()));
    out
}
