use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::sync::Arc;

mod catalog;
mod config;
mod logging;
#[cfg(feature = "stdio")]
mod mcp;

use config::ConfigArgs;
use sonarpipe_core::{CompletionBackend, ToolKind};
use sonarpipe_local::PerplexityClient;

#[derive(Parser, Debug)]
#[command(name = "sonarpipe")]
#[command(about = "Perplexity ask/research/reason tools (MCP stdio server)", long_about = None)]
struct Cli {
    #[command(flatten)]
    config: ConfigArgs,
    /// Defaults to `mcp-stdio`.
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run as an MCP stdio server (for Cursor / Claude Desktop / MCP clients).
    #[cfg(feature = "stdio")]
    McpStdio,
    /// Print the tool catalog (names, descriptions, input schemas) as JSON.
    Tools,
    /// Run one tool call through the same pipeline as the server and print the result.
    Call(CallCmd),
    /// Diagnose configuration (json; no secrets).
    Doctor(DoctorCmd),
    /// Print version info.
    Version(VersionCmd),
}

#[derive(clap::Args, Debug)]
struct CallCmd {
    /// Tool name, e.g. perplexity_ask
    #[arg(long)]
    tool: String,
    /// Tool arguments as a JSON object.
    #[arg(long, conflicts_with = "args_json_file")]
    args_json: Option<String>,
    /// File containing the tool arguments JSON object.
    #[arg(long)]
    args_json_file: Option<std::path::PathBuf>,
    /// Output format: json|text
    #[arg(long = "output", alias = "format", default_value = "json")]
    output: String,
}

#[derive(clap::Args, Debug)]
struct DoctorCmd {
    /// Output format: json|text
    #[arg(long = "output", alias = "format", default_value = "json")]
    output: String,
}

#[derive(clap::Args, Debug)]
struct VersionCmd {
    /// Output format: json|text
    #[arg(long = "output", alias = "format", default_value = "json")]
    output: String,
}

/// Fatal when configuration is incomplete: nothing is served without it.
fn backend(cfg_args: &ConfigArgs) -> Result<Arc<dyn CompletionBackend>> {
    let cfg = cfg_args.load().context("startup configuration")?;
    tracing::debug!(endpoint = cfg.endpoint.as_str(), timeout = ?cfg.timeout, "configured");
    let client = PerplexityClient::from_config(&cfg)?;
    Ok(Arc::new(client))
}

fn read_call_args(cmd: &CallCmd) -> Result<Option<serde_json::Map<String, serde_json::Value>>> {
    let raw = match (&cmd.args_json, &cmd.args_json_file) {
        (Some(s), _) => s.clone(),
        (None, Some(p)) => std::fs::read_to_string(p)
            .with_context(|| format!("read --args-json-file {}", p.display()))?,
        (None, None) => return Ok(None),
    };
    let v: serde_json::Value = serde_json::from_str(&raw).context("parse tool arguments JSON")?;
    match v {
        serde_json::Value::Null => Ok(None),
        serde_json::Value::Object(m) => Ok(Some(m)),
        _ => anyhow::bail!("tool arguments must be a JSON object"),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();
    let loaded = config::load_env_file();
    if !loaded.is_empty() {
        // Key names only.
        tracing::debug!(keys = ?loaded, "loaded SONARPIPE_ENV_FILE");
    }

    let cli = Cli::parse();

    #[cfg(feature = "stdio")]
    let command = cli.command.unwrap_or(Commands::McpStdio);
    #[cfg(not(feature = "stdio"))]
    let command = cli
        .command
        .ok_or_else(|| anyhow::anyhow!("no subcommand given (built without the stdio feature)"))?;

    match command {
        #[cfg(feature = "stdio")]
        Commands::McpStdio => {
            let backend = match backend(&cli.config) {
                Ok(b) => b,
                Err(e) => {
                    tracing::error!(error = %format!("{e:#}"), "refusing to start");
                    return Err(e);
                }
            };
            mcp::serve_stdio(backend)
                .await
                .map_err(|e| anyhow::anyhow!(e.to_string()))?;
        }
        Commands::Tools => {
            let v = serde_json::json!({ "tools": catalog::catalog() });
            println!("{}", serde_json::to_string_pretty(&v)?);
        }
        Commands::Call(cmd) => {
            let args = read_call_args(&cmd)?;
            let backend = backend(&cli.config)?;
            let r = sonarpipe_core::call_tool(backend.as_ref(), &cmd.tool, args.as_ref()).await;
            match cmd.output.to_ascii_lowercase().as_str() {
                "text" => println!("{}", r.first_text()),
                _ => println!("{}", serde_json::to_string(&r)?),
            }
            if r.is_error {
                std::process::exit(1);
            }
        }
        Commands::Doctor(args) => {
            let key_configured =
                cli.config.api_key.as_deref().is_some_and(|k| !k.trim().is_empty())
                    || config::api_key_from_env().is_some();
            let base_url_configured =
                cli.config.base_url.as_deref().is_some_and(|u| !u.trim().is_empty());
            let loaded = cli.config.load();
            let (ok, problem) = match &loaded {
                Ok(_) => (true, None),
                Err(e) => (false, Some(e.to_string())),
            };
            let payload = serde_json::json!({
                "schema_version": 1,
                "kind": "doctor",
                "ok": ok,
                "name": "sonarpipe",
                "version": env!("CARGO_PKG_VERSION"),
                "configured": {
                    "api_key": key_configured,
                    "api_key_alias": config::has_env("SONARPIPE_PERPLEXITY_API_KEY"),
                    "base_url": base_url_configured,
                    "env_file": config::has_env("SONARPIPE_ENV_FILE"),
                },
                "endpoint": loaded.as_ref().ok().map(|c| c.endpoint.as_str().to_string()),
                "timeout_ms": loaded.as_ref().ok().and_then(|c| c.timeout).map(|t| t.as_millis() as u64),
                "tools": ToolKind::ALL.iter().map(|k| serde_json::json!({
                    "name": k.name(),
                    "model": k.model(),
                })).collect::<Vec<_>>(),
                "problem": problem,
            });
            match args.output.to_ascii_lowercase().as_str() {
                "text" => {
                    println!("sonarpipe {}", env!("CARGO_PKG_VERSION"));
                    println!(
                        "api_key: {}  base_url: {}",
                        if key_configured { "set" } else { "missing" },
                        if base_url_configured { "set" } else { "missing" }
                    );
                    match &problem {
                        None => println!("ok"),
                        Some(p) => println!("problem: {p}"),
                    }
                }
                _ => println!("{}", payload),
            }
        }
        Commands::Version(args) => {
            let v = serde_json::json!({
                "schema_version": 1,
                "kind": "version",
                "ok": true,
                "name": "sonarpipe",
                "version": env!("CARGO_PKG_VERSION"),
            });
            match args.output.to_ascii_lowercase().as_str() {
                "text" => println!("sonarpipe {}", env!("CARGO_PKG_VERSION")),
                _ => println!("{}", v),
            }
        }
    }

    Ok(())
}
