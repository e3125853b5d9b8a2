mod config;
mod plan_cmd;
mod serve_cmd;
#[cfg(test)]
mod test_util;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};

use coach_core::generate::{OpenRouterGenerator, PlanGenerator};

use config::CoachConfig;

#[derive(Parser)]
#[command(name = "coach", about = "Daily planning coach with a deterministic fallback")]
struct Cli {
    /// Config file path (defaults to ~/.config/coach/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a coach config file
    Init {
        /// Model identifier to store in the config
        #[arg(long)]
        model: Option<String>,
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// Run the HTTP server
    Serve {
        /// Address to bind (overrides COACH_BIND env var)
        #[arg(long)]
        bind: Option<String>,
        /// Port to listen on (overrides COACH_PORT env var)
        #[arg(long)]
        port: Option<u16>,
        /// Never call the model; serve deterministic plans only
        #[arg(long)]
        offline: bool,
    },
    /// Generate a plan from a JSON request file ("-" reads stdin)
    Plan {
        /// Path to the request JSON
        file: String,
        /// Never call the model; use the deterministic scheduler only
        #[arg(long)]
        offline: bool,
    },
}

/// Execute the `coach init` command: write config file.
fn cmd_init(path: &Path, model: Option<String>, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }

    let mut cfg = config::ConfigFile::default();
    if let Some(model) = model {
        cfg.model.name = model;
    }

    config::save_config(path, &cfg)?;

    println!("Config written to {}", path.display());
    println!("  server = {}:{}", cfg.server.bind, cfg.server.port);
    println!("  model.name = {}", cfg.model.name);
    println!();
    println!("Set OPENROUTER_API_KEY to enable model-backed plans.");

    Ok(())
}

/// Build the model generator, if one is configured and allowed.
fn build_generator(
    resolved: &CoachConfig,
    offline: bool,
) -> anyhow::Result<Option<Arc<dyn PlanGenerator>>> {
    if offline {
        tracing::info!("offline mode: model generation disabled");
        return Ok(None);
    }
    let Some(model) = resolved.model.clone() else {
        tracing::info!("OPENROUTER_API_KEY not set; serving deterministic plans only");
        return Ok(None);
    };

    tracing::info!(model = %model.model, base_url = %model.base_url, "model generation enabled");
    let generator =
        OpenRouterGenerator::new(model).context("failed to create model HTTP client")?;
    Ok(Some(Arc::new(generator)))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init { model, force } => {
            let path = cli.config.unwrap_or_else(config::config_path);
            cmd_init(&path, model, force)?;
        }
        Commands::Serve {
            bind,
            port,
            offline,
        } => {
            let resolved = CoachConfig::resolve(cli.config.as_deref(), bind.as_deref(), port)?;
            let generator = build_generator(&resolved, offline)?;
            let state = serve_cmd::AppState { generator };
            serve_cmd::run_serve(state, &resolved.bind, resolved.port).await?;
        }
        Commands::Plan { file, offline } => {
            let resolved = CoachConfig::resolve(cli.config.as_deref(), None, None)?;
            let generator = build_generator(&resolved, offline)?;
            plan_cmd::run_plan(generator.as_deref(), &file).await?;
        }
    }

    Ok(())
}
