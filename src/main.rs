mod build;
mod config;
mod hooks;
mod transform;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use build::{BuildOutcome, BuildRunner, Metafile};
use config::Config;
use hooks::{HookContext, HookManager, ObfuscateHook};
use transform::CommandTransformer;

#[derive(Parser)]
#[command(name = "shroud")]
#[command(about = "Post-build obfuscation hook for JavaScript bundle outputs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the configured build, then obfuscate its .js outputs
    Run {
        /// Path to the project directory (default: current directory)
        #[arg(short, long, default_value = ".")]
        path: PathBuf,
    },
    /// Obfuscate the outputs of an already-finished build from its metafile
    Apply {
        /// Path to the metafile the build wrote
        #[arg(short, long)]
        metafile: PathBuf,
        /// Directory output paths are resolved against (default: current directory)
        #[arg(long, default_value = ".")]
        cwd: PathBuf,
        /// JSON file with obfuscator options, overriding the configured ones
        #[arg(long)]
        options: Option<PathBuf>,
    },
    /// Configure shroud
    Config {
        /// Show current configuration
        #[arg(short, long)]
        show: bool,
        /// Set the obfuscator program
        #[arg(long)]
        program: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shroud=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { path } => {
            run_build(path).await?;
        }
        Commands::Apply {
            metafile,
            cwd,
            options,
        } => {
            run_apply(metafile, cwd, options).await?;
        }
        Commands::Config { show, program } => {
            handle_config(show, program)?;
        }
    }

    Ok(())
}

/// Build the project with the configured bundler, then run the post-build hooks
async fn run_build(path: PathBuf) -> Result<()> {
    let config = Config::load()?;
    let working_dir = path
        .canonicalize()
        .with_context(|| format!("Project directory not found: {}", path.display()))?;

    let runner = BuildRunner::new(config.build.clone(), &working_dir);
    let outcome = runner.run().await?;

    dispatch_hooks(&config, &outcome, &working_dir).await?;

    if outcome.failed() {
        for error in &outcome.errors {
            eprintln!("error: {}", error.text);
        }
        anyhow::bail!("Build failed with {} error(s)", outcome.errors.len());
    }

    tracing::info!("Build complete");
    Ok(())
}

/// Run the obfuscation pass over an existing metafile, skipping the build
async fn run_apply(metafile: PathBuf, cwd: PathBuf, options: Option<PathBuf>) -> Result<()> {
    let mut config = Config::load()?;

    if let Some(options_path) = options {
        let content = std::fs::read_to_string(&options_path).with_context(|| {
            format!("Failed to read options file {}", options_path.display())
        })?;
        config.obfuscator.options =
            serde_json::from_str(&content).context("Failed to parse options JSON")?;
    }

    let working_dir = cwd
        .canonicalize()
        .with_context(|| format!("Directory not found: {}", cwd.display()))?;

    let outcome = BuildOutcome::success(Metafile::load(&metafile)?);
    dispatch_hooks(&config, &outcome, &working_dir).await?;

    tracing::info!("Obfuscation pass complete");
    Ok(())
}

async fn dispatch_hooks(
    config: &Config,
    outcome: &BuildOutcome,
    working_dir: &std::path::Path,
) -> Result<()> {
    let manager = HookManager::new();
    let transformer = Arc::new(CommandTransformer::new(config.obfuscator.program.clone()));
    manager
        .register(Arc::new(ObfuscateHook::new(
            transformer,
            config.obfuscator.options.clone(),
        )))
        .await;

    let ctx = HookContext::new(working_dir);
    manager.run_build_end(outcome, &ctx).await
}

fn handle_config(show: bool, program: Option<String>) -> Result<()> {
    let mut config = Config::load()?;
    let mut changed = false;

    if let Some(program) = program {
        config.obfuscator.program = program;
        changed = true;
    }

    if changed {
        config.save()?;
        println!("Configuration saved to {}", Config::config_path()?.display());
    }

    if show || !changed {
        println!("{}", toml::to_string_pretty(&config)?);
    }

    Ok(())
}
