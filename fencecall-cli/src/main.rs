// ABOUTME: Command-line front end - runs the tool directives found in generated text.
// ABOUTME: Reads a response from a file or stdin and prints it with tool results appended.

use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::Parser;
use tokio::io::AsyncReadExt;
use tracing::info;
use tracing_subscriber::EnvFilter;

use fencecall::prelude::*;

#[derive(Debug, Parser)]
#[command(name = "fencecall", version, about = "Run fenced tool directives from generated text")]
struct Cli {
    /// Config file (defaults to $FENCECALL_CONFIG, then ./fencecall.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory that relative tool paths resolve against
    #[arg(long, default_value = ".")]
    root: PathBuf,

    /// Print the tool catalogue prompt section and exit
    #[arg(long)]
    catalogue: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Generated text to process (reads stdin when omitted)
    file: Option<PathBuf>,
}

/// Treats a file or stdin as the generator's response.
struct InputSource {
    file: Option<PathBuf>,
}

#[async_trait]
impl Generator for InputSource {
    async fn generate(&self, _prompt: &str) -> Result<String> {
        match &self.file {
            Some(path) => tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("failed to read {}", path.display())),
            None => {
                let mut text = String::new();
                tokio::io::stdin()
                    .read_to_string(&mut text)
                    .await
                    .context("failed to read stdin")?;
                Ok(text)
            }
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::discover()?,
    };
    let registry = configured_registry(&config, &cli.root)?;
    info!(tools = registry.len(), root = %cli.root.display(), "registry ready");

    if cli.catalogue {
        print!("{}", registry.prompt_section());
        return Ok(());
    }

    let orchestrator = Orchestrator::from_config(registry, &config);
    let source = InputSource { file: cli.file };
    let processed = orchestrator
        .run_turn(&source, "", orchestrator.turn_timeout())
        .await?;

    let failed = processed.results.iter().filter(|r| !r.is_success()).count();
    info!(
        directives = processed.results.len(),
        failed, "processed response"
    );
    println!("{}", processed.text);
    Ok(())
}
