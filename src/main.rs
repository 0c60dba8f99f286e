//! gb - diagnostic binary for gitbridge
//!
//! A thin CLI that exercises the provider factory and the CLI-backed
//! provider end to end: resolve a provider, run one operation, print the
//! typed result as JSON. The agent-facing transport layer lives elsewhere;
//! this binary exists for wiring checks and local inspection.

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;

use gitbridge::config::BridgeConfig;
use gitbridge::context::{resolve_workdir, OperationContext};
use gitbridge::provider::{Capability, ProviderFactory, ProviderSelection, VcsProvider};
use gitbridge::types::{DiffOptions, LogOptions, StatusOptions};

/// Gitbridge diagnostics - typed git operations, printed as JSON
#[derive(Parser, Debug)]
#[command(name = "gb")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Run against this directory instead of the current one
    #[arg(long, global = true)]
    cwd: Option<PathBuf>,

    /// Explicit config file (otherwise $GITBRIDGE_CONFIG, then defaults)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Working-tree status
    Status,

    /// Diff the working tree against HEAD
    Diff {
        /// Source revision
        #[arg(long)]
        source: Option<String>,

        /// Target revision (requires --source)
        #[arg(long)]
        target: Option<String>,

        /// Compare the index instead of the working tree
        #[arg(long)]
        staged: bool,

        /// Append synthetic diffs for untracked files
        #[arg(long)]
        untracked: bool,
    },

    /// Commit history
    Log {
        /// Maximum number of entries
        #[arg(long, short = 'n', default_value_t = 20)]
        max_count: usize,

        /// Revision or revision range
        #[arg(long)]
        range: Option<String>,
    },

    /// Provider health and declared capabilities
    Health,
}

#[derive(Serialize)]
struct HealthReport {
    provider: String,
    healthy: bool,
    capabilities: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.debug { "gitbridge=debug" } else { "gitbridge=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = BridgeConfig::load(cli.config.as_deref()).context("loading configuration")?;
    let factory = ProviderFactory::new(config);

    let workdir = match &cli.cwd {
        Some(path) => std::fs::canonicalize(path)
            .with_context(|| format!("resolving --cwd {}", path.display()))?,
        None => std::env::current_dir().context("resolving current directory")?,
    };
    let workdir = resolve_workdir(&workdir.display().to_string(), None)
        .context("validating working directory")?;
    let ctx = OperationContext::new(workdir);

    match cli.command {
        Command::Status => {
            let provider = factory.get(ProviderSelection::default()).await?;
            let result = provider.status(StatusOptions::default(), &ctx).await?;
            print_json(&result)
        }
        Command::Diff {
            source,
            target,
            staged,
            untracked,
        } => {
            let provider = factory.get(ProviderSelection::default()).await?;
            let result = provider
                .diff(
                    DiffOptions {
                        source,
                        target,
                        staged,
                        include_untracked: untracked,
                        ..Default::default()
                    },
                    &ctx,
                )
                .await?;
            print_json(&result)
        }
        Command::Log { max_count, range } => {
            let provider = factory.get(ProviderSelection::default()).await?;
            let result = provider
                .log(
                    LogOptions {
                        max_count: Some(max_count),
                        range,
                        ..Default::default()
                    },
                    &ctx,
                )
                .await?;
            print_json(&result)
        }
        Command::Health => {
            // Blame stands in for "a full-featured backend"; requiring it
            // here surfaces capability problems at the gate, not later.
            let provider = factory
                .get(ProviderSelection {
                    required: vec![Capability::Blame],
                    ..Default::default()
                })
                .await?;
            let mut capabilities: Vec<String> = provider
                .capabilities()
                .iter()
                .map(|c| c.name().to_string())
                .collect();
            capabilities.sort();
            let report = HealthReport {
                provider: provider.kind().to_string(),
                healthy: provider.health_check().await,
                capabilities,
            };
            print_json(&report)
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
