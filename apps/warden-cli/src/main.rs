//! # warden-cli
//!
//! Command-line front end for the warden governance engine:
//! - `warden simulate` — walk the budget through every enforcement level
//! - `warden replay --actions file.jsonl` — propose a recorded action sequence
//! - `warden explain --action '<json>'` — show how the laws judge one action
//! - `warden audit verify/tail` — inspect the hash-chained audit log

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use warden_orchestrator::{GovernanceConfig, CONFIG_FILE_NAME};

/// warden — deterministic governance for autonomous agent actions.
#[derive(Parser)]
#[command(name = "warden", version, about)]
struct Cli {
    /// Configuration file (defaults to ./warden.toml; built-in defaults if absent).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the budget-threshold scenario against a fresh engine.
    Simulate {
        /// Task ceiling to simulate with (overrides the config).
        #[arg(long)]
        ceiling: Option<u64>,
    },
    /// Propose every action in a JSONL file, one action per line.
    Replay {
        /// JSONL file of actions (`{"kind": "research", ...}`).
        #[arg(long)]
        actions: PathBuf,
        /// Agent id to propose as (defaults to the configured agent).
        #[arg(long)]
        agent: Option<String>,
        /// Use a fixed clock and sequential ids so reruns hash identically.
        #[arg(long)]
        deterministic: bool,
        /// Print each result as a JSON line instead of text.
        #[arg(long)]
        json: bool,
    },
    /// Evaluate the laws against one action without applying it.
    Explain {
        /// The action as JSON.
        #[arg(long)]
        action: String,
        /// Spend to evaluate against (defaults to the configured initial spend).
        #[arg(long)]
        spend: Option<u64>,
    },
    /// Inspect the audit trail.
    Audit {
        #[command(subcommand)]
        command: commands::audit::AuditCommands,
    },
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so command output on stdout stays clean.
    let filter = EnvFilter::from_default_env().add_directive("warden=info".parse()?);
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => GovernanceConfig::load(path)?,
        None => GovernanceConfig::load_or_default(&PathBuf::from(CONFIG_FILE_NAME)),
    };

    match &cli.command {
        Commands::Simulate { ceiling } => commands::simulate::execute(&config, *ceiling),
        Commands::Replay {
            actions,
            agent,
            deterministic,
            json,
        } => commands::replay::execute(&config, actions, agent.as_deref(), *deterministic, *json),
        Commands::Explain { action, spend } => commands::explain::execute(&config, action, *spend),
        Commands::Audit { command } => commands::audit::execute(command, &config),
    }
}
