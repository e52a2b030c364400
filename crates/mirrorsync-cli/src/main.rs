//! mirrorsync CLI - Command-line interface for mirrorsync
//!
//! Provides commands for:
//! - Viewing and driving the daemon's sync coordinator
//! - Triggering login and logout
//! - Querying the backend's mirroring progress directly
//! - Editing persisted sync preferences
//! - Managing configuration

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod output;

use commands::{
    completions::CompletionsCommand, config::ConfigCommand, prefs::PrefsCommand,
    progress::ProgressCommand, session::SessionCommand, status::StatusCommand,
    sync::SyncCommand, CliContext,
};
use output::OutputFormat;

#[derive(Debug, Parser)]
#[command(name = "mirrorsync", version, about = "Control the mirrorsync daemon")]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Verbose output (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Use alternate config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show the daemon's sync state
    Status(StatusCommand),
    /// Drive the sync coordinator
    #[command(subcommand)]
    Sync(SyncCommand),
    /// Signal login or logout to the daemon
    #[command(subcommand)]
    Session(SessionCommand),
    /// Ask the backend for its mirroring progress
    Progress(ProgressCommand),
    /// View and edit sync preferences
    #[command(subcommand)]
    Prefs(PrefsCommand),
    /// View and manage configuration
    #[command(subcommand)]
    Config(ConfigCommand),
    /// Generate shell completions
    Completions(CompletionsCommand),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Human
    };
    let ctx = CliContext::new(format, cli.config);

    match cli.command {
        Commands::Status(cmd) => cmd.execute(&ctx).await,
        Commands::Sync(cmd) => cmd.execute(&ctx).await,
        Commands::Session(cmd) => cmd.execute(&ctx).await,
        Commands::Progress(cmd) => cmd.execute(&ctx).await,
        Commands::Prefs(cmd) => cmd.execute(&ctx).await,
        Commands::Config(cmd) => cmd.execute(&ctx).await,
        Commands::Completions(cmd) => cmd.execute(&ctx).await,
    }
}
