//! Sync commands - Drive the daemon's coordinator
//!
//! Each subcommand queues one coordinator event; the outcome shows up in
//! `mirrorsync status` once the backend has answered.

use anyhow::{Context, Result};
use clap::Subcommand;
use tracing::info;

use super::{sync_controller, CliContext};

#[derive(Debug, Subcommand)]
pub enum SyncCommand {
    /// Ask the backend to start mirroring
    Start,
    /// Ask the backend to stop mirroring
    Stop,
    /// Serve reports from the local mirror without contacting the backend
    Offline,
    /// Run a status check now
    Check,
}

impl SyncCommand {
    fn event(&self) -> &'static str {
        match self {
            SyncCommand::Start => "StartSyncing",
            SyncCommand::Stop => "StopSyncing",
            SyncCommand::Offline => "ForceOffline",
            SyncCommand::Check => "CheckStatus",
        }
    }

    pub async fn execute(&self, ctx: &CliContext) -> Result<()> {
        let formatter = ctx.formatter();
        let controller = sync_controller().await?;

        let sent = match self {
            SyncCommand::Start => controller.start_syncing().await,
            SyncCommand::Stop => controller.stop_syncing().await,
            SyncCommand::Offline => controller.force_offline().await,
            SyncCommand::Check => controller.check_status().await,
        };
        sent.with_context(|| format!("{} was rejected by the daemon", self.event()))?;

        info!(event = self.event(), "Command queued");
        if ctx.is_json() {
            formatter.print_json(&serde_json::json!({"queued": self.event()}));
        } else {
            formatter.success(&format!("{} queued", self.event()));
        }
        Ok(())
    }
}
