//! Status command - Display the daemon's sync state
//!
//! Reads the committed state over D-Bus and shows where report queries
//! are currently routed.

use anyhow::{Context, Result};
use clap::Args;
use mirrorsync_core::domain::{DataSource, SyncMode};
use mirrorsync_ipc::StateSnapshot;
use tracing::info;

use super::{sync_controller, CliContext};
use crate::output::OutputFormatter;

#[derive(Debug, Args)]
pub struct StatusCommand {}

impl StatusCommand {
    pub async fn execute(&self, ctx: &CliContext) -> Result<()> {
        let formatter = ctx.formatter();

        let controller = match sync_controller().await {
            Ok(c) => c,
            Err(e) => {
                formatter.error(&format!("{e:#}"));
                return Ok(());
            }
        };
        let raw = match controller.get_state().await {
            Ok(raw) => raw,
            Err(e) => {
                formatter.error(&format!("Daemon not reachable: {}", e));
                return Ok(());
            }
        };
        let snapshot: StateSnapshot =
            serde_json::from_str(&raw).context("Daemon returned an unreadable state")?;
        info!(mode = %snapshot.mode, progress = snapshot.progress, "Fetched daemon state");

        if ctx.is_json() {
            formatter.print_json(&serde_json::to_value(snapshot)?);
        } else {
            print_human(&snapshot, &*formatter);
        }
        Ok(())
    }
}

fn print_human(snapshot: &StateSnapshot, formatter: &dyn OutputFormatter) {
    formatter.success("mirrorsyncd is running");
    formatter.field("Mode", snapshot.mode.as_str());
    formatter.field("Progress", &format!("{}%", snapshot.progress));
    formatter.field("Reports served from", source_label(snapshot.data_source));
    if let Some(hint) = mode_hint(snapshot) {
        formatter.info(hint);
    }
}

fn source_label(source: DataSource) -> &'static str {
    match source {
        DataSource::Live => "live feed",
        DataSource::Mirror => "local mirror",
    }
}

fn mode_hint(snapshot: &StateSnapshot) -> Option<&'static str> {
    match snapshot.mode {
        SyncMode::Online => Some("Run 'mirrorsync sync start' to begin mirroring."),
        SyncMode::Syncing => Some("Mirroring in progress."),
        SyncMode::Offline if !snapshot.synced => {
            Some("Mirror incomplete; reports still use the live feed.")
        }
        SyncMode::Offline => None,
    }
}

#[cfg(test)]
mod tests {
    use mirrorsync_core::domain::SyncState;

    use super::*;

    #[test]
    fn test_offline_complete_has_no_hint() {
        let snapshot = StateSnapshot::from(SyncState::offline());
        assert_eq!(mode_hint(&snapshot), None);
        assert_eq!(source_label(snapshot.data_source), "local mirror");
    }

    #[test]
    fn test_online_suggests_start() {
        let snapshot = StateSnapshot::from(SyncState::default());
        assert!(mode_hint(&snapshot).unwrap().contains("sync start"));
    }
}
