//! Progress command - Query the backend's mirroring progress directly
//!
//! Bypasses the daemon and calls `getSyncProgress` once, showing how the
//! coordinator would classify the answer.

use anyhow::{Context, Result};
use clap::Args;
use mirrorsync_core::domain::{MirrorReply, ProgressReply};
use mirrorsync_core::ports::IMirrorBackend;
use mirrorsync_rpc::{RpcClient, RpcMirrorBackend};
use serde_json::{json, Value};
use tracing::info;

use super::CliContext;

#[derive(Debug, Args)]
pub struct ProgressCommand {
    /// Override the backend URL from the configuration
    #[arg(long)]
    pub url: Option<String>,
}

impl ProgressCommand {
    pub async fn execute(&self, ctx: &CliContext) -> Result<()> {
        let formatter = ctx.formatter();
        let mut config = ctx.load_config();
        if let Some(url) = &self.url {
            config.backend.url = url.clone();
        }

        let client =
            RpcClient::from_config(&config.backend).context("Invalid backend configuration")?;
        info!(endpoint = client.endpoint(), "Querying mirroring progress");
        let reply = RpcMirrorBackend::new(client).query_mirror_progress().await;

        if ctx.is_json() {
            formatter.print_json(&reply_json(&reply));
            return Ok(());
        }

        if let Some(error) = &reply.error {
            formatter.error(error);
        }
        match &reply.result {
            Some(ProgressReply::Percent(p)) => formatter.success(&format!("Mirroring at {}", p)),
            Some(ProgressReply::Coerced(raw)) => {
                formatter.warn(&format!("Malformed progress {}, read as 0%", raw))
            }
            Some(ProgressReply::Idle(_)) => formatter.success("Backend is idle"),
            Some(ProgressReply::NotStarted) => formatter.warn("Mirroring has not started yet"),
            Some(ProgressReply::ServerUnavailable(text)) => {
                formatter.warn(&format!("Mirror server unavailable: {}", text))
            }
            Some(ProgressReply::Fault(text)) => {
                formatter.error(&format!("Unrecognized reply: {}", text))
            }
            None if reply.error.is_none() => formatter.info("Backend returned no result"),
            None => {}
        }
        Ok(())
    }
}

fn reply_json(reply: &MirrorReply<ProgressReply>) -> Value {
    json!({
        "kind": reply.result.as_ref().map(ProgressReply::kind),
        "percent": reply.result.as_ref().and_then(ProgressReply::percent).map(|p| p.value()),
        "transient": reply.result.as_ref().map(ProgressReply::is_transient),
        "error": reply.error,
    })
}
