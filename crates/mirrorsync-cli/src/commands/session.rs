//! Session commands - Signal login and logout to the daemon
//!
//! Login makes the daemon resume a running mirror or start a new one and
//! re-apply stored preferences. Logout signs out of the backend and resets
//! the coordinator.

use anyhow::{Context, Result};
use clap::Subcommand;
use tracing::info;

use super::{session, CliContext};

#[derive(Debug, Subcommand)]
pub enum SessionCommand {
    /// Report a successful login
    Login,
    /// Report a logout
    Logout,
}

impl SessionCommand {
    pub async fn execute(&self, ctx: &CliContext) -> Result<()> {
        let fmt = ctx.formatter();
        let proxy = session().await?;

        match self {
            SessionCommand::Login => {
                proxy.login().await.context("Login signal rejected")?;
                info!("Login forwarded to daemon");
                fmt.success("Login signalled");
            }
            SessionCommand::Logout => {
                proxy.logout().await.context("Logout signal rejected")?;
                info!("Logout forwarded to daemon");
                fmt.success("Logout signalled");
            }
        }
        Ok(())
    }
}
