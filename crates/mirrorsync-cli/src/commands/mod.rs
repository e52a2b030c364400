//! CLI subcommands and the context they share

pub mod completions;
pub mod config;
pub mod prefs;
pub mod progress;
pub mod session;
pub mod status;
pub mod sync;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use mirrorsync_core::config::Config;
use mirrorsync_ipc::{SessionProxy, SyncControllerProxy};

use crate::output::{get_formatter, OutputFormat, OutputFormatter};

/// Global options every command receives
#[derive(Debug, Clone)]
pub struct CliContext {
    pub format: OutputFormat,
    config_path: PathBuf,
}

impl CliContext {
    /// `config_path` overrides the default configuration location
    pub fn new(format: OutputFormat, config_path: Option<PathBuf>) -> Self {
        Self {
            format,
            config_path: config_path.unwrap_or_else(Config::default_path),
        }
    }

    pub fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    pub fn formatter(&self) -> Box<dyn OutputFormatter> {
        get_formatter(self.is_json())
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Configuration file contents, or defaults when it cannot be read
    pub fn load_config(&self) -> Config {
        Config::load_or_default(&self.config_path)
    }
}

const DAEMON_HINT: &str = "Is mirrorsyncd running?";

/// Proxy to the daemon's sync controller on the session bus
pub async fn sync_controller() -> Result<SyncControllerProxy<'static>> {
    let connection = zbus::Connection::session()
        .await
        .context("Failed to connect to the D-Bus session bus")?;
    SyncControllerProxy::new(&connection)
        .await
        .context(DAEMON_HINT)
}

/// Proxy to the daemon's session interface on the session bus
pub async fn session() -> Result<SessionProxy<'static>> {
    let connection = zbus::Connection::session()
        .await
        .context("Failed to connect to the D-Bus session bus")?;
    SessionProxy::new(&connection).await.context(DAEMON_HINT)
}
