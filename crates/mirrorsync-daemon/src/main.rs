//! mirrorsync Daemon - Background sync coordinator
//!
//! This binary runs as a user service and handles:
//! - The sync coordinator and its periodic status check
//! - Re-applying persisted sync preferences after login
//! - D-Bus interfaces for UI clients and the CLI
//! - Graceful shutdown on SIGTERM/SIGINT
//!
//! # Architecture
//!
//! Every long-lived piece runs as its own task sharing one
//! `CancellationToken`, which is triggered on receipt of SIGTERM or SIGINT.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use mirrorsync_cache::{DatabasePool, SqlitePreferenceRepository};
use mirrorsync_core::config::Config;
use mirrorsync_ipc::service::{forward_signals, DbusService};
use mirrorsync_ipc::DBUS_NAME;
use mirrorsync_rpc::{RpcClient, RpcMirrorBackend};
use mirrorsync_sync::poller::run_status_timer;
use mirrorsync_sync::session::SessionBridge;
use mirrorsync_sync::status::{ChannelStatusSink, FanoutStatusSink, TracingStatusSink};
use mirrorsync_sync::{CoordinatorSettings, SyncCoordinator};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

// ============================================================================
// Configuration
// ============================================================================

/// Reads the configuration file, or defaults when none exists
///
/// A file that exists but does not parse or validate is an error.
fn load_config(path: &Path) -> Result<Config> {
    let config = if path.exists() {
        Config::load(path)?
    } else {
        Config::default()
    };

    let errors = config.validate();
    if !errors.is_empty() {
        let listed: Vec<String> = errors.iter().map(ToString::to_string).collect();
        anyhow::bail!(
            "Invalid configuration in {}: {}",
            path.display(),
            listed.join("; ")
        );
    }
    Ok(config)
}

// ============================================================================
// DaemonService
// ============================================================================

/// Owns the configuration and preference database for one daemon run
struct DaemonService {
    config: Config,
    db_pool: DatabasePool,
    preferences: Arc<SqlitePreferenceRepository>,
    shutdown: CancellationToken,
}

impl DaemonService {
    /// Opens the preference database named in `config`
    async fn new(config: Config, shutdown: CancellationToken) -> Result<Self> {
        let db_pool = DatabasePool::new(&config.storage.database)
            .await
            .context("Failed to open preference database")?;
        let preferences = Arc::new(SqlitePreferenceRepository::new(db_pool.pool().clone()));

        Ok(Self {
            config,
            db_pool,
            preferences,
            shutdown,
        })
    }

    /// Wires the coordinator, bridge, timer and D-Bus service, then waits
    /// for shutdown
    async fn run(&self) -> Result<()> {
        let client = RpcClient::from_config(&self.config.backend)
            .context("Failed to configure backend client")?;
        info!(endpoint = client.endpoint(), "Backend client ready");
        let backend = Arc::new(RpcMirrorBackend::new(client));

        let (channel_sink, notices) = ChannelStatusSink::new();
        let status = Arc::new(
            FanoutStatusSink::new()
                .with(Arc::new(TracingStatusSink))
                .with(Arc::new(channel_sink)),
        );

        let settings = CoordinatorSettings::from(&self.config.sync);
        let (coordinator, handle) = SyncCoordinator::new(backend, status, settings);
        let coordinator = coordinator.with_preferences(self.preferences.clone());

        let (bridge, auth) = SessionBridge::new(handle.clone(), self.config.sync.event_queue_capacity);

        let dbus_service = DbusService::new(handle.clone(), auth);
        let connection = match dbus_service.start().await {
            Ok(conn) => {
                info!(name = DBUS_NAME, "D-Bus service started");
                conn
            }
            Err(e) => {
                let err_str = format!("{e:#}");
                if err_str.contains("already taken")
                    || err_str.contains("already owned")
                    || err_str.contains("NameTaken")
                {
                    anyhow::bail!(
                        "Another instance of mirrorsyncd is already running (D-Bus name {} is taken)",
                        DBUS_NAME
                    );
                }
                return Err(e).context("Failed to start D-Bus service");
            }
        };

        let coordinator_task = tokio::spawn(coordinator.run(self.shutdown.clone()));
        let bridge_task = tokio::spawn(bridge.run(self.shutdown.clone()));
        let timer_task = tokio::spawn(run_status_timer(
            handle.clone(),
            self.config.sync.status_check_interval(),
            self.shutdown.clone(),
        ));
        let signals_task = tokio::spawn(forward_signals(
            connection.clone(),
            handle.subscribe(),
            notices,
            self.shutdown.clone(),
        ));

        info!(
            interval_secs = self.config.sync.status_check_interval_secs,
            "mirrorsyncd running"
        );

        self.shutdown.cancelled().await;
        info!("Shutting down");

        for (name, task) in [
            ("coordinator", coordinator_task),
            ("session bridge", bridge_task),
            ("status timer", timer_task),
        ] {
            if let Err(e) = task.await {
                warn!(task = name, error = %e, "Task ended abnormally");
            }
        }
        match signals_task.await {
            Ok(Err(e)) => warn!(error = %e, "Signal forwarding failed"),
            Err(e) => warn!(task = "signal forwarding", error = %e, "Task ended abnormally"),
            Ok(Ok(())) => {}
        }

        drop(connection);
        self.db_pool.close().await;
        Ok(())
    }
}

// ============================================================================
// Graceful shutdown signal handler
// ============================================================================

/// Waits for SIGTERM or SIGINT and triggers the cancellation token
async fn shutdown_signal(token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received SIGINT (Ctrl+C)");
        }
        _ = terminate => {
            info!("Received SIGTERM");
        }
    }

    token.cancel();
}

// ============================================================================
// Main entry point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let config_path = Config::default_path();
    let config = load_config(&config_path)?;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .init();

    info!(config_path = %config_path.display(), "mirrorsync daemon starting (mirrorsyncd)");

    let shutdown_token = CancellationToken::new();

    let signal_token = shutdown_token.clone();
    tokio::spawn(async move {
        shutdown_signal(signal_token).await;
    });

    let service = DaemonService::new(config, shutdown_token.clone()).await?;

    let result = service.run().await;

    match &result {
        Ok(()) => info!("mirrorsync daemon shut down gracefully"),
        Err(e) => error!(error = %e, "mirrorsync daemon exiting with error"),
    }

    result
}

// ============================================================================
// Tests
// ============================================================================
