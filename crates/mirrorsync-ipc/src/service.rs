//! D-Bus service implementation for mirrorsync
//!
//! Provides the D-Bus interfaces that UI clients and CLI tools use to
//! drive the running coordinator:
//!
//! - `io.mirrorsync.SyncController` - Coordinator commands and state
//! - `io.mirrorsync.Session` - Login and logout triggers
//!
//! State changes and status notices are re-emitted as signals by
//! [`forward_signals`].

use mirrorsync_core::domain::StatusNotice;
use mirrorsync_sync::session::AuthEvent;
use mirrorsync_sync::{CoordinatorHandle, SyncEvent, SyncStateReader};
use serde_json::Value;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use zbus::fdo;

use crate::types::StateSnapshot;
use crate::{DBUS_NAME, DBUS_PATH};

// ============================================================================
// SyncController interface
// ============================================================================

/// D-Bus interface relaying commands to the coordinator
pub struct SyncControllerInterface {
    coordinator: CoordinatorHandle,
}

impl SyncControllerInterface {
    pub fn new(coordinator: CoordinatorHandle) -> Self {
        Self { coordinator }
    }

    async fn dispatch(&self, event: SyncEvent) -> fdo::Result<()> {
        let name = event.name();
        debug!(event = name, "D-Bus command received");
        self.coordinator
            .send(event)
            .await
            .map_err(|e| fdo::Error::Failed(e.to_string()))
    }
}

#[zbus::interface(name = "io.mirrorsync.SyncController")]
impl SyncControllerInterface {
    async fn start_syncing(&self) -> fdo::Result<()> {
        self.dispatch(SyncEvent::StartSyncing).await
    }

    async fn stop_syncing(&self) -> fdo::Result<()> {
        self.dispatch(SyncEvent::StopSyncing).await
    }

    async fn force_offline(&self) -> fdo::Result<()> {
        self.dispatch(SyncEvent::ForceOffline).await
    }

    /// Pushes a progress value reported outside the poller
    ///
    /// `value_json` must be valid JSON; anything that is not an integral
    /// percentage is treated as 0 by the coordinator.
    async fn progress_update(&self, value_json: String) -> fdo::Result<()> {
        let value: Value = serde_json::from_str(&value_json)
            .map_err(|e| fdo::Error::InvalidArgs(format!("value_json: {}", e)))?;
        self.dispatch(SyncEvent::ProgressUpdate(value)).await
    }

    async fn requests_redirect(&self, active: bool) -> fdo::Result<()> {
        self.dispatch(SyncEvent::RequestsRedirect(active)).await
    }

    /// Runs a status check now, outside the periodic timer
    async fn check_status(&self) -> fdo::Result<()> {
        self.dispatch(SyncEvent::PeriodicStatusCheck).await
    }

    /// Returns the committed state as a JSON [`StateSnapshot`]
    async fn get_state(&self) -> fdo::Result<String> {
        let snapshot = StateSnapshot::from(self.coordinator.state());
        serde_json::to_string(&snapshot).map_err(|e| fdo::Error::Failed(e.to_string()))
    }

    /// Emitted after every committed state change
    #[zbus(signal)]
    async fn state_changed(
        signal_ctxt: &zbus::SignalContext<'_>,
        mode: &str,
        progress: u8,
    ) -> zbus::Result<()>;

    /// Emitted for every status notice, JSON-encoded
    #[zbus(signal)]
    async fn status_reported(
        signal_ctxt: &zbus::SignalContext<'_>,
        notice_json: &str,
    ) -> zbus::Result<()>;
}

// ============================================================================
// Session interface
// ============================================================================

/// D-Bus interface feeding the session lifecycle bridge
pub struct SessionInterface {
    auth: mpsc::Sender<AuthEvent>,
}

impl SessionInterface {
    pub fn new(auth: mpsc::Sender<AuthEvent>) -> Self {
        Self { auth }
    }

    async fn forward(&self, event: AuthEvent) -> fdo::Result<()> {
        info!(event = ?event, "Session event received over D-Bus");
        self.auth
            .send(event)
            .await
            .map_err(|_| fdo::Error::Failed("Session bridge is not running".to_string()))
    }
}

#[zbus::interface(name = "io.mirrorsync.Session")]
impl SessionInterface {
    async fn login(&self) -> fdo::Result<()> {
        self.forward(AuthEvent::LoginSuccess).await
    }

    async fn logout(&self) -> fdo::Result<()> {
        self.forward(AuthEvent::Logout).await
    }
}

// ============================================================================
// DbusService
// ============================================================================

/// Owns the session-bus registration of both interfaces
///
/// Requests the well-known name `io.mirrorsync.Daemon` and serves the
/// interfaces at `/io/mirrorsync/Daemon`.
pub struct DbusService {
    coordinator: CoordinatorHandle,
    auth: mpsc::Sender<AuthEvent>,
}

impl DbusService {
    pub fn new(coordinator: CoordinatorHandle, auth: mpsc::Sender<AuthEvent>) -> Self {
        Self { coordinator, auth }
    }

    /// Starts the D-Bus service on the session bus
    ///
    /// The returned connection must be kept alive for the service to stay
    /// registered.
    ///
    /// # Errors
    /// Returns an error if the session bus is not available, the name is
    /// already owned, or interface registration fails.
    pub async fn start(&self) -> anyhow::Result<zbus::Connection> {
        info!("Starting D-Bus service on session bus");

        let controller = SyncControllerInterface::new(self.coordinator.clone());
        let session = SessionInterface::new(self.auth.clone());

        let connection = zbus::connection::Builder::session()?
            .name(DBUS_NAME)?
            .serve_at(DBUS_PATH, controller)?
            .serve_at(DBUS_PATH, session)?
            .build()
            .await?;

        info!(name = DBUS_NAME, path = DBUS_PATH, "D-Bus service started");

        Ok(connection)
    }

    /// Returns `false` when another process already owns the daemon name
    pub async fn try_acquire_name() -> anyhow::Result<bool> {
        let connection = zbus::Connection::session().await?;
        let dbus_proxy = fdo::DBusProxy::new(&connection).await?;

        match dbus_proxy.get_name_owner(DBUS_NAME.try_into()?).await {
            Ok(_owner) => Ok(false),
            Err(_) => Ok(true),
        }
    }
}

/// Re-emits state changes and status notices as signals until shutdown
///
/// Ends early when the coordinator's state store goes away.
pub async fn forward_signals(
    connection: zbus::Connection,
    mut state: SyncStateReader,
    mut notices: mpsc::UnboundedReceiver<StatusNotice>,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    let ctxt = zbus::SignalContext::new(&connection, DBUS_PATH)?;

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            changed = state.changed() => {
                let Some(current) = changed else {
                    debug!("State store closed, signal forwarding ends");
                    break;
                };
                if let Err(e) = SyncControllerInterface::state_changed(
                    &ctxt,
                    current.mode.as_str(),
                    current.progress.value(),
                )
                .await
                {
                    warn!(error = %e, "Failed to emit StateChanged");
                }
            }
            Some(notice) = notices.recv() => {
                match serde_json::to_string(&notice) {
                    Ok(json) => {
                        if let Err(e) = SyncControllerInterface::status_reported(&ctxt, &json).await {
                            warn!(error = %e, "Failed to emit StatusReported");
                        }
                    }
                    Err(e) => warn!(error = %e, id = %notice.id, "Could not encode notice"),
                }
            }
        }
    }

    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
