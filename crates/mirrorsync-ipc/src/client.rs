//! Client-side proxies for the daemon's D-Bus interfaces
//!
//! ```rust,no_run
//! use mirrorsync_ipc::{StateSnapshot, SyncControllerProxy};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let connection = zbus::Connection::session().await?;
//! let controller = SyncControllerProxy::new(&connection).await?;
//! controller.start_syncing().await?;
//! let state: StateSnapshot = serde_json::from_str(&controller.get_state().await?)?;
//! println!("{:?}", state.mode);
//! # Ok(())
//! # }
//! ```

/// Proxy for `io.mirrorsync.SyncController`
#[zbus::proxy(
    interface = "io.mirrorsync.SyncController",
    default_service = "io.mirrorsync.Daemon",
    default_path = "/io/mirrorsync/Daemon"
)]
pub trait SyncController {
    async fn start_syncing(&self) -> zbus::Result<()>;

    async fn stop_syncing(&self) -> zbus::Result<()>;

    async fn force_offline(&self) -> zbus::Result<()>;

    /// `value_json` is any JSON value; non-percent values count as 0
    async fn progress_update(&self, value_json: &str) -> zbus::Result<()>;

    async fn requests_redirect(&self, active: bool) -> zbus::Result<()>;

    async fn check_status(&self) -> zbus::Result<()>;

    /// JSON-encoded [`StateSnapshot`](crate::StateSnapshot)
    async fn get_state(&self) -> zbus::Result<String>;

    #[zbus(signal)]
    fn state_changed(&self, mode: &str, progress: u8) -> zbus::Result<()>;

    #[zbus(signal)]
    fn status_reported(&self, notice_json: &str) -> zbus::Result<()>;
}

/// Proxy for `io.mirrorsync.Session`
#[zbus::proxy(
    interface = "io.mirrorsync.Session",
    default_service = "io.mirrorsync.Daemon",
    default_path = "/io/mirrorsync/Daemon"
)]
pub trait Session {
    async fn login(&self) -> zbus::Result<()>;

    async fn logout(&self) -> zbus::Result<()>;
}
