//! mirrorsync IPC - D-Bus communication library
//!
//! Exposes a running sync coordinator on the session bus and provides the
//! proxies clients use to reach it.
//!
//! # Interfaces
//! - `io.mirrorsync.SyncController` - Coordinator commands, state and notices
//! - `io.mirrorsync.Session` - Authentication lifecycle triggers

pub mod client;
pub mod service;
pub mod types;

pub use client::{SessionProxy, SyncControllerProxy};
pub use service::{DbusService, SessionInterface, SyncControllerInterface};
pub use types::StateSnapshot;

/// D-Bus well-known name of the daemon
pub const DBUS_NAME: &str = "io.mirrorsync.Daemon";

/// D-Bus object path every interface is served at
pub const DBUS_PATH: &str = "/io/mirrorsync/Daemon";
