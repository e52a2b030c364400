//! mirrorsync Sync - the sync coordinator
//!
//! Provides:
//! - The online/offline/syncing state machine
//! - Snapshot-based state publication
//! - Periodic progress checks
//! - Login/logout handling
//!
//! ## Modules
//!
//! - [`coordinator`] - State machine, event handle and backend task lanes
//! - [`store`] - Single-writer state cell with watch-based readers
//! - [`poller`] - One-shot progress query and the periodic status-check timer
//! - [`session`] - Authentication lifecycle bridge
//! - [`status`] - Status sink adapters
//! - [`debounce`] - Settle window and fire gate used by backend tasks

pub mod coordinator;
pub mod debounce;
pub mod poller;
pub mod session;
pub mod status;
pub mod store;

use thiserror::Error;

pub use coordinator::{CoordinatorHandle, CoordinatorSettings, SyncCoordinator, SyncEvent};
pub use store::{SyncStateReader, SyncStateStore};

/// Errors surfaced by the coordinator handle
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// The coordinator task has exited and no longer accepts events
    #[error("Sync coordinator is not running")]
    CoordinatorStopped,
}
