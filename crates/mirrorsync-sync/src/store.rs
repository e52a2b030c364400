//! Sync state store
//!
//! Single-writer, many-reader cell for [`SyncState`]. The coordinator owns the
//! [`SyncStateStore`]; everyone else holds a [`SyncStateReader`] and only ever
//! sees committed snapshots.

use tokio::sync::watch;
use tracing::{debug, info};

use mirrorsync_core::domain::SyncState;

/// Write side of the state cell, owned by the coordinator task
#[derive(Debug)]
pub struct SyncStateStore {
    tx: watch::Sender<SyncState>,
}

impl SyncStateStore {
    /// Creates a store holding the default `{Online, 0}` state
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(SyncState::default());
        Self { tx }
    }

    /// Current committed value
    pub fn get(&self) -> SyncState {
        *self.tx.borrow()
    }

    /// Replaces the state, notifying readers only on an actual change
    ///
    /// Returns true when the state changed.
    pub fn commit(&self, next: SyncState) -> bool {
        let mut previous = next;
        let changed = self.tx.send_if_modified(|current| {
            if *current == next {
                return false;
            }
            previous = *current;
            *current = next;
            true
        });

        if changed {
            if previous.mode != next.mode {
                info!(from = %previous.mode, to = %next.mode, progress = next.progress.value(), "Sync mode changed");
            } else {
                debug!(mode = %next.mode, progress = next.progress.value(), "Sync progress updated");
            }
        }
        changed
    }

    /// Creates a reader observing this store
    pub fn reader(&self) -> SyncStateReader {
        SyncStateReader {
            rx: self.tx.subscribe(),
        }
    }
}

impl Default for SyncStateStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Read side of the state cell
///
/// Cloning is cheap; every clone tracks changes independently.
#[derive(Debug, Clone)]
pub struct SyncStateReader {
    rx: watch::Receiver<SyncState>,
}

impl SyncStateReader {
    /// Latest committed snapshot; never blocks
    pub fn snapshot(&self) -> SyncState {
        *self.rx.borrow()
    }

    /// Waits for the next committed change and returns it
    ///
    /// Returns `None` once the coordinator has gone away.
    pub async fn changed(&mut self) -> Option<SyncState> {
        self.rx.changed().await.ok()?;
        Some(*self.rx.borrow_and_update())
    }

    /// Waits until the state satisfies `predicate`
    ///
    /// Returns `None` if the coordinator goes away first.
    pub async fn wait_for(&mut self, predicate: impl FnMut(&SyncState) -> bool) -> Option<SyncState> {
        self.rx.wait_for(predicate).await.ok().map(|state| *state)
    }
}
