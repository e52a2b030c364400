//! Payloads exchanged as JSON strings over D-Bus

use serde::{Deserialize, Serialize};

use mirrorsync_core::domain::{DataSource, SyncMode, SyncState};

/// Reply of `GetState`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub mode: SyncMode,
    pub progress: u8,
    pub synced: bool,
    pub data_source: DataSource,
}

impl From<SyncState> for StateSnapshot {
    fn from(state: SyncState) -> Self {
        Self {
            mode: state.mode,
            progress: state.progress.value(),
            synced: state.is_synced(),
            data_source: state.data_source(),
        }
    }
}
