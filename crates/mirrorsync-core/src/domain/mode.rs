//! Sync mode, progress and the aggregate sync state
//!
//! [`SyncState`] is the only externally visible truth about data-source
//! routing. It is owned by the coordinator and handed to every other
//! component as an immutable snapshot.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::errors::DomainError;

// ============================================================================
// SyncMode
// ============================================================================

/// Where the application's data view is currently served from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncMode {
    /// Queries go to the live remote feed
    #[default]
    Online,
    /// Queries go to the fully mirrored local store
    Offline,
    /// Mirroring is running; queries still go to the live feed
    Syncing,
}

impl SyncMode {
    /// Stable lowercase name, as used on the wire and in logs
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncMode::Online => "online",
            SyncMode::Offline => "offline",
            SyncMode::Syncing => "syncing",
        }
    }
}

impl fmt::Display for SyncMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SyncMode {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "online" => Ok(SyncMode::Online),
            "offline" => Ok(SyncMode::Offline),
            "syncing" => Ok(SyncMode::Syncing),
            other => Err(DomainError::InvalidMode(other.to_string())),
        }
    }
}

// ============================================================================
// SyncProgress
// ============================================================================

/// Completion percentage of a mirroring run, always within `0..=100`
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub struct SyncProgress(u8);

impl SyncProgress {
    /// Nothing mirrored yet
    pub const ZERO: SyncProgress = SyncProgress(0);
    /// Mirror is complete
    pub const COMPLETE: SyncProgress = SyncProgress(100);

    /// Creates a progress value, rejecting anything above 100
    pub fn new(percent: u8) -> Result<Self, DomainError> {
        if percent > 100 {
            return Err(DomainError::InvalidProgress(i64::from(percent)));
        }
        Ok(Self(percent))
    }

    /// Coerces an arbitrary JSON value into a progress value
    ///
    /// Integral numbers within `0..=100` are kept (`42` and `42.0` alike);
    /// everything else collapses to zero so the state machine always has
    /// a next state.
    pub fn coerce(value: &serde_json::Value) -> Self {
        Self::exact(value).unwrap_or(Self::ZERO)
    }

    /// Reads an integral percentage, or `None` for anything else
    pub fn exact(value: &serde_json::Value) -> Option<Self> {
        match value.as_f64() {
            Some(n) if n.fract() == 0.0 && (0.0..=100.0).contains(&n) => Some(Self(n as u8)),
            _ => None,
        }
    }

    /// Returns the raw percentage
    pub fn value(self) -> u8 {
        self.0
    }

    /// Returns true when the mirror reports 100%
    pub fn is_complete(self) -> bool {
        self.0 == 100
    }
}

impl TryFrom<u8> for SyncProgress {
    type Error = DomainError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SyncProgress> for u8 {
    fn from(progress: SyncProgress) -> Self {
        progress.0
    }
}

impl fmt::Display for SyncProgress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

// ============================================================================
// SyncState
// ============================================================================

/// Which store report views should query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    /// The live remote feed
    Live,
    /// The local mirror
    Mirror,
}

/// Aggregate state published by the coordinator
///
/// Created as `{Online, 0}` at process start and reset to that value on
/// logout. Every other mutation goes through a coordinator transition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncState {
    pub mode: SyncMode,
    pub progress: SyncProgress,
}

impl SyncState {
    pub fn new(mode: SyncMode, progress: SyncProgress) -> Self {
        Self { mode, progress }
    }

    /// `{Syncing, 0}` - the state right after mirroring was enabled
    pub fn syncing_from_start() -> Self {
        Self::new(SyncMode::Syncing, SyncProgress::ZERO)
    }

    /// `{Offline, 100}` - the mirror is complete and serves all queries
    pub fn offline() -> Self {
        Self::new(SyncMode::Offline, SyncProgress::COMPLETE)
    }

    /// Returns a copy with a different mode and the same progress
    pub fn with_mode(self, mode: SyncMode) -> Self {
        Self { mode, ..self }
    }

    /// Returns a copy with a different progress and the same mode
    pub fn with_progress(self, progress: SyncProgress) -> Self {
        Self { progress, ..self }
    }

    /// True only when the mirror is complete and selected
    pub fn is_synced(&self) -> bool {
        self.mode == SyncMode::Offline && self.progress.is_complete()
    }

    /// Where report views should send their queries right now
    pub fn data_source(&self) -> DataSource {
        if self.is_synced() {
            DataSource::Mirror
        } else {
            DataSource::Live
        }
    }
}

impl fmt::Display for SyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.mode, self.progress)
    }
}
