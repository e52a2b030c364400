//! Sync preferences port (driven/secondary port)
//!
//! ## Design Notes
//!
//! - Uses `anyhow::Result` because storage errors are adapter-specific.
//! - `apply_persisted` is invoked by the coordinator after every login; the
//!   adapter decides how the loaded preferences reach their consumers.

use crate::domain::SyncPreferences;

/// Port trait for persisted sync preferences
#[async_trait::async_trait]
pub trait ISyncPreferences: Send + Sync {
    /// Loads the persisted preferences, publishes them and returns them
    async fn apply_persisted(&self) -> anyhow::Result<SyncPreferences>;
}
