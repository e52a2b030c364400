//! mirrorsync Cache - Local persistence of sync preferences
//!
//! SQLite-based storage for the per-section sync preferences that are
//! re-applied after every login.
//!
//! ## Architecture
//!
//! This crate implements the `ISyncPreferences` port from `mirrorsync-core`
//! using SQLite as the storage backend. It is a driven (secondary) adapter
//! in the hexagonal architecture.
//!
//! ## Key Components
//!
//! - [`DatabasePool`] - Connection pool with migration support
//! - [`SqlitePreferenceRepository`] - Preference storage and `ISyncPreferences` implementation
//! - [`CacheError`] - Error types for cache operations
//!
//! ## Usage
//!
//! ```no_run
//! use std::path::Path;
//! use mirrorsync_cache::{DatabasePool, SqlitePreferenceRepository};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let pool = DatabasePool::new(Path::new("/home/user/.local/share/mirrorsync/mirrorsync.db")).await?;
//! let repo = SqlitePreferenceRepository::new(pool.pool().clone());
//! let prefs = repo.load().await?;
//! println!("{} sections configured", prefs.configured_sections().len());
//! # Ok(())
//! # }
//! ```

pub mod pool;
pub mod repository;

pub use pool::DatabasePool;
pub use repository::SqlitePreferenceRepository;

/// Errors that can occur during cache operations
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// Failed to establish a database connection
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// A database query failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Schema migration failed
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// A stored row could not be turned back into domain types
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<sqlx::Error> for CacheError {
    fn from(e: sqlx::Error) -> Self {
        CacheError::QueryFailed(e.to_string())
    }
}

impl From<serde_json::Error> for CacheError {
    fn from(e: serde_json::Error) -> Self {
        CacheError::SerializationError(e.to_string())
    }
}
