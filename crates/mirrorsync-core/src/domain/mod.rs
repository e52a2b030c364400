//! Domain types for mirrorsync
//!
//! This module contains the core domain types:
//! - Sync mode, progress and the aggregate sync state
//! - Backend replies and the decoded progress reply
//! - User-facing status notices
//! - Per-section sync preferences
//! - Domain-specific error types

pub mod errors;
pub mod mode;
pub mod preferences;
pub mod reply;
pub mod status;

// Re-export commonly used types
pub use errors::DomainError;
pub use mode::{DataSource, SyncMode, SyncProgress, SyncState};
pub use preferences::{SectionPreference, SyncPreferences, SyncSection};
pub use reply::{MirrorReply, ProgressReply};
pub use status::{StatusLevel, StatusNotice};
