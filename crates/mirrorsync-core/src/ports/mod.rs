//! Port definitions (hexagonal architecture interfaces)
//!
//! This module defines the port traits that form the boundaries of the
//! hexagonal architecture. Ports are interfaces that the coordinator
//! depends on, but whose implementations live in adapter crates.
//!
//! ## Ports Overview
//!
//! - [`IMirrorBackend`] - Mirroring backend (enable, disable, progress, sign-out)
//! - [`IStatusSink`] - User-facing status notices
//! - [`ISyncPreferences`] - Persisted per-section sync preferences

pub mod mirror_backend;
pub mod preferences;
pub mod status_sink;

pub use mirror_backend::{operation, IMirrorBackend};
pub use preferences::ISyncPreferences;
pub use status_sink::IStatusSink;
