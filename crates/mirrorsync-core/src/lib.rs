//! mirrorsync Core - Domain types, ports and configuration
//!
//! This crate contains the hexagonal architecture core with:
//! - **Domain types** - `SyncMode`, `SyncProgress`, `SyncState`, `MirrorReply`,
//!   `ProgressReply`, `StatusNotice`, `SyncPreferences`
//! - **Port definitions** - Traits for adapters: `IMirrorBackend`, `IStatusSink`,
//!   `ISyncPreferences`
//! - **Configuration** - YAML-backed settings for the daemon and CLI
//!
//! # Architecture
//!
//! The domain module contains pure data types and decoding rules with no I/O.
//! Ports define trait interfaces that adapter crates implement. The
//! coordinator that drives the state machine lives in `mirrorsync-sync`.

pub mod config;
pub mod domain;
pub mod ports;
