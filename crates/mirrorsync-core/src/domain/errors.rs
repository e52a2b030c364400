//! Domain error types
//!
//! This module defines error types specific to domain operations,
//! such as out-of-range progress values and unparseable mode or section names.

use thiserror::Error;

/// Errors that can occur in domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Progress value outside the 0..=100 range
    #[error("Invalid progress: {0} (expected 0..=100)")]
    InvalidProgress(i64),

    /// Unknown sync mode name
    #[error("Invalid sync mode: {0}")]
    InvalidMode(String),

    /// Unknown report section name
    #[error("Invalid sync section: {0}")]
    InvalidSection(String),

    /// Empty or malformed trading pair symbol
    #[error("Invalid pair: {0:?}")]
    InvalidPair(String),

    /// Generic validation failure
    #[error("Validation failed: {0}")]
    ValidationFailed(String),
}
