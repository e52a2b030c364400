//! Backend replies
//!
//! Every mirror backend call answers with a [`MirrorReply`]: an optional
//! result plus an optional error. Progress queries additionally decode their
//! raw JSON result once, here, into a [`ProgressReply`] so that no later
//! component has to inspect strings or numbers again.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::mode::SyncProgress;

/// Reply text meaning mirroring has never been started on this backend
pub const NOT_STARTED_SENTINEL: &str = "SYNCHRONIZATION_HAS_NOT_STARTED_YET";

/// Substring marking a transient server-availability failure
pub const SERVER_UNAVAILABLE_MARKER: &str = "ServerAvailabilityError";

// ============================================================================
// MirrorReply
// ============================================================================

/// Result/error pair returned by every mirror backend operation
///
/// Both fields empty is an ambiguous success and is treated as a no-op by
/// the coordinator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MirrorReply<T> {
    pub result: Option<T>,
    pub error: Option<String>,
}

impl<T> MirrorReply<T> {
    /// A reply carrying a result and no error
    pub fn ok(result: T) -> Self {
        Self {
            result: Some(result),
            error: None,
        }
    }

    /// A reply carrying only an error
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            result: None,
            error: Some(error.into()),
        }
    }

    /// A reply with neither result nor error
    pub fn empty() -> Self {
        Self {
            result: None,
            error: None,
        }
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Maps the result, keeping the error untouched
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> MirrorReply<U> {
        MirrorReply {
            result: self.result.map(f),
            error: self.error,
        }
    }
}

impl MirrorReply<bool> {
    /// True only for an error-free `true` result
    ///
    /// `false` and an empty reply are not failures either; callers treat
    /// them as no-ops.
    pub fn succeeded(&self) -> bool {
        self.error.is_none() && self.result == Some(true)
    }
}

// ============================================================================
// ProgressReply
// ============================================================================

/// Decoded result of a mirror progress query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressReply {
    /// An integral percentage within `0..=100`
    Percent(SyncProgress),
    /// Any other number (fractional, negative, above 100), kept as its JSON text
    ///
    /// Counts as 0% wherever a percentage is required.
    Coerced(String),
    /// The backend is not mirroring at all
    Idle(bool),
    /// Mirroring has never been started; transient, ignored
    NotStarted,
    /// The server behind the mirror is temporarily unreachable; ignored
    ServerUnavailable(String),
    /// Any other payload; reported and answered with a stop
    Fault(String),
}

impl ProgressReply {
    /// Decodes a raw JSON result, returning `None` for `null`
    pub fn from_json(value: &Value) -> Option<Self> {
        let reply = match value {
            Value::Null => return None,
            Value::Number(n) => match SyncProgress::exact(value) {
                Some(progress) => ProgressReply::Percent(progress),
                None => ProgressReply::Coerced(n.to_string()),
            },
            Value::Bool(b) => ProgressReply::Idle(*b),
            Value::String(s) => Self::from_text(s),
            other => ProgressReply::Fault(other.to_string()),
        };
        Some(reply)
    }

    fn from_text(text: &str) -> Self {
        if text == NOT_STARTED_SENTINEL {
            ProgressReply::NotStarted
        } else if text.contains(SERVER_UNAVAILABLE_MARKER) {
            ProgressReply::ServerUnavailable(text.to_string())
        } else {
            ProgressReply::Fault(text.to_string())
        }
    }

    /// Replies the coordinator deliberately ignores
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ProgressReply::NotStarted | ProgressReply::ServerUnavailable(_)
        )
    }

    /// Numeric progress, when the reply carries one; coerced numbers read as 0
    pub fn percent(&self) -> Option<SyncProgress> {
        match self {
            ProgressReply::Percent(p) => Some(*p),
            ProgressReply::Coerced(_) => Some(SyncProgress::ZERO),
            _ => None,
        }
    }

    /// Short classification label, used by logs and the CLI
    pub fn kind(&self) -> &'static str {
        match self {
            ProgressReply::Percent(_) => "percent",
            ProgressReply::Coerced(_) => "coerced",
            ProgressReply::Idle(_) => "idle",
            ProgressReply::NotStarted => "not_started",
            ProgressReply::ServerUnavailable(_) => "server_unavailable",
            ProgressReply::Fault(_) => "fault",
        }
    }
}
