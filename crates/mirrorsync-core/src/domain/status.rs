//! Status notices
//!
//! Notices are the coordinator's only user-facing output besides the state
//! itself. They carry message identifiers, not text; rendering is up to the
//! sink.

use serde::{Deserialize, Serialize};

/// Mirroring was enabled
pub const SYNC_START: &str = "sync.start";
/// Mirroring was disabled
pub const SYNC_STOP: &str = "sync.stop-sync";
/// The mirror was selected without contacting the backend
pub const SYNC_GO_OFFLINE: &str = "sync.go-offline";
/// A logout left a non-online mode behind
pub const SYNC_LOGOUT: &str = "sync.logout";
/// A backend request failed
pub const REQUEST_ERROR: &str = "status.request.error";
/// Topic attached to every coordinator error notice
pub const SYNC_TOPIC: &str = "sync.title";

/// Severity of a notice
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusLevel {
    #[default]
    Info,
    Error,
}

/// A message for the generic status sink
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusNotice {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(default)]
    pub level: StatusLevel,
}

impl StatusNotice {
    /// An informational notice with only an id
    pub fn info(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            topic: None,
            detail: None,
            level: StatusLevel::Info,
        }
    }

    /// An error notice carrying a raw backend message
    pub fn sync_error(detail: impl Into<String>) -> Self {
        Self {
            id: REQUEST_ERROR.to_string(),
            topic: Some(SYNC_TOPIC.to_string()),
            detail: Some(detail.into()),
            level: StatusLevel::Error,
        }
    }

    /// An error notice naming the failed operation (`during <operation>`)
    pub fn request_failed(operation: &str) -> Self {
        Self::sync_error(format!("during {operation}"))
    }

    pub fn is_error(&self) -> bool {
        self.level == StatusLevel::Error
    }
}
