//! Status sink port (driven/secondary port)
//!
//! Receives the coordinator's user-facing notices. Reporting is
//! fire-and-forget and must not block the coordinator task.

use crate::domain::StatusNotice;

/// Port trait for the generic status sink
pub trait IStatusSink: Send + Sync {
    /// Delivers one notice
    fn report(&self, notice: &StatusNotice);
}
