//! Settle window and fire gate
//!
//! A backend task passes through two checkpoints before it may touch the
//! backend: an optional cancellable settle delay, and a [`FireGate`] that the
//! coordinator and the task race on. Whoever flips the gate first wins: either
//! the task fires, or the coordinator abandons it.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

const PENDING: u8 = 0;
const FIRED: u8 = 1;
const CANCELLED: u8 = 2;

/// One-shot latch deciding whether a task reached the backend
#[derive(Debug, Clone, Default)]
pub struct FireGate {
    state: Arc<AtomicU8>,
}

impl FireGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the task as having reached the backend
    ///
    /// Returns false if the gate was already cancelled.
    pub fn try_fire(&self) -> bool {
        self.state
            .compare_exchange(PENDING, FIRED, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Abandons the task if it has not fired yet
    ///
    /// Returns true when the task was abandoned, false when it had already
    /// fired (its result will arrive and must be discarded).
    pub fn try_cancel(&self) -> bool {
        match self
            .state
            .compare_exchange(PENDING, CANCELLED, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) => true,
            Err(current) => current == CANCELLED,
        }
    }

    pub fn has_fired(&self) -> bool {
        self.state.load(Ordering::Acquire) == FIRED
    }
}

/// Sleeps for `delay` unless `cancel` fires first
///
/// Returns true when the full window elapsed.
pub async fn settle(delay: Duration, cancel: &CancellationToken) -> bool {
    if delay.is_zero() {
        return !cancel.is_cancelled();
    }
    tokio::select! {
        _ = cancel.cancelled() => false,
        _ = tokio::time::sleep(delay) => true,
    }
}
