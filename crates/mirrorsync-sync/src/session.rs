//! Session lifecycle bridge
//!
//! Maps authentication events onto coordinator events. Login success becomes
//! [`SyncEvent::LoginSuccess`]; logout becomes [`SyncEvent::Logout`]. The
//! decision taken once the login progress query returns lives in
//! [`plan_login`].

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use mirrorsync_core::domain::{MirrorReply, ProgressReply, SyncProgress};

use crate::coordinator::{CoordinatorHandle, SyncEvent};

/// Authentication lifecycle events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthEvent {
    LoginSuccess,
    Logout,
}

impl From<AuthEvent> for SyncEvent {
    fn from(event: AuthEvent) -> Self {
        match event {
            AuthEvent::LoginSuccess => SyncEvent::LoginSuccess,
            AuthEvent::Logout => SyncEvent::Logout,
        }
    }
}

/// What to do after the login progress query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginPlan {
    /// A run is already under way at an integral percentage: adopt it without a start call
    Resume(SyncProgress),
    /// Nothing is running (or the mirror is complete): request a start
    Start,
}

/// Decides between resuming and starting from the login progress reply
///
/// Only the result is inspected; a failed query falls through to a start.
pub fn plan_login(reply: &MirrorReply<ProgressReply>) -> LoginPlan {
    match reply.result {
        Some(ProgressReply::Percent(progress)) if !progress.is_complete() => {
            LoginPlan::Resume(progress)
        }
        _ => LoginPlan::Start,
    }
}

/// Forwards authentication events to the coordinator
pub struct SessionBridge {
    auth_rx: mpsc::Receiver<AuthEvent>,
    coordinator: CoordinatorHandle,
}

impl SessionBridge {
    /// Creates a bridge and the sender that feeds it
    pub fn new(coordinator: CoordinatorHandle, capacity: usize) -> (Self, mpsc::Sender<AuthEvent>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (
            Self {
                auth_rx: rx,
                coordinator,
            },
            tx,
        )
    }

    /// Runs until shutdown, the auth channel closing, or the coordinator stopping
    pub async fn run(mut self, shutdown: CancellationToken) {
        info!("Session bridge starting");

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                event = self.auth_rx.recv() => {
                    let Some(event) = event else {
                        debug!("Auth channel closed");
                        break;
                    };
                    info!(event = ?event, "Session lifecycle event");
                    if let Err(e) = self.coordinator.send(event.into()).await {
                        warn!(error = %e, "Could not forward session event");
                        break;
                    }
                }
            }
        }

        info!("Session bridge stopped");
    }
}
