//! Progress poller and the periodic status-check timer
//!
//! [`ProgressPoller::check`] performs exactly one progress query and hands the
//! decoded reply back untouched. [`run_status_timer`] is the fixed-interval
//! timer that raises [`SyncEvent::PeriodicStatusCheck`]; it lives outside the
//! coordinator so the coordinator never owns a clock.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use mirrorsync_core::domain::{MirrorReply, ProgressReply};
use mirrorsync_core::ports::{operation, IMirrorBackend};

use crate::coordinator::{CoordinatorHandle, SyncEvent};

/// One-shot progress query against the mirror backend
#[derive(Clone)]
pub struct ProgressPoller {
    backend: Arc<dyn IMirrorBackend>,
}

impl ProgressPoller {
    pub fn new(backend: Arc<dyn IMirrorBackend>) -> Self {
        Self { backend }
    }

    /// Queries progress once
    #[tracing::instrument(skip(self))]
    pub async fn check(&self) -> MirrorReply<ProgressReply> {
        let reply = self.backend.query_mirror_progress().await;
        match (&reply.result, &reply.error) {
            (_, Some(error)) => {
                warn!(operation = operation::QUERY_PROGRESS, %error, "Progress query failed");
            }
            (Some(progress), None) => {
                debug!(kind = progress.kind(), reply = ?progress, "Progress query answered");
            }
            (None, None) => debug!("Progress query returned no result"),
        }
        reply
    }
}

/// Raises a periodic status check every `interval` until shutdown
///
/// The first check fires after one full interval. Ticks missed while the
/// coordinator queue was full are skipped rather than bunched up.
pub async fn run_status_timer(
    coordinator: CoordinatorHandle,
    interval: Duration,
    shutdown: CancellationToken,
) {
    info!(interval_secs = interval.as_secs_f64(), "Status check timer starting");

    let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = ticker.tick() => {
                if let Err(e) = coordinator.send(SyncEvent::PeriodicStatusCheck).await {
                    warn!(error = %e, "Coordinator gone, stopping status timer");
                    break;
                }
            }
        }
    }

    info!("Status check timer stopped");
}
