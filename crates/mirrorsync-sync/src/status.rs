//! Status sink adapters
//!
//! - [`TracingStatusSink`] renders notices as log records
//! - [`ChannelStatusSink`] forwards notices to an async consumer
//! - [`FanoutStatusSink`] delivers every notice to several sinks

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{info, warn};

use mirrorsync_core::domain::StatusNotice;
use mirrorsync_core::ports::IStatusSink;

/// Writes notices to the log
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingStatusSink;

impl IStatusSink for TracingStatusSink {
    fn report(&self, notice: &StatusNotice) {
        let topic = notice.topic.as_deref().unwrap_or("-");
        let detail = notice.detail.as_deref().unwrap_or("-");
        if notice.is_error() {
            warn!(id = %notice.id, topic, detail, "Sync status");
        } else {
            info!(id = %notice.id, topic, detail, "Sync status");
        }
    }
}

/// Queues notices on an unbounded channel
///
/// Sending never blocks the coordinator. Notices reported after the receiver
/// is dropped are discarded.
#[derive(Debug, Clone)]
pub struct ChannelStatusSink {
    tx: mpsc::UnboundedSender<StatusNotice>,
}

impl ChannelStatusSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<StatusNotice>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl IStatusSink for ChannelStatusSink {
    fn report(&self, notice: &StatusNotice) {
        if self.tx.send(notice.clone()).is_err() {
            tracing::debug!(id = %notice.id, "Status receiver dropped, notice discarded");
        }
    }
}

/// Delivers each notice to every inner sink, in order
#[derive(Clone, Default)]
pub struct FanoutStatusSink {
    sinks: Vec<Arc<dyn IStatusSink>>,
}

impl FanoutStatusSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, sink: Arc<dyn IStatusSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }
}

impl IStatusSink for FanoutStatusSink {
    fn report(&self, notice: &StatusNotice) {
        for sink in &self.sinks {
            sink.report(notice);
        }
    }
}
