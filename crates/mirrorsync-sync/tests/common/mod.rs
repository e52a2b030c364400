//! Shared fixtures for coordinator scenario tests
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use mirrorsync_core::domain::{
    MirrorReply, ProgressReply, SectionPreference, StatusNotice, SyncPreferences, SyncSection,
};
use mirrorsync_core::ports::{operation, IMirrorBackend, ISyncPreferences};
use mirrorsync_sync::status::ChannelStatusSink;
use mirrorsync_sync::{CoordinatorHandle, CoordinatorSettings, SyncCoordinator, SyncEvent};

pub const SETTLE: Duration = Duration::from_millis(300);
pub const BACKOFF: Duration = Duration::from_secs(30);

/// Builds a progress reply the way the RPC adapter would decode it
pub fn progress(value: serde_json::Value) -> MirrorReply<ProgressReply> {
    MirrorReply {
        result: ProgressReply::from_json(&value),
        error: None,
    }
}

// ============================================================================
// ScriptedBackend
// ============================================================================

/// In-memory backend answering from per-operation scripts
///
/// Unscripted calls answer `true` (or `NotStarted` for progress queries).
pub struct ScriptedBackend {
    latency: Duration,
    enable: Mutex<VecDeque<MirrorReply<bool>>>,
    disable: Mutex<VecDeque<MirrorReply<bool>>>,
    sign_out: Mutex<VecDeque<MirrorReply<bool>>>,
    progress: Mutex<VecDeque<(Duration, MirrorReply<ProgressReply>)>>,
    calls: Mutex<Vec<&'static str>>,
    wire_active: AtomicUsize,
    wire_peak: AtomicUsize,
}

impl ScriptedBackend {
    pub fn new() -> Arc<Self> {
        Self::with_latency(Duration::from_millis(20))
    }

    pub fn with_latency(latency: Duration) -> Arc<Self> {
        Arc::new(Self {
            latency,
            enable: Mutex::default(),
            disable: Mutex::default(),
            sign_out: Mutex::default(),
            progress: Mutex::default(),
            calls: Mutex::default(),
            wire_active: AtomicUsize::new(0),
            wire_peak: AtomicUsize::new(0),
        })
    }

    pub fn script_enable(&self, reply: MirrorReply<bool>) {
        self.enable.lock().unwrap().push_back(reply);
    }

    pub fn script_disable(&self, reply: MirrorReply<bool>) {
        self.disable.lock().unwrap().push_back(reply);
    }

    pub fn script_sign_out(&self, reply: MirrorReply<bool>) {
        self.sign_out.lock().unwrap().push_back(reply);
    }

    pub fn script_progress(&self, reply: MirrorReply<ProgressReply>) {
        self.script_progress_after(self.latency, reply);
    }

    pub fn script_progress_after(&self, delay: Duration, reply: MirrorReply<ProgressReply>) {
        self.progress.lock().unwrap().push_back((delay, reply));
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, op: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| **c == op).count()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    /// Highest number of enable/disable calls observed on the wire at once
    pub fn wire_peak(&self) -> usize {
        self.wire_peak.load(Ordering::SeqCst)
    }

    fn record(&self, op: &'static str) {
        self.calls.lock().unwrap().push(op);
    }

    async fn on_wire(&self, op: &'static str, script: &Mutex<VecDeque<MirrorReply<bool>>>) -> MirrorReply<bool> {
        self.record(op);
        let active = self.wire_active.fetch_add(1, Ordering::SeqCst) + 1;
        self.wire_peak.fetch_max(active, Ordering::SeqCst);
        tokio::time::sleep(self.latency).await;
        self.wire_active.fetch_sub(1, Ordering::SeqCst);
        script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| MirrorReply::ok(true))
    }
}

#[async_trait::async_trait]
impl IMirrorBackend for ScriptedBackend {
    async fn enable_mirroring(&self) -> MirrorReply<bool> {
        self.on_wire(operation::ENABLE, &self.enable).await
    }

    async fn disable_mirroring(&self) -> MirrorReply<bool> {
        self.on_wire(operation::DISABLE, &self.disable).await
    }

    async fn query_mirror_progress(&self) -> MirrorReply<ProgressReply> {
        self.record(operation::QUERY_PROGRESS);
        let scripted = self.progress.lock().unwrap().pop_front();
        let (delay, reply) =
            scripted.unwrap_or_else(|| (self.latency, MirrorReply::ok(ProgressReply::NotStarted)));
        tokio::time::sleep(delay).await;
        reply
    }

    async fn sign_out(&self) -> MirrorReply<bool> {
        self.record(operation::SIGN_OUT);
        tokio::time::sleep(self.latency).await;
        self.sign_out
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| MirrorReply::ok(true))
    }
}

// ============================================================================
// CountingPreferences
// ============================================================================

/// Preferences port that counts applications and can be told to fail
#[derive(Default)]
pub struct CountingPreferences {
    applied: AtomicUsize,
    fail: bool,
}

impl CountingPreferences {
    pub fn failing() -> Self {
        Self {
            applied: AtomicUsize::new(0),
            fail: true,
        }
    }

    pub fn applied(&self) -> usize {
        self.applied.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl ISyncPreferences for CountingPreferences {
    async fn apply_persisted(&self) -> anyhow::Result<SyncPreferences> {
        self.applied.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            anyhow::bail!("database is locked");
        }
        let mut prefs = SyncPreferences::new();
        prefs.set(
            SyncSection::Candles,
            SectionPreference::new(["BTCUSD"], None)?,
        );
        Ok(prefs)
    }
}

// ============================================================================
// Harness
// ============================================================================

pub struct Harness {
    pub handle: CoordinatorHandle,
    pub backend: Arc<ScriptedBackend>,
    pub preferences: Arc<CountingPreferences>,
    pub shutdown: CancellationToken,
    notices: mpsc::UnboundedReceiver<StatusNotice>,
}

impl Harness {
    pub fn start(backend: Arc<ScriptedBackend>) -> Self {
        Self::start_with(backend, CountingPreferences::default())
    }

    pub fn start_with(backend: Arc<ScriptedBackend>, preferences: CountingPreferences) -> Self {
        let preferences = Arc::new(preferences);
        let (sink, notices) = ChannelStatusSink::new();
        let settings = CoordinatorSettings {
            settle_delay: SETTLE,
            fault_backoff: BACKOFF,
            event_queue_capacity: 16,
        };
        let (coordinator, handle) =
            SyncCoordinator::new(backend.clone(), Arc::new(sink), settings);
        let coordinator = coordinator.with_preferences(preferences.clone());

        let shutdown = CancellationToken::new();
        tokio::spawn(coordinator.run(shutdown.clone()));

        Self {
            handle,
            backend,
            preferences,
            shutdown,
            notices,
        }
    }

    pub async fn send(&self, event: SyncEvent) {
        self.handle.send(event).await.expect("coordinator running");
    }

    /// Sends an event and lets every resulting task run to completion
    pub async fn send_and_settle(&self, event: SyncEvent) {
        self.send(event).await;
        idle().await;
    }

    /// Drives the coordinator into `{Syncing, p}` through a status check
    pub async fn drive_to_syncing(&mut self, p: u8) {
        self.backend.script_progress(progress(serde_json::json!(p)));
        self.send_and_settle(SyncEvent::PeriodicStatusCheck).await;
        self.backend.clear_calls();
        self.notices();
    }

    /// Notices reported since the previous call
    pub fn notices(&mut self) -> Vec<StatusNotice> {
        let mut out = Vec::new();
        while let Ok(notice) = self.notices.try_recv() {
            out.push(notice);
        }
        out
    }

    pub fn notice_ids(&mut self) -> Vec<String> {
        self.notices().into_iter().map(|n| n.id).collect()
    }
}

/// Waits well past the settle window and any scripted latency
pub async fn idle() {
    tokio::time::sleep(Duration::from_secs(2)).await;
}
