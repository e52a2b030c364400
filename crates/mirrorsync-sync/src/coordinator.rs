//! Sync coordinator
//!
//! The state machine deciding whether queries are served live, from the
//! mirror, or are mid-transition. It runs as a single task that owns the
//! [`SyncStateStore`] and processes one event at a time.
//!
//! ## Flow
//!
//! ```text
//! CoordinatorHandle ──→ events ──┐
//!                                ├──→ SyncCoordinator ──→ SyncStateStore ──→ readers
//! backend tasks ──→ completions ─┘          │
//!                                           └──→ spawn backend task (per lane)
//! ```
//!
//! ## Lanes
//!
//! Every backend task belongs to a lane. A lane holds at most one in-flight
//! task; a newer request on the same lane supersedes the older one. A
//! superseded task that has not reached the backend yet is abandoned without
//! side effects; the result of one that has is discarded on arrival (its
//! generation no longer matches). Start and stop share the mirroring lane,
//! and their backend calls are additionally serialized by one mutex so they
//! never overlap on the wire.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, Mutex};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use mirrorsync_core::config::SyncConfig;
use mirrorsync_core::domain::status::{SYNC_GO_OFFLINE, SYNC_LOGOUT, SYNC_START, SYNC_STOP};
use mirrorsync_core::domain::{
    MirrorReply, ProgressReply, StatusNotice, SyncMode, SyncPreferences, SyncProgress, SyncState,
};
use mirrorsync_core::ports::{operation, IMirrorBackend, IStatusSink, ISyncPreferences};

use crate::debounce::{settle, FireGate};
use crate::poller::ProgressPoller;
use crate::session::{plan_login, LoginPlan};
use crate::store::{SyncStateReader, SyncStateStore};
use crate::SyncError;

/// Operation name used when preference application fails
const APPLY_PREFERENCES: &str = "applySyncPreferences";

// ============================================================================
// Events and handle
// ============================================================================

/// Inbound coordinator events
#[derive(Debug, Clone, PartialEq)]
pub enum SyncEvent {
    StartSyncing,
    StopSyncing,
    ForceOffline,
    LoginSuccess,
    Logout,
    /// Raw progress pushed by the backend; coerced on arrival
    ProgressUpdate(serde_json::Value),
    /// Whether requests are being redirected to the live feed
    RequestsRedirect(bool),
    PeriodicStatusCheck,
}

impl SyncEvent {
    pub fn name(&self) -> &'static str {
        match self {
            SyncEvent::StartSyncing => "start_syncing",
            SyncEvent::StopSyncing => "stop_syncing",
            SyncEvent::ForceOffline => "force_offline",
            SyncEvent::LoginSuccess => "login_success",
            SyncEvent::Logout => "logout",
            SyncEvent::ProgressUpdate(_) => "progress_update",
            SyncEvent::RequestsRedirect(_) => "requests_redirect",
            SyncEvent::PeriodicStatusCheck => "periodic_status_check",
        }
    }
}

/// Cloneable front door to a running coordinator
#[derive(Debug, Clone)]
pub struct CoordinatorHandle {
    events: mpsc::Sender<SyncEvent>,
    state: SyncStateReader,
}

impl CoordinatorHandle {
    /// Queues an event, waiting for room if the queue is full
    pub async fn send(&self, event: SyncEvent) -> Result<(), SyncError> {
        self.events
            .send(event)
            .await
            .map_err(|_| SyncError::CoordinatorStopped)
    }

    pub async fn start_syncing(&self) -> Result<(), SyncError> {
        self.send(SyncEvent::StartSyncing).await
    }

    pub async fn stop_syncing(&self) -> Result<(), SyncError> {
        self.send(SyncEvent::StopSyncing).await
    }

    pub async fn force_offline(&self) -> Result<(), SyncError> {
        self.send(SyncEvent::ForceOffline).await
    }

    pub async fn check_status(&self) -> Result<(), SyncError> {
        self.send(SyncEvent::PeriodicStatusCheck).await
    }

    /// Latest committed state
    pub fn state(&self) -> SyncState {
        self.state.snapshot()
    }

    /// A fresh reader for change notifications
    pub fn subscribe(&self) -> SyncStateReader {
        self.state.clone()
    }
}

// ============================================================================
// Settings
// ============================================================================

/// Coordinator tuning
#[derive(Debug, Clone)]
pub struct CoordinatorSettings {
    /// Delay a stop waits before reaching the backend
    pub settle_delay: Duration,
    /// Minimum pause in periodic checks after an unrecognized reply
    pub fault_backoff: Duration,
    /// Capacity of the inbound event queue
    pub event_queue_capacity: usize,
}

impl Default for CoordinatorSettings {
    fn default() -> Self {
        Self::from(&SyncConfig::default())
    }
}

impl From<&SyncConfig> for CoordinatorSettings {
    fn from(config: &SyncConfig) -> Self {
        Self {
            settle_delay: config.settle_delay(),
            fault_backoff: config.fault_backoff(),
            event_queue_capacity: config.event_queue_capacity,
        }
    }
}

// ============================================================================
// Lanes and completions
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Lane {
    Mirroring,
    StatusCheck,
    Login,
    Logout,
    Preferences,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TaskKind {
    Enable,
    Disable,
    StatusCheck,
    LoginQuery,
    SignOut,
    ApplyPreferences,
}

struct InFlight {
    kind: TaskKind,
    generation: u64,
    gate: FireGate,
    cancel: CancellationToken,
}

/// What happened to a superseded task
struct Superseded {
    kind: TaskKind,
    fired: bool,
}

enum Outcome {
    Enabled(MirrorReply<bool>),
    Disabled(MirrorReply<bool>),
    StatusChecked(MirrorReply<ProgressReply>),
    LoginProgress(MirrorReply<ProgressReply>),
    SignedOut(MirrorReply<bool>),
    PreferencesApplied(anyhow::Result<SyncPreferences>),
}

struct Completion {
    lane: Lane,
    generation: u64,
    outcome: Outcome,
}

// ============================================================================
// SyncCoordinator
// ============================================================================

/// The sync state machine
pub struct SyncCoordinator {
    backend: Arc<dyn IMirrorBackend>,
    poller: ProgressPoller,
    status: Arc<dyn IStatusSink>,
    preferences: Option<Arc<dyn ISyncPreferences>>,
    settings: CoordinatorSettings,
    store: SyncStateStore,
    events_rx: mpsc::Receiver<SyncEvent>,
    completions_tx: mpsc::UnboundedSender<Completion>,
    completions_rx: mpsc::UnboundedReceiver<Completion>,
    lanes: HashMap<Lane, InFlight>,
    generation: u64,
    /// Serializes enable and disable calls on the wire
    backend_lane: Arc<Mutex<()>>,
    backoff_until: Option<Instant>,
    /// Preferences wait for the start action a login issued
    preferences_pending: bool,
}

impl SyncCoordinator {
    /// Creates a coordinator in the default `{Online, 0}` state
    ///
    /// Nothing happens until [`run`](SyncCoordinator::run) is awaited.
    pub fn new(
        backend: Arc<dyn IMirrorBackend>,
        status: Arc<dyn IStatusSink>,
        settings: CoordinatorSettings,
    ) -> (Self, CoordinatorHandle) {
        let (events_tx, events_rx) = mpsc::channel(settings.event_queue_capacity.max(1));
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        let store = SyncStateStore::new();

        let handle = CoordinatorHandle {
            events: events_tx,
            state: store.reader(),
        };

        let coordinator = Self {
            poller: ProgressPoller::new(Arc::clone(&backend)),
            backend,
            status,
            preferences: None,
            settings,
            store,
            events_rx,
            completions_tx,
            completions_rx,
            lanes: HashMap::new(),
            generation: 0,
            backend_lane: Arc::new(Mutex::new(())),
            backoff_until: None,
            preferences_pending: false,
        };

        (coordinator, handle)
    }

    /// Applies persisted sync preferences after every login
    pub fn with_preferences(mut self, preferences: Arc<dyn ISyncPreferences>) -> Self {
        self.preferences = Some(preferences);
        self
    }

    /// Processes events until shutdown or until every handle is dropped
    ///
    /// In-flight tasks are abandoned on exit.
    pub async fn run(mut self, shutdown: CancellationToken) {
        info!(
            settle_ms = self.settings.settle_delay.as_millis() as u64,
            backoff_secs = self.settings.fault_backoff.as_secs(),
            "Sync coordinator starting"
        );

        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => {
                    info!("Shutdown requested");
                    break;
                }
                Some(done) = self.completions_rx.recv() => self.on_completion(done),
                event = self.events_rx.recv() => match event {
                    Some(event) => self.on_event(event),
                    None => {
                        info!("All coordinator handles dropped");
                        break;
                    }
                },
            }
        }

        self.preferences_pending = false;
        for lane in self.lanes.keys().copied().collect::<Vec<_>>() {
            self.supersede(lane);
        }
        info!(state = %self.store.get(), "Sync coordinator stopped");
    }

    // ------------------------------------------------------------------------
    // Event handling
    // ------------------------------------------------------------------------

    fn on_event(&mut self, event: SyncEvent) {
        debug!(event = event.name(), state = %self.store.get(), "Handling sync event");

        match event {
            SyncEvent::StartSyncing => self.request_start(),
            SyncEvent::StopSyncing => self.request_stop(),
            SyncEvent::ForceOffline => self.force_offline(),
            SyncEvent::LoginSuccess => self.begin_login(),
            SyncEvent::Logout => self.begin_logout(),
            SyncEvent::ProgressUpdate(value) => self.apply_progress_update(&value),
            SyncEvent::RequestsRedirect(active) => self.apply_redirect(active),
            SyncEvent::PeriodicStatusCheck => self.begin_status_check(),
        }
    }

    fn request_start(&mut self) {
        let mode = self.store.get().mode;

        match self.lanes.get(&Lane::Mirroring).map(|flight| flight.kind) {
            Some(TaskKind::Enable) => debug!("Start already in flight"),
            Some(_) => {
                let fired = self
                    .supersede(Lane::Mirroring)
                    .is_some_and(|prior| prior.fired);
                if fired || mode == SyncMode::Online {
                    self.spawn_enable();
                }
            }
            None if mode == SyncMode::Online => self.spawn_enable(),
            None => debug!(%mode, "Start ignored, not online"),
        }
    }

    fn request_stop(&mut self) {
        let mode = self.store.get().mode;

        let current = self
            .lanes
            .get(&Lane::Mirroring)
            .map(|flight| (flight.kind, flight.gate.has_fired()));

        match current {
            Some((TaskKind::Disable, true)) => debug!("Stop already reached the backend"),
            Some(_) => {
                let prior = self.supersede(Lane::Mirroring);
                if prior.as_ref().is_some_and(|p| p.kind == TaskKind::Enable) {
                    self.release_preferences();
                }
                let restart = prior.as_ref().is_some_and(|p| p.kind == TaskKind::Disable);
                let fired = prior.is_some_and(|p| p.fired);
                if restart || fired || mode != SyncMode::Online {
                    self.spawn_disable();
                }
            }
            None if mode != SyncMode::Online => self.spawn_disable(),
            None => debug!("Stop ignored, already online"),
        }
    }

    fn force_offline(&mut self) {
        self.store.commit(SyncState::offline());
        self.notify(StatusNotice::info(SYNC_GO_OFFLINE));
    }

    fn begin_login(&mut self) {
        self.supersede(Lane::Login);
        self.preferences_pending = false;
        let poller = self.poller.clone();
        self.spawn(Lane::Login, TaskKind::LoginQuery, move |gate, _cancel| async move {
            if !gate.try_fire() {
                return None;
            }
            Some(Outcome::LoginProgress(poller.check().await))
        });
    }

    fn begin_logout(&mut self) {
        self.preferences_pending = false;
        for lane in [
            Lane::Mirroring,
            Lane::StatusCheck,
            Lane::Login,
            Lane::Preferences,
            Lane::Logout,
        ] {
            self.supersede(lane);
        }

        let backend = Arc::clone(&self.backend);
        self.spawn(Lane::Logout, TaskKind::SignOut, move |gate, _cancel| async move {
            if !gate.try_fire() {
                return None;
            }
            Some(Outcome::SignedOut(backend.sign_out().await))
        });
    }

    fn apply_progress_update(&mut self, value: &serde_json::Value) {
        let state = self.store.get();
        if state.mode != SyncMode::Syncing {
            debug!(mode = %state.mode, "Progress update ignored outside syncing");
            return;
        }
        self.store.commit(state.with_progress(SyncProgress::coerce(value)));
    }

    fn apply_redirect(&mut self, active: bool) {
        if !active {
            self.force_offline();
            return;
        }

        let state = self.store.get();
        let mode = if state.progress.is_complete() {
            SyncMode::Online
        } else {
            SyncMode::Syncing
        };
        self.store.commit(state.with_mode(mode));
    }

    fn begin_status_check(&mut self) {
        if let Some(until) = self.backoff_until {
            if Instant::now() < until {
                debug!("Status check skipped during fault backoff");
                return;
            }
            self.backoff_until = None;
        }

        self.supersede(Lane::StatusCheck);
        let poller = self.poller.clone();
        self.spawn(Lane::StatusCheck, TaskKind::StatusCheck, move |gate, _cancel| async move {
            if !gate.try_fire() {
                return None;
            }
            Some(Outcome::StatusChecked(poller.check().await))
        });
    }

    // ------------------------------------------------------------------------
    // Completion handling
    // ------------------------------------------------------------------------

    fn on_completion(&mut self, done: Completion) {
        match self.lanes.get(&done.lane) {
            Some(flight) if flight.generation == done.generation => {
                self.lanes.remove(&done.lane);
            }
            _ => {
                debug!(lane = ?done.lane, generation = done.generation, "Discarding superseded result");
                return;
            }
        }

        match done.outcome {
            Outcome::Enabled(reply) => self.finish_enable(reply),
            Outcome::Disabled(reply) => self.finish_disable(reply),
            Outcome::StatusChecked(reply) => self.finish_status_check(reply),
            Outcome::LoginProgress(reply) => self.finish_login(reply),
            Outcome::SignedOut(reply) => self.finish_logout(reply),
            Outcome::PreferencesApplied(result) => self.finish_preferences(result),
        }
    }

    fn finish_enable(&mut self, reply: MirrorReply<bool>) {
        self.release_preferences();
        if let Some(error) = &reply.error {
            self.backend_failed(operation::ENABLE, error);
        } else if reply.succeeded() {
            self.store.commit(SyncState::syncing_from_start());
            self.notify(StatusNotice::info(SYNC_START));
        } else {
            debug!(result = ?reply.result, "Enable not confirmed, state unchanged");
        }
    }

    fn finish_disable(&mut self, reply: MirrorReply<bool>) {
        if let Some(error) = &reply.error {
            self.backend_failed(operation::DISABLE, error);
        } else if reply.succeeded() {
            let state = self.store.get();
            self.store.commit(state.with_mode(SyncMode::Online));
            self.notify(StatusNotice::info(SYNC_STOP));
        } else {
            debug!(result = ?reply.result, "Disable not confirmed, state unchanged");
        }
    }

    fn finish_status_check(&mut self, reply: MirrorReply<ProgressReply>) {
        if let Some(error) = &reply.error {
            self.backend_failed(operation::QUERY_PROGRESS, error);
            return;
        }
        let Some(progress) = reply.result else {
            debug!("Status check returned nothing");
            return;
        };

        let state = self.store.get();
        match &progress {
            ProgressReply::Percent(_) | ProgressReply::Coerced(_) => {
                let p = progress.percent().unwrap_or_default();
                if p.is_complete() {
                    self.store.commit(SyncState::offline());
                } else {
                    self.store.commit(SyncState::new(SyncMode::Syncing, p));
                }
            }
            ProgressReply::Idle(_) => {
                if state.mode != SyncMode::Online {
                    self.store.commit(state.with_mode(SyncMode::Online));
                }
            }
            ProgressReply::NotStarted | ProgressReply::ServerUnavailable(_) => {
                debug!(kind = progress.kind(), "Transient status reply ignored");
            }
            ProgressReply::Fault(text) => {
                warn!(fault = %text, backoff_secs = self.settings.fault_backoff.as_secs(), "Unrecognized status reply, stopping");
                self.notify(StatusNotice::sync_error(text.clone()));
                self.backoff_until = Some(Instant::now() + self.settings.fault_backoff);
                self.request_stop();
            }
        }
    }

    fn finish_login(&mut self, reply: MirrorReply<ProgressReply>) {
        if let Some(error) = &reply.error {
            warn!(operation = operation::QUERY_PROGRESS, %error, "Login progress query failed");
        }

        match plan_login(&reply) {
            LoginPlan::Resume(progress) => {
                info!(progress = progress.value(), "Resuming mirroring already in progress");
                self.store.commit(SyncState::new(SyncMode::Syncing, progress));
                self.spawn_preferences();
            }
            LoginPlan::Start => {
                self.preferences_pending = true;
                self.start_after_login();
            }
        }
    }

    /// Issues an enable whatever the current mode
    ///
    /// Unlike [`request_start`](Self::request_start) there is no mode guard:
    /// the backend has just reported that it is not mirroring.
    fn start_after_login(&mut self) {
        if self.lanes.get(&Lane::Mirroring).map(|flight| flight.kind) == Some(TaskKind::Enable) {
            debug!("Start already in flight, login waits for it");
            return;
        }
        self.supersede(Lane::Mirroring);
        self.spawn_enable();
    }

    fn finish_logout(&mut self, reply: MirrorReply<bool>) {
        if let Some(error) = &reply.error {
            self.backend_failed(operation::SIGN_OUT, error);
        }

        let prior = self.store.get();
        self.store.commit(SyncState::default());
        self.backoff_until = None;
        if prior.mode != SyncMode::Online {
            self.notify(StatusNotice::info(SYNC_LOGOUT));
        }
    }

    fn finish_preferences(&mut self, result: anyhow::Result<SyncPreferences>) {
        match result {
            Ok(preferences) => {
                info!(
                    sections = preferences.configured_sections().len(),
                    "Sync preferences applied"
                );
            }
            Err(e) => {
                warn!(operation = APPLY_PREFERENCES, error = %e, "Could not apply sync preferences");
                self.notify(StatusNotice::request_failed(APPLY_PREFERENCES));
            }
        }
    }

    // ------------------------------------------------------------------------
    // Task plumbing
    // ------------------------------------------------------------------------

    fn spawn_enable(&mut self) {
        let backend = Arc::clone(&self.backend);
        let lock = Arc::clone(&self.backend_lane);
        self.spawn(Lane::Mirroring, TaskKind::Enable, move |gate, cancel| async move {
            let _wire = tokio::select! {
                _ = cancel.cancelled() => return None,
                guard = lock.lock_owned() => guard,
            };
            if !gate.try_fire() {
                return None;
            }
            Some(Outcome::Enabled(backend.enable_mirroring().await))
        });
    }

    fn spawn_disable(&mut self) {
        let backend = Arc::clone(&self.backend);
        let lock = Arc::clone(&self.backend_lane);
        let delay = self.settings.settle_delay;
        self.spawn(Lane::Mirroring, TaskKind::Disable, move |gate, cancel| async move {
            if !settle(delay, &cancel).await {
                return None;
            }
            let _wire = tokio::select! {
                _ = cancel.cancelled() => return None,
                guard = lock.lock_owned() => guard,
            };
            if !gate.try_fire() {
                return None;
            }
            Some(Outcome::Disabled(backend.disable_mirroring().await))
        });
    }

    /// Applies preferences held back for a login's start action
    fn release_preferences(&mut self) {
        if std::mem::take(&mut self.preferences_pending) {
            self.spawn_preferences();
        }
    }

    fn spawn_preferences(&mut self) {
        let Some(preferences) = self.preferences.clone() else {
            return;
        };
        self.supersede(Lane::Preferences);
        self.spawn(Lane::Preferences, TaskKind::ApplyPreferences, move |gate, _cancel| async move {
            if !gate.try_fire() {
                return None;
            }
            Some(Outcome::PreferencesApplied(preferences.apply_persisted().await))
        });
    }

    /// Spawns a backend task on `lane`, which must be free
    ///
    /// The task returns `None` when it was abandoned before reaching the
    /// backend; nothing is reported in that case.
    fn spawn<F, Fut>(&mut self, lane: Lane, kind: TaskKind, task: F)
    where
        F: FnOnce(FireGate, CancellationToken) -> Fut,
        Fut: Future<Output = Option<Outcome>> + Send + 'static,
    {
        self.generation += 1;
        let generation = self.generation;
        let gate = FireGate::new();
        let cancel = CancellationToken::new();

        let work = task(gate.clone(), cancel.clone());
        let completions = self.completions_tx.clone();
        tokio::spawn(async move {
            if let Some(outcome) = work.await {
                let _ = completions.send(Completion {
                    lane,
                    generation,
                    outcome,
                });
            }
        });

        debug!(?lane, ?kind, generation, "Backend task spawned");
        self.lanes.insert(
            lane,
            InFlight {
                kind,
                generation,
                gate,
                cancel,
            },
        );
    }

    /// Removes the in-flight task on `lane`, abandoning it if it has not fired
    fn supersede(&mut self, lane: Lane) -> Option<Superseded> {
        let flight = self.lanes.remove(&lane)?;
        flight.cancel.cancel();
        let fired = !flight.gate.try_cancel();
        debug!(?lane, kind = ?flight.kind, generation = flight.generation, fired, "Task superseded");
        Some(Superseded {
            kind: flight.kind,
            fired,
        })
    }

    fn backend_failed(&self, operation: &str, error: &str) {
        warn!(operation, %error, "Backend call failed");
        self.notify(StatusNotice::request_failed(operation));
    }

    fn notify(&self, notice: StatusNotice) {
        self.status.report(&notice);
    }
}
