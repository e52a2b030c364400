//! Session bridge and status timer tests

mod common;

use std::time::Duration;

use serde_json::json;
use tokio_util::sync::CancellationToken;

use common::{idle, progress, Harness, ScriptedBackend};
use mirrorsync_core::domain::{SyncMode, SyncState};
use mirrorsync_core::ports::operation::{QUERY_PROGRESS, SIGN_OUT};
use mirrorsync_sync::poller::{run_status_timer, ProgressPoller};
use mirrorsync_sync::session::{AuthEvent, SessionBridge};

#[tokio::test(start_paused = true)]
async fn test_bridge_forwards_login_and_logout() {
    let h = Harness::start(ScriptedBackend::new());
    h.backend.script_progress(progress(json!(25)));

    let shutdown = CancellationToken::new();
    let (bridge, auth) = SessionBridge::new(h.handle.clone(), 8);
    let bridge_task = tokio::spawn(bridge.run(shutdown.clone()));

    auth.send(AuthEvent::LoginSuccess).await.unwrap();
    idle().await;
    assert_eq!(h.handle.state().mode, SyncMode::Syncing);
    assert_eq!(h.handle.state().progress.value(), 25);

    auth.send(AuthEvent::Logout).await.unwrap();
    idle().await;
    assert_eq!(h.handle.state(), SyncState::default());
    assert_eq!(h.backend.calls(), vec![QUERY_PROGRESS, SIGN_OUT]);

    shutdown.cancel();
    bridge_task.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_bridge_stops_when_auth_channel_closes() {
    let h = Harness::start(ScriptedBackend::new());
    let (bridge, auth) = SessionBridge::new(h.handle.clone(), 1);
    let bridge_task = tokio::spawn(bridge.run(CancellationToken::new()));

    drop(auth);

    tokio::time::timeout(Duration::from_secs(1), bridge_task)
        .await
        .expect("bridge should exit when the channel closes")
        .unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_status_timer_raises_checks_at_interval() {
    let h = Harness::start(ScriptedBackend::new());
    let shutdown = CancellationToken::new();
    let timer = tokio::spawn(run_status_timer(
        h.handle.clone(),
        Duration::from_secs(10),
        shutdown.clone(),
    ));

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(h.backend.count(QUERY_PROGRESS), 0, "first check fires after one interval");

    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(h.backend.count(QUERY_PROGRESS), 3);

    shutdown.cancel();
    timer.await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_poller_returns_reply_untouched() {
    let backend = ScriptedBackend::new();
    backend.script_progress(progress(json!("UNKNOWN_FAULT")));
    let poller = ProgressPoller::new(backend.clone());

    let reply = poller.check().await;

    assert_eq!(reply, progress(json!("UNKNOWN_FAULT")));
    assert_eq!(backend.calls(), vec![QUERY_PROGRESS]);
}
