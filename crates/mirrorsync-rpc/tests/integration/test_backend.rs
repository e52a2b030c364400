//! RpcMirrorBackend behaviour against a mocked endpoint

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

use mirrorsync_core::domain::{ProgressReply, SyncProgress};
use mirrorsync_core::ports::IMirrorBackend;

use crate::common;

#[tokio::test]
async fn test_enable_and_disable_map_boolean_results() {
    let (server, backend) = common::setup_rpc_mock().await;
    common::mount_result(&server, "enableSyncMode", json!(true)).await;
    common::mount_result(&server, "disableSyncMode", json!(false)).await;

    let enabled = backend.enable_mirroring().await;
    assert_eq!(enabled.result, Some(true));
    assert!(enabled.succeeded());

    let disabled = backend.disable_mirroring().await;
    assert_eq!(disabled.result, Some(false));
    assert!(disabled.error.is_none());
}

#[tokio::test]
async fn test_progress_is_decoded_once() {
    let (server, backend) = common::setup_rpc_mock().await;
    common::mount_result(&server, "getSyncProgress", json!(42)).await;

    let reply = backend.query_mirror_progress().await;

    assert_eq!(
        reply.result,
        Some(ProgressReply::Percent(SyncProgress::new(42).unwrap()))
    );
}

#[tokio::test]
async fn test_progress_sentinels_are_classified() {
    let (server, backend) = common::setup_rpc_mock().await;
    common::mount_result(
        &server,
        "getSyncProgress",
        json!("ServerAvailabilityError: upstream timeout"),
    )
    .await;

    let reply = backend.query_mirror_progress().await;

    let progress = reply.result.expect("decoded reply");
    assert!(progress.is_transient());
    assert_eq!(progress.kind(), "server_unavailable");
}

#[tokio::test]
async fn test_null_result_is_no_result() {
    let (server, backend) = common::setup_rpc_mock().await;
    common::mount_method(&server, "getSyncProgress", json!({})).await;

    let reply = backend.query_mirror_progress().await;

    assert!(reply.result.is_none());
    assert!(reply.error.is_none());
}

#[tokio::test]
async fn test_structured_error_is_flattened() {
    let (server, backend) = common::setup_rpc_mock().await;
    common::mount_method(
        &server,
        "signOut",
        json!({"result": null, "error": {"code": 401, "message": "Session expired"}}),
    )
    .await;

    let reply = backend.sign_out().await;

    assert!(reply.result.is_none());
    assert_eq!(reply.error.as_deref(), Some("Session expired"));
}

#[tokio::test]
async fn test_http_error_becomes_reply_error() {
    let (server, backend) = common::setup_rpc_mock().await;
    Mock::given(method("POST"))
        .and(path("/json-rpc"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let reply = backend.enable_mirroring().await;

    assert!(reply.result.is_none());
    let error = reply.error.expect("error folded into reply");
    assert!(error.contains("503"), "unexpected error text: {error}");
    assert!(error.contains("maintenance"));
}

#[tokio::test]
async fn test_undecodable_body_becomes_reply_error() {
    let (server, backend) = common::setup_rpc_mock().await;
    Mock::given(method("POST"))
        .and(path("/json-rpc"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy</html>"))
        .mount(&server)
        .await;

    let reply = backend.query_mirror_progress().await;

    assert!(reply.result.is_none());
    assert!(reply.error.unwrap().starts_with("Invalid response"));
}

#[tokio::test]
async fn test_unreachable_endpoint_becomes_reply_error() {
    let server = wiremock::MockServer::start().await;
    let uri = server.uri();
    drop(server);

    let client = mirrorsync_rpc::RpcClient::new(uri).unwrap();
    let backend = mirrorsync_rpc::RpcMirrorBackend::new(client);

    let reply = backend.disable_mirroring().await;

    assert!(reply.result.is_none());
    assert!(reply.error.unwrap().starts_with("Network error"));
}
