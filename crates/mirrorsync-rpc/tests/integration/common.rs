//! Shared wiremock helpers for the JSON-RPC endpoint

use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use mirrorsync_rpc::{RpcClient, RpcMirrorBackend};

/// Starts a mock server and a backend pointed at it
pub async fn setup_rpc_mock() -> (MockServer, RpcMirrorBackend) {
    let server = MockServer::start().await;
    let client = RpcClient::new(server.uri())
        .expect("mock server URI is valid")
        .with_auth_token("test-token");
    (server, RpcMirrorBackend::new(client))
}

/// Mounts a reply for one JSON-RPC method
pub async fn mount_method(server: &MockServer, rpc_method: &str, body: Value) {
    Mock::given(method("POST"))
        .and(path("/json-rpc"))
        .and(body_partial_json(json!({ "method": rpc_method })))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Mounts a successful `{result}` reply
pub async fn mount_result(server: &MockServer, rpc_method: &str, result: Value) {
    mount_method(server, rpc_method, json!({ "result": result, "error": null })).await;
}
