//! Request shape sent by RpcClient

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use mirrorsync_core::config::ConfigBuilder;
use mirrorsync_rpc::RpcClient;

use crate::common;

#[tokio::test]
async fn test_request_carries_auth_method_and_params() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/json-rpc"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({
            "auth": {"token": "test-token"},
            "method": "enableSyncMode",
            "params": null
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": true})))
        .expect(1)
        .mount(&server)
        .await;

    let client = RpcClient::new(server.uri())
        .unwrap()
        .with_auth_token("test-token");
    let reply = client.call("enableSyncMode").await.unwrap().into_reply();

    assert_eq!(reply.result, Some(json!(true)));
}

#[tokio::test]
async fn test_anonymous_request_sends_null_auth() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/json-rpc"))
        .and(body_json(json!({"auth": null, "method": "getSyncProgress", "params": null})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"result": 7})))
        .expect(1)
        .mount(&server)
        .await;

    let client = RpcClient::new(server.uri()).unwrap();
    let reply = client.call("getSyncProgress").await.unwrap();

    assert_eq!(reply.result, json!(7));
}

#[tokio::test]
async fn test_client_from_config() {
    let (server, _backend) = common::setup_rpc_mock().await;
    common::mount_result(&server, "signOut", json!(true)).await;

    let config = ConfigBuilder::new()
        .backend_url(format!("{}/", server.uri()))
        .backend_auth_token("cfg-token")
        .build();
    let client = RpcClient::from_config(&config.backend).unwrap();

    assert_eq!(client.endpoint(), format!("{}/json-rpc", server.uri()));
    let reply = client.call("signOut").await.unwrap().into_reply();
    assert_eq!(reply.result, Some(json!(true)));
}
