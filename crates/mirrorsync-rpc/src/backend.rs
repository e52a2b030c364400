//! RpcMirrorBackend - IMirrorBackend implementation over JSON-RPC
//!
//! ## Design Notes
//!
//! - Transport, HTTP status and decoding failures never escape as `Err`;
//!   they become the reply's `error` text.
//! - Boolean results follow loose truthiness: `null` is "no result",
//!   numbers are true when non-zero, strings when non-empty.

use async_trait::async_trait;
use serde_json::Value;
use tracing::warn;

use mirrorsync_core::domain::{MirrorReply, ProgressReply};
use mirrorsync_core::ports::IMirrorBackend;

use crate::client::{methods, RpcClient};

/// Mirror backend reached through [`RpcClient`]
#[derive(Debug, Clone)]
pub struct RpcMirrorBackend {
    client: RpcClient,
}

impl RpcMirrorBackend {
    pub fn new(client: RpcClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &RpcClient {
        &self.client
    }

    async fn raw(&self, method: &str) -> MirrorReply<Value> {
        match self.client.call(method).await {
            Ok(response) => response.into_reply(),
            Err(e) => {
                warn!(method, error = %e, "JSON-RPC call failed");
                MirrorReply::failed(e.to_string())
            }
        }
    }

    async fn flag(&self, method: &str) -> MirrorReply<bool> {
        let reply = self.raw(method).await;
        MirrorReply {
            result: reply.result.as_ref().and_then(truthy),
            error: reply.error,
        }
    }
}

fn truthy(value: &Value) -> Option<bool> {
    match value {
        Value::Null => None,
        Value::Bool(b) => Some(*b),
        Value::Number(n) => Some(n.as_f64().is_some_and(|f| f != 0.0)),
        Value::String(s) => Some(!s.is_empty()),
        Value::Array(_) | Value::Object(_) => Some(true),
    }
}

#[async_trait]
impl IMirrorBackend for RpcMirrorBackend {
    async fn enable_mirroring(&self) -> MirrorReply<bool> {
        self.flag(methods::ENABLE_SYNC_MODE).await
    }

    async fn disable_mirroring(&self) -> MirrorReply<bool> {
        self.flag(methods::DISABLE_SYNC_MODE).await
    }

    async fn query_mirror_progress(&self) -> MirrorReply<ProgressReply> {
        let reply = self.raw(methods::GET_SYNC_PROGRESS).await;
        MirrorReply {
            result: reply.result.as_ref().and_then(ProgressReply::from_json),
            error: reply.error,
        }
    }

    async fn sign_out(&self) -> MirrorReply<bool> {
        self.flag(methods::SIGN_OUT).await
    }
}
