//! JSON-RPC HTTP client
//!
//! Every call is a `POST {base}/json-rpc` carrying
//! `{"auth": ..., "method": ..., "params": ...}` and answered with
//! `{"result": ..., "error": ...}`.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use mirrorsync_rpc::client::RpcClient;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let client = RpcClient::new("http://localhost:31339")?.with_auth_token("token");
//! let reply = client.call("getSyncProgress").await?.into_reply();
//! println!("{:?}", reply.result);
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;
use url::Url;

use mirrorsync_core::config::{parse_backend_url, BackendConfig};
use mirrorsync_core::domain::MirrorReply;

use crate::RpcError;

/// Path of the JSON-RPC endpoint below the base URL
const RPC_PATH: &str = "json-rpc";

/// Longest response body kept in an error message
const MAX_ERROR_BODY: usize = 512;

/// Backend method names
pub mod methods {
    pub const ENABLE_SYNC_MODE: &str = "enableSyncMode";
    pub const DISABLE_SYNC_MODE: &str = "disableSyncMode";
    pub const GET_SYNC_PROGRESS: &str = "getSyncProgress";
    pub const SIGN_OUT: &str = "signOut";
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Serialize)]
struct RpcRequest<'a> {
    auth: Option<RpcAuth<'a>>,
    method: &'a str,
    params: Value,
}

#[derive(Debug, Serialize)]
struct RpcAuth<'a> {
    token: &'a str,
}

/// Raw reply body; both members may be absent
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RpcResponse {
    #[serde(default)]
    pub result: Value,
    #[serde(default)]
    pub error: Value,
}

impl RpcResponse {
    /// Converts into a [`MirrorReply`], flattening the error to text
    ///
    /// A `null` result becomes `None`. Structured errors are reduced to
    /// their `message` member, or to their JSON text when there is none.
    pub fn into_reply(self) -> MirrorReply<Value> {
        let result = match self.result {
            Value::Null => None,
            value => Some(value),
        };
        MirrorReply {
            result,
            error: flatten_error(self.error),
        }
    }
}

fn flatten_error(error: Value) -> Option<String> {
    match error {
        Value::Null => None,
        Value::String(text) => Some(text),
        Value::Object(ref map) => match map.get("message") {
            Some(Value::String(message)) => Some(message.clone()),
            _ => Some(error.to_string()),
        },
        other => Some(other.to_string()),
    }
}

// ============================================================================
// RpcClient
// ============================================================================

/// HTTP client for the backend's JSON-RPC endpoint
#[derive(Debug, Clone)]
pub struct RpcClient {
    client: Client,
    endpoint: Url,
    auth_token: Option<String>,
}

impl RpcClient {
    /// Creates a client for `base_url` with reqwest's default settings
    pub fn new(base_url: impl AsRef<str>) -> Result<Self, RpcError> {
        Ok(Self {
            client: Client::new(),
            endpoint: endpoint_for(base_url.as_ref())?,
            auth_token: None,
        })
    }

    /// Creates a client from the `backend` configuration section
    pub fn from_config(config: &BackendConfig) -> Result<Self, RpcError> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()?;
        Ok(Self {
            client,
            endpoint: endpoint_for(&config.url)?,
            auth_token: config.auth_token.clone(),
        })
    }

    /// Sets a request timeout, rebuilding the underlying HTTP client
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, RpcError> {
        self.client = Client::builder().timeout(timeout).build()?;
        Ok(self)
    }

    /// Sets the session token sent with every request
    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    /// Full URL requests are posted to
    pub fn endpoint(&self) -> &str {
        self.endpoint.as_str()
    }

    /// Calls `method` without parameters
    pub async fn call(&self, method: &str) -> Result<RpcResponse, RpcError> {
        self.call_with(method, Value::Null).await
    }

    /// Calls `method` with `params`
    pub async fn call_with(&self, method: &str, params: Value) -> Result<RpcResponse, RpcError> {
        let body = RpcRequest {
            auth: self.auth_token.as_deref().map(|token| RpcAuth { token }),
            method,
            params,
        };

        debug!(method, endpoint = %self.endpoint, "Sending JSON-RPC request");
        let response = self.client.post(self.endpoint.clone()).json(&body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let mut text = response.text().await.unwrap_or_default();
            if text.len() > MAX_ERROR_BODY {
                let mut cut = MAX_ERROR_BODY;
                while !text.is_char_boundary(cut) {
                    cut -= 1;
                }
                text.truncate(cut);
            }
            return Err(RpcError::HttpStatus {
                status: status.as_u16(),
                body: text,
            });
        }

        let bytes = response.bytes().await?;
        let reply: RpcResponse = serde_json::from_slice(&bytes)
            .map_err(|e| RpcError::InvalidResponse(format!("{method}: {e}")))?;
        debug!(method, result = %reply.result, error = %reply.error, "JSON-RPC reply");
        Ok(reply)
    }
}

fn endpoint_for(base_url: &str) -> Result<Url, RpcError> {
    let mut base = parse_backend_url(base_url).map_err(RpcError::InvalidEndpoint)?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.set_query(None);
    base.set_fragment(None);
    base.join(RPC_PATH)
        .map_err(|e| RpcError::InvalidEndpoint(format!("{base_url}: {e}")))
}
