//! mirrorsync RPC - JSON-RPC adapter for the mirroring backend
//!
//! Provides:
//! - A small HTTP client for the backend's `/json-rpc` endpoint
//! - An [`IMirrorBackend`](mirrorsync_core::ports::IMirrorBackend) implementation
//!   that folds transport failures into reply errors
//!
//! ## Modules
//!
//! - [`client`] - Request/response plumbing and error flattening
//! - [`backend`] - The mirror backend port implementation

pub mod backend;
pub mod client;

use thiserror::Error;

pub use backend::RpcMirrorBackend;
pub use client::RpcClient;

/// Errors that can occur when talking to the JSON-RPC endpoint
#[derive(Debug, Error)]
pub enum RpcError {
    /// A network-level error occurred
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// The endpoint answered with a non-success HTTP status
    #[error("HTTP {status}: {body}")]
    HttpStatus {
        /// HTTP status code
        status: u16,
        /// Response body, possibly truncated
        body: String,
    },

    /// The response body was not a JSON-RPC reply
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The configured endpoint URL is unusable
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),
}
