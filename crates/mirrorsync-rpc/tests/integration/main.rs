//! Integration tests for mirrorsync-rpc
//!
//! Uses wiremock to simulate the backend's JSON-RPC endpoint and verifies
//! request shape, reply decoding and error folding end to end.

mod common;

mod test_backend;
mod test_client;
