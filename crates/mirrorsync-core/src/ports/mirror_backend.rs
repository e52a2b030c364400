//! Mirror backend port (driven/secondary port)
//!
//! The four operations the coordinator needs from the mirroring backend.
//! Every call is an idempotent request/response.
//!
//! ## Design Notes
//!
//! - Methods return a plain [`MirrorReply`] rather than a `Result`: transport
//!   failures are folded into `MirrorReply::error` by the adapter, so the
//!   coordinator handles one error channel.
//! - Progress replies are decoded by the adapter into [`ProgressReply`].

use crate::domain::{MirrorReply, ProgressReply};

/// Operation names used in error notices and logs
pub mod operation {
    pub const ENABLE: &str = "enableMirroring";
    pub const DISABLE: &str = "disableMirroring";
    pub const QUERY_PROGRESS: &str = "queryMirrorProgress";
    pub const SIGN_OUT: &str = "signOut";
}

/// Port trait for the mirroring backend
#[async_trait::async_trait]
pub trait IMirrorBackend: Send + Sync {
    /// Starts mirroring remote data into the local store
    async fn enable_mirroring(&self) -> MirrorReply<bool>;

    /// Stops mirroring
    async fn disable_mirroring(&self) -> MirrorReply<bool>;

    /// Reads the current mirroring progress
    async fn query_mirror_progress(&self) -> MirrorReply<ProgressReply>;

    /// Ends the backend session
    async fn sign_out(&self) -> MirrorReply<bool>;
}
