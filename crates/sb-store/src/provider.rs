//! Storage contract for published artifacts.

use async_trait::async_trait;

use sb_core::BridgeResult;

use crate::entry::ArtifactEntry;

/// Storage for single-use artifacts.
///
/// Implementations must make `take_once` an atomic read-and-remove:
/// when several callers race to redeem the same artifact, exactly one
/// of them receives the entry.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Publishes an entry under an artifact token.
    ///
    /// Fails with [`sb_core::BridgeError::DuplicateArtifact`] when the
    /// token already maps to a live entry. An expired occupant does
    /// not count as a collision and is replaced.
    async fn publish(&self, artifact: &str, entry: ArtifactEntry) -> BridgeResult<()>;

    /// Atomically removes and returns the live entry for an artifact.
    ///
    /// Returns `None` for unknown, already redeemed, and expired
    /// artifacts alike; callers cannot tell the cases apart.
    async fn take_once(&self, artifact: &str) -> BridgeResult<Option<ArtifactEntry>>;

    /// Drops every expired entry, returning how many were removed.
    async fn purge_expired(&self) -> BridgeResult<usize>;

    /// Number of live entries currently held.
    async fn live_count(&self) -> BridgeResult<usize>;
}
