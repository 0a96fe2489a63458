//! In-process artifact storage.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::debug;

use sb_core::{BridgeError, BridgeResult};

use crate::entry::ArtifactEntry;
use crate::provider::ArtifactStore;

/// Artifact storage backed by a concurrent in-process map.
///
/// This matches the topology the artifact exchange assumes: the
/// appliance resolves an artifact against the same host that issued
/// it, so entries never need to leave the process.
#[derive(Debug, Default)]
pub struct InMemoryArtifactStore {
    entries: DashMap<String, ArtifactEntry>,
}

impl InMemoryArtifactStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }
}

#[async_trait]
impl ArtifactStore for InMemoryArtifactStore {
    async fn publish(&self, artifact: &str, entry: ArtifactEntry) -> BridgeResult<()> {
        match self.entries.entry(artifact.to_string()) {
            Entry::Occupied(occupied) if !occupied.get().is_expired() => {
                Err(BridgeError::DuplicateArtifact(artifact.to_string()))
            }
            Entry::Occupied(mut occupied) => {
                occupied.insert(entry);
                Ok(())
            }
            Entry::Vacant(vacant) => {
                vacant.insert(entry);
                Ok(())
            }
        }
    }

    async fn take_once(&self, artifact: &str) -> BridgeResult<Option<ArtifactEntry>> {
        // The remove is the atomicity point: under a race, only one
        // caller gets the (key, entry) pair back.
        Ok(self
            .entries
            .remove(artifact)
            .map(|(_, entry)| entry)
            .filter(|entry| !entry.is_expired()))
    }

    async fn purge_expired(&self) -> BridgeResult<usize> {
        let before = self.entries.len();
        let now = Utc::now();
        self.entries.retain(|_, entry| entry.expires_at > now);
        let evicted = before.saturating_sub(self.entries.len());
        if evicted > 0 {
            debug!(evicted, "expired artifacts purged");
        }
        Ok(evicted)
    }

    async fn live_count(&self) -> BridgeResult<usize> {
        let now = Utc::now();
        Ok(self
            .entries
            .iter()
            .filter(|item| item.value().expires_at > now)
            .count())
    }
}
