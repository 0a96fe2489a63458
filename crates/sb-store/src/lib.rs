//! Artifact storage for the bridge.
//!
//! Artifacts are single use: whichever caller redeems one first takes
//! the identity payload with it, and everyone else sees nothing. This
//! crate defines the storage contract and ships the in-process
//! implementation the bridge runs with.

#![forbid(unsafe_code)]
#![deny(warnings)]
#![deny(missing_docs)]

pub mod entry;
pub mod memory;
pub mod provider;

pub use entry::ArtifactEntry;
pub use memory::InMemoryArtifactStore;
pub use provider::ArtifactStore;
