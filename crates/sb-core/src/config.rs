//! Bridge configuration values.
//!
//! These are the knobs the core components consume; loading them from the
//! environment is the server crate's concern.

use serde::{Deserialize, Serialize};

/// Configuration consumed by the bridge core.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Entity ID used as the issuer of outbound protocol messages.
    ///
    /// When empty, responses fall back to the local hostname and the
    /// fallback is logged.
    pub issuer_entity_id: String,

    /// Validity window of rendered responses in seconds
    /// (`notOnOrAfter = instant + validity`).
    pub validity_secs: i64,

    /// Clock-skew tolerance in seconds (`notBefore = instant - skew`).
    pub clock_skew_secs: i64,

    /// Time-to-live for unresolved artifacts in seconds.
    pub artifact_ttl_secs: i64,

    /// Deadline for a single policy decision in milliseconds.
    pub decision_timeout_ms: u64,

    /// Upper bound on concurrently evaluated decisions within one batch.
    pub max_concurrent_decisions: usize,
}

impl BridgeConfig {
    /// Returns the response validity window.
    #[must_use]
    pub fn validity(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.validity_secs)
    }

    /// Returns the clock-skew tolerance.
    #[must_use]
    pub fn clock_skew(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.clock_skew_secs)
    }

    /// Returns the artifact time-to-live.
    #[must_use]
    pub fn artifact_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.artifact_ttl_secs)
    }

    /// Returns the per-decision deadline.
    #[must_use]
    pub const fn decision_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.decision_timeout_ms)
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            issuer_entity_id: String::new(),
            validity_secs: 300,
            clock_skew_secs: 60,
            artifact_ttl_secs: 300,
            decision_timeout_ms: 5_000,
            max_concurrent_decisions: 8,
        }
    }
}
