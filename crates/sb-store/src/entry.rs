//! The value stored under a published artifact.

use chrono::{DateTime, Duration, Utc};

/// A published artifact's identity payload and expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactEntry {
    /// Authenticated principal the artifact was issued for.
    pub subject: String,
    /// Message id of the authentication request that started the
    /// exchange, echoed into the assertion for correlation.
    pub authn_request_id: String,
    /// Where the assertion consumer asked to be answered. May be a
    /// relative path; it is completed against the resolver's host
    /// header at redemption time.
    pub reply_to: String,
    /// Instant the entry stops being redeemable.
    pub expires_at: DateTime<Utc>,
}

impl ArtifactEntry {
    /// Creates an entry that expires `ttl` from now.
    #[must_use]
    pub fn new(
        subject: impl Into<String>,
        authn_request_id: impl Into<String>,
        reply_to: impl Into<String>,
        ttl: Duration,
    ) -> Self {
        Self {
            subject: subject.into(),
            authn_request_id: authn_request_id.into(),
            reply_to: reply_to.into(),
            expires_at: Utc::now() + ttl,
        }
    }

    /// Whether the entry is at or past its expiry.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}
