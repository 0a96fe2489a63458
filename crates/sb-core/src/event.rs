//! Audit event logging for the bridge.
//!
//! Security-relevant occurrences (artifact lifecycle, request rejection,
//! backend trouble) are recorded as structured events so an operator can
//! reconstruct what the bridge saw without scraping free-form log lines.
//!
//! Every event carries:
//! - Timestamp (UTC)
//! - Event type
//! - Outcome (success/failure)
//! - Subject identity (when available)
//! - Source IP (when available)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Event type categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    // Artifact lifecycle
    /// Artifact entered the cache via the login-flow seam.
    ArtifactPublished,
    /// Artifact exchanged for its entry.
    ArtifactResolved,
    /// Resolution attempted for an absent or already-consumed artifact.
    UnknownArtifact,
    /// Expired artifacts evicted by the sweeper.
    ArtifactsExpired,

    // Request handling
    /// Inbound document rejected before processing.
    MalformedRequest,
    /// Authorization batch decided.
    AuthorizationDecided,

    // Backend trouble
    /// Policy backend returned an error.
    PolicyBackendError,
    /// A policy decision exceeded its deadline.
    DecisionTimeout,

    // Rendering
    /// Issuer fell back to the local hostname.
    FallbackIssuer,
}

/// Outcome of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventOutcome {
    /// Operation succeeded.
    Success,
    /// Operation failed.
    Failure,
}

/// A security event for audit logging.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Unique event identifier.
    pub id: Uuid,

    /// Timestamp of the event.
    pub timestamp: DateTime<Utc>,

    /// Type of event.
    pub event_type: EventType,

    /// Outcome of the event.
    pub outcome: EventOutcome,

    /// Subject associated with the event.
    pub subject: Option<String>,

    /// Source IP address.
    pub ip_address: Option<String>,

    /// Error message (for failure events).
    pub error: Option<String>,

    /// Additional details as key-value pairs.
    pub details: Vec<(String, String)>,
}

impl Event {
    /// Creates a new event builder.
    #[must_use]
    pub const fn builder(event_type: EventType) -> EventBuilder {
        EventBuilder::new(event_type)
    }

    /// Emits the event through the tracing pipeline.
    ///
    /// Failures log at warn so replay attempts and backend trouble stand
    /// out at default filter levels.
    pub fn emit(&self) {
        let payload = serde_json::to_string(self).unwrap_or_else(|_| format!("{self:?}"));
        match self.outcome {
            EventOutcome::Success => tracing::info!(target: "sb_audit", event = %payload),
            EventOutcome::Failure => tracing::warn!(target: "sb_audit", event = %payload),
        }
    }
}

/// Builder for creating events.
pub struct EventBuilder {
    event_type: EventType,
    outcome: EventOutcome,
    subject: Option<String>,
    ip_address: Option<String>,
    error: Option<String>,
    details: Vec<(String, String)>,
}

impl EventBuilder {
    /// Creates a new event builder.
    #[must_use]
    pub const fn new(event_type: EventType) -> Self {
        Self {
            event_type,
            outcome: EventOutcome::Success,
            subject: None,
            ip_address: None,
            error: None,
            details: Vec::new(),
        }
    }

    /// Sets the outcome to success.
    #[must_use]
    pub const fn success(mut self) -> Self {
        self.outcome = EventOutcome::Success;
        self
    }

    /// Sets the outcome to failure with an error message.
    #[must_use]
    pub fn failure(mut self, error: impl Into<String>) -> Self {
        self.outcome = EventOutcome::Failure;
        self.error = Some(error.into());
        self
    }

    /// Sets the subject.
    #[must_use]
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Sets the source IP address.
    #[must_use]
    pub fn ip_address(mut self, ip: impl Into<String>) -> Self {
        self.ip_address = Some(ip.into());
        self
    }

    /// Adds a detail key-value pair.
    #[must_use]
    pub fn detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.push((key.into(), value.into()));
        self
    }

    /// Builds the event.
    #[must_use]
    pub fn build(self) -> Event {
        Event {
            id: Uuid::now_v7(),
            timestamp: Utc::now(),
            event_type: self.event_type,
            outcome: self.outcome,
            subject: self.subject,
            ip_address: self.ip_address,
            error: self.error,
            details: self.details,
        }
    }
}
