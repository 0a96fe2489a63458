//! Error handling for the SAML artifact bridge.
//!
//! Error messages are informative for operators while not exposing
//! information an attacker could use to probe the artifact cache.

use thiserror::Error;

/// Result type alias using the bridge error type.
pub type BridgeResult<T> = std::result::Result<T, BridgeError>;

/// Main error type for bridge operations.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Inbound document failed to parse or is missing a required field.
    ///
    /// Rejected before any store or backend interaction takes place.
    #[error("malformed request: {0}")]
    MalformedRequest(String),

    /// Artifact is absent or was already consumed.
    ///
    /// The message is deliberately generic: a replayed artifact and a
    /// never-issued artifact must be indistinguishable to the caller.
    #[error("artifact resolution failed")]
    UnknownArtifact,

    /// An artifact was published while a live entry already holds the key.
    #[error("artifact already published: {0}")]
    DuplicateArtifact(String),

    /// The policy backend failed to produce a decision.
    #[error("policy backend error: {0}")]
    PolicyBackend(String),

    /// A single policy decision exceeded its deadline.
    #[error("policy decision timed out")]
    DecisionTimeout,

    /// Response rendering failed.
    #[error("response rendering failed: {0}")]
    Render(String),

    /// Invalid bridge configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl BridgeError {
    /// Returns whether this error should be logged at error level.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        matches!(
            self,
            Self::PolicyBackend(_) | Self::Render(_) | Self::Config(_) | Self::Internal(_)
        )
    }

    /// Returns whether this error represents a client error.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::MalformedRequest(_) | Self::UnknownArtifact | Self::DuplicateArtifact(_)
        )
    }

    /// Returns the HTTP status code for this error.
    ///
    /// Used by the JSON surfaces (publish seam, diagnostics); the protocol
    /// endpoints answer with fault documents instead.
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        match self {
            Self::MalformedRequest(_) => 400,
            Self::UnknownArtifact => 403,
            Self::DuplicateArtifact(_) => 409,
            Self::DecisionTimeout => 504,
            Self::PolicyBackend(_) | Self::Render(_) | Self::Config(_) | Self::Internal(_) => 500,
        }
    }
}
