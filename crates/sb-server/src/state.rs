//! Application state management.
//!
//! The shared state passed to all request handlers: the artifact
//! store, the response builder, and the authorization gateway, all
//! assembled once from configuration at startup.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use sb_authz::{AllowAllBackend, AuthorizationGateway, HeadProbeBackend, PolicyBackend};
use sb_core::BridgeResult;
use sb_protocol::ResponseBuilder;
use sb_store::{ArtifactStore, InMemoryArtifactStore};

use crate::config::{PolicyBackendKind, ServerConfig};

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct BridgeState {
    /// Server configuration.
    pub config: ServerConfig,

    /// Published-artifact storage.
    pub store: Arc<dyn ArtifactStore>,

    /// Outbound response rendering.
    pub builder: Arc<ResponseBuilder>,

    /// Authorization decision orchestration.
    pub gateway: Arc<AuthorizationGateway>,

    /// Instant the state was assembled, reported as uptime.
    pub started_at: DateTime<Utc>,
}

impl BridgeState {
    /// Assembles the state from configuration.
    ///
    /// Fails only if the selected policy backend cannot be
    /// constructed.
    pub fn new(config: ServerConfig) -> BridgeResult<Self> {
        let backend: Arc<dyn PolicyBackend> = match config.policy_backend {
            PolicyBackendKind::AllowAll => Arc::new(AllowAllBackend),
            PolicyBackendKind::HeadProbe => {
                Arc::new(HeadProbeBackend::new(config.bridge.decision_timeout())?)
            }
        };
        let gateway = AuthorizationGateway::new(
            backend,
            config.bridge.decision_timeout(),
            config.bridge.max_concurrent_decisions,
        );

        Ok(Self {
            store: Arc::new(InMemoryArtifactStore::new()),
            builder: Arc::new(ResponseBuilder::new(&config.bridge)),
            gateway: Arc::new(gateway),
            started_at: Utc::now(),
            config,
        })
    }

    /// Returns the server configuration.
    #[must_use]
    pub const fn config(&self) -> &ServerConfig {
        &self.config
    }
}
