//! # sb-server
//!
//! HTTP server for the SAML artifact bridge.
//!
//! This crate assembles the bridge from its parts and exposes them
//! over HTTP:
//! - artifact resolution and authorization decision endpoints for the
//!   search appliance
//! - the publish seam the authentication front end hands identities to
//! - diagnostics and health check endpoints
//!
//! ## Usage
//!
//! ```ignore
//! use sb_server::{Server, ServerConfig};
//!
//! let config = ServerConfig::from_env()?;
//! let server = Server::new(config)?;
//! server.run().await?;
//! ```

#![forbid(unsafe_code)]
#![deny(warnings)]
#![deny(missing_docs)]

pub mod config;
pub mod diagnostics;
pub mod handlers;
pub mod router;
pub mod state;

pub use config::ServerConfig;
pub use router::create_router;
pub use state::BridgeState;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::warn;

use sb_core::event::{Event, EventType};
use sb_store::ArtifactStore;

/// The SAML artifact bridge server.
pub struct Server {
    config: ServerConfig,
    state: BridgeState,
}

impl Server {
    /// Creates a new server instance.
    ///
    /// This assembles the shared state and validates the policy
    /// backend selection.
    pub fn new(config: ServerConfig) -> anyhow::Result<Self> {
        let state = BridgeState::new(config.clone())?;
        tracing::info!(
            issuer = state.builder.issuer(),
            backend = state.gateway.backend_name(),
            "bridge state assembled"
        );
        Ok(Self { config, state })
    }

    /// Runs the server.
    ///
    /// This starts the HTTP server and blocks until it receives a
    /// shutdown signal. The expired-artifact sweeper runs alongside
    /// and stops with the server.
    pub async fn run(self) -> anyhow::Result<()> {
        let sweeper = spawn_sweeper(
            Arc::clone(&self.state.store),
            self.config.sweep_interval(),
        );

        let app = create_router(self.state.clone());

        let addr: SocketAddr = format!("{}:{}", self.config.host, self.config.port).parse()?;
        let listener = TcpListener::bind(addr).await?;

        tracing::info!("Bridge listening on http://{}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        sweeper.abort();
        tracing::info!("Server shutdown complete");
        Ok(())
    }

    /// Returns the server configuration.
    #[must_use]
    pub const fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Returns the shared state.
    #[must_use]
    pub const fn state(&self) -> &BridgeState {
        &self.state
    }

    /// Creates a test router without starting the server.
    ///
    /// This is useful for integration testing.
    pub fn test_router(&self) -> Router {
        create_router(self.state.clone())
    }
}

/// Spawns the periodic sweep that drops expired artifacts.
fn spawn_sweeper(store: Arc<dyn ArtifactStore>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            match store.purge_expired().await {
                Ok(0) => {}
                Ok(evicted) => {
                    Event::builder(EventType::ArtifactsExpired)
                        .detail("evicted", evicted.to_string())
                        .build()
                        .emit();
                }
                Err(err) => warn!(%err, "artifact sweep failed"),
            }
        }
    })
}

/// Waits for a shutdown signal.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
