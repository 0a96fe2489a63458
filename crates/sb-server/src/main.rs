//! SAML artifact bridge server binary.

#![forbid(unsafe_code)]
#![deny(warnings)]

use sb_server::{Server, ServerConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env()?;

    tracing::info!(
        host = %config.host,
        port = config.port,
        backend = config.policy_backend.as_str(),
        "Starting SAML artifact bridge"
    );

    let server = Server::new(config)?;
    server.run().await
}
