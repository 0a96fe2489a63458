//! Router configuration.
//!
//! This module creates the main Axum router that combines all
//! endpoints.

use axum::{http::StatusCode, response::Json, routing::get, routing::post, Router};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::diagnostics;
use crate::handlers;
use crate::state::BridgeState;

/// Creates the main application router.
pub fn create_router(state: BridgeState) -> Router {
    // Protocol endpoints the appliance talks to, plus the publish
    // seam for the authentication front end
    let protocol = Router::new()
        .route("/resolve", post(handlers::resolve))
        .route("/authz", post(handlers::authorize))
        .route("/publish", post(handlers::publish))
        .with_state(state.clone());

    // Operator endpoints
    let operational = Router::new()
        .route("/diagnostics", get(diagnostics::diagnostics))
        .with_state(state);

    // Health check routes
    let health = Router::new()
        .route("/health", get(health_check))
        .route("/health/live", get(liveness_check))
        .route("/health/ready", get(readiness_check));

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(protocol)
        .merge(operational)
        .merge(health)
        .route("/", get(root))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// Root endpoint handler.
async fn root() -> Json<ServerInfo> {
    Json(ServerInfo {
        name: "SAML Artifact Bridge".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        documentation: "https://github.com/saml-bridge/saml-bridge-rs".to_string(),
    })
}

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<String>,
}

/// Server information response.
#[derive(Serialize)]
pub struct ServerInfo {
    name: String,
    version: String,
    documentation: String,
}

/// Basic health check.
async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: Some(env!("CARGO_PKG_VERSION").to_string()),
    })
}

/// Kubernetes liveness probe.
async fn liveness_check() -> StatusCode {
    StatusCode::OK
}

/// Kubernetes readiness probe.
async fn readiness_check() -> StatusCode {
    StatusCode::OK
}
