//! Operator diagnostics endpoint.
//!
//! A JSON snapshot of the running configuration and cache occupancy.
//! Subjects, artifacts, and other per-request data never appear here;
//! the audit log is the place for those.

use axum::extract::State;
use axum::response::{IntoResponse, Json, Response};
use chrono::Utc;
use serde::Serialize;
use tracing::warn;

use crate::state::BridgeState;

/// Diagnostics snapshot.
#[derive(Debug, Serialize)]
pub struct DiagnosticsResponse {
    /// Service name.
    pub name: &'static str,
    /// Crate version.
    pub version: &'static str,
    /// Issuer entity id stamped on outbound messages.
    pub issuer: String,
    /// Selected policy backend.
    pub policy_backend: &'static str,
    /// Validity window of rendered assertions in seconds.
    pub assertion_validity_secs: i64,
    /// Clock-skew tolerance in seconds.
    pub clock_skew_secs: i64,
    /// Artifact time-to-live in seconds.
    pub artifact_ttl_secs: i64,
    /// Artifacts currently redeemable.
    pub live_artifacts: usize,
    /// Seconds since the server state was assembled.
    pub uptime_secs: i64,
}

/// `GET /diagnostics`: configuration and occupancy snapshot.
pub async fn diagnostics(State(state): State<BridgeState>) -> Response {
    let live_artifacts = match state.store.live_count().await {
        Ok(count) => count,
        Err(err) => {
            warn!(%err, "live count unavailable");
            0
        }
    };

    Json(DiagnosticsResponse {
        name: "saml-artifact-bridge",
        version: env!("CARGO_PKG_VERSION"),
        issuer: state.builder.issuer().to_string(),
        policy_backend: state.gateway.backend_name(),
        assertion_validity_secs: state.config.bridge.validity_secs,
        clock_skew_secs: state.config.bridge.clock_skew_secs,
        artifact_ttl_secs: state.config.bridge.artifact_ttl_secs,
        live_artifacts,
        uptime_secs: (Utc::now() - state.started_at).num_seconds(),
    })
    .into_response()
}
