//! Protocol endpoint handlers.
//!
//! Handlers stay thin: each delegates to a `process_*` function that
//! returns `BridgeResult`, then turns the outcome into an HTTP
//! response. Protocol errors leave as fault documents on a 200, not
//! as HTTP error codes; the appliance reads the status element, not
//! the transport status. The JSON publish seam is the exception and
//! speaks plain HTTP.

use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use sb_core::event::{Event, EventType};
use sb_core::{BridgeError, BridgeResult};
use sb_protocol::{
    complete_reply_to, parse_artifact_resolve, parse_authz_query, random, DecisionOutcome,
    ResolveContext,
};
use sb_store::ArtifactEntry;

use crate::state::BridgeState;

/// `POST /resolve`: the artifact resolution service.
pub async fn resolve(
    State(state): State<BridgeState>,
    headers: HeaderMap,
    body: String,
) -> Response {
    match process_resolve(&state, &headers, &body).await {
        Ok(xml) => xml_response(xml),
        Err(err) => xml_response(state.builder.fault(&err)),
    }
}

/// `POST /authz`: the authorization decision service.
pub async fn authorize(State(state): State<BridgeState>, body: String) -> Response {
    match process_authorize(&state, &body).await {
        Ok(xml) => xml_response(xml),
        Err(err) => xml_response(state.builder.fault(&err)),
    }
}

/// Body of the publish seam used by the authentication front end.
#[derive(Debug, Deserialize)]
pub struct PublishRequest {
    /// Principal the artifact will assert.
    pub subject: String,
    /// Message id of the authentication request being answered.
    pub authn_request_id: String,
    /// Where the appliance asked to receive the assertion.
    pub reply_to: String,
    /// Artifact token to publish under; generated when omitted.
    #[serde(default)]
    pub artifact: Option<String>,
}

/// Acknowledgement returned for a published artifact.
#[derive(Debug, Serialize)]
pub struct PublishResponse {
    /// The artifact token the appliance will present back.
    pub artifact: String,
    /// When the artifact stops being redeemable.
    pub expires_at: DateTime<Utc>,
}

/// `POST /publish`: hands a freshly authenticated identity to the
/// bridge and receives the artifact to send the appliance.
pub async fn publish(
    State(state): State<BridgeState>,
    Json(request): Json<PublishRequest>,
) -> Response {
    match process_publish(&state, request).await {
        Ok(ack) => (StatusCode::CREATED, Json(ack)).into_response(),
        Err(err) => error_json(&err),
    }
}

async fn process_resolve(
    state: &BridgeState,
    headers: &HeaderMap,
    body: &str,
) -> BridgeResult<String> {
    let request = match parse_artifact_resolve(body) {
        Ok(request) => request,
        Err(err) => {
            Event::builder(EventType::MalformedRequest)
                .failure(err.to_string())
                .detail("endpoint", "resolve")
                .build()
                .emit();
            return Err(err);
        }
    };

    let entry = match state.store.take_once(&request.artifact).await? {
        Some(entry) => entry,
        None => {
            Event::builder(EventType::UnknownArtifact)
                .failure("artifact not found")
                .detail("artifact", request.artifact.as_str())
                .detail("requester", request.issuer.as_str())
                .build()
                .emit();
            return Err(BridgeError::UnknownArtifact);
        }
    };

    let host = request_host(headers, state);
    let recipient = complete_reply_to(&entry.reply_to, &host);
    let response = state.builder.artifact_response(&ResolveContext {
        in_response_to: &request.request_id,
        subject: &entry.subject,
        authn_request_id: &entry.authn_request_id,
        recipient: &recipient,
        audience: &request.issuer,
    })?;

    Event::builder(EventType::ArtifactResolved)
        .subject(entry.subject.as_str())
        .detail("artifact", request.artifact.as_str())
        .detail("requester", request.issuer.as_str())
        .build()
        .emit();

    Ok(response)
}

async fn process_authorize(state: &BridgeState, body: &str) -> BridgeResult<String> {
    let query = match parse_authz_query(body) {
        Ok(query) => query,
        Err(err) => {
            Event::builder(EventType::MalformedRequest)
                .failure(err.to_string())
                .detail("endpoint", "authz")
                .build()
                .emit();
            return Err(err);
        }
    };

    let decisions = state
        .gateway
        .decide_batch(&query.subject, &query.resources)
        .await;
    let response = state.builder.authz_response(&query.subject, &decisions)?;

    let permits = count(&decisions, DecisionOutcome::Permit);
    let denies = count(&decisions, DecisionOutcome::Deny);
    let indeterminate = decisions.len() - permits - denies;
    Event::builder(EventType::AuthorizationDecided)
        .subject(query.subject.as_str())
        .detail("backend", state.gateway.backend_name())
        .detail("permit", permits.to_string())
        .detail("deny", denies.to_string())
        .detail("indeterminate", indeterminate.to_string())
        .build()
        .emit();

    Ok(response)
}

async fn process_publish(
    state: &BridgeState,
    request: PublishRequest,
) -> BridgeResult<PublishResponse> {
    if request.subject.trim().is_empty() {
        return Err(BridgeError::MalformedRequest(
            "subject must not be empty".to_string(),
        ));
    }
    if request.authn_request_id.trim().is_empty() {
        return Err(BridgeError::MalformedRequest(
            "authn_request_id must not be empty".to_string(),
        ));
    }

    let artifact = request
        .artifact
        .filter(|artifact| !artifact.trim().is_empty())
        .unwrap_or_else(random::artifact_token);

    let entry = ArtifactEntry::new(
        request.subject.as_str(),
        request.authn_request_id.as_str(),
        request.reply_to.as_str(),
        state.config.bridge.artifact_ttl(),
    );
    let expires_at = entry.expires_at;
    state.store.publish(&artifact, entry).await?;

    Event::builder(EventType::ArtifactPublished)
        .subject(request.subject.as_str())
        .detail("artifact", artifact.as_str())
        .build()
        .emit();

    Ok(PublishResponse {
        artifact,
        expires_at,
    })
}

fn count(decisions: &[sb_protocol::Decision], outcome: DecisionOutcome) -> usize {
    decisions.iter().filter(|d| d.outcome == outcome).count()
}

fn request_host(headers: &HeaderMap, state: &BridgeState) -> String {
    headers
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| format!("{}:{}", state.config.host, state.config.port))
}

fn xml_response(xml: String) -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/xml; charset=utf-8")],
        xml,
    )
        .into_response()
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

fn error_json(err: &BridgeError) -> Response {
    let status =
        StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
        .into_response()
}
