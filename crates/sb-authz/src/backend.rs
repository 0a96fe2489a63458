//! Policy backends the gateway consults.

use async_trait::async_trait;
use reqwest::StatusCode;

use sb_core::{BridgeError, BridgeResult};
use sb_protocol::DecisionOutcome;

/// A single-resource policy oracle.
///
/// `check` answers whether `subject` may retrieve `resource`. An
/// error is how a backend reports its own failure; the gateway turns
/// any error into an indeterminate decision instead of failing the
/// batch.
#[async_trait]
pub trait PolicyBackend: Send + Sync {
    /// Short name used in logs and diagnostics.
    fn name(&self) -> &'static str;

    /// Decides whether `subject` may retrieve `resource`.
    async fn check(&self, subject: &str, resource: &str) -> BridgeResult<DecisionOutcome>;
}

/// Backend that permits everything.
///
/// The stance of deployments where the content servers enforce access
/// on their own connections and the bridge only vouches for identity.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAllBackend;

#[async_trait]
impl PolicyBackend for AllowAllBackend {
    fn name(&self) -> &'static str {
        "allow_all"
    }

    async fn check(&self, _subject: &str, _resource: &str) -> BridgeResult<DecisionOutcome> {
        Ok(DecisionOutcome::Permit)
    }
}

/// Backend that probes the resource itself with a HEAD request.
///
/// The subject travels in a request header so the content server can
/// apply its own rules. Success and redirect answers permit, 401 and
/// 403 deny, anything else is indeterminate. Redirects are not
/// followed; the first status is the answer.
#[derive(Debug, Clone)]
pub struct HeadProbeBackend {
    client: reqwest::Client,
}

impl HeadProbeBackend {
    /// Header carrying the subject on probe requests.
    pub const SUBJECT_HEADER: &'static str = "x-authz-subject";

    /// Creates a probe backend with its own HTTP client.
    ///
    /// `probe_timeout` caps each probe at the transport level,
    /// independently of the gateway's own decision timeout.
    pub fn new(probe_timeout: std::time::Duration) -> BridgeResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(probe_timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|err| BridgeError::Config(err.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl PolicyBackend for HeadProbeBackend {
    fn name(&self) -> &'static str {
        "head_probe"
    }

    async fn check(&self, subject: &str, resource: &str) -> BridgeResult<DecisionOutcome> {
        let response = self
            .client
            .head(resource)
            .header(Self::SUBJECT_HEADER, subject)
            .send()
            .await
            .map_err(|err| BridgeError::PolicyBackend(err.to_string()))?;
        Ok(outcome_for_status(response.status()))
    }
}

fn outcome_for_status(status: StatusCode) -> DecisionOutcome {
    if status.is_success() || status.is_redirection() {
        DecisionOutcome::Permit
    } else if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        DecisionOutcome::Deny
    } else {
        DecisionOutcome::Indeterminate
    }
}
