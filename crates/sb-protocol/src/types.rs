//! Message types exchanged between the appliance and the bridge.

/// A parsed artifact resolution request.
///
/// All three fields are mandatory on the wire; the codec rejects
/// messages missing any of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactResolve {
    /// The opaque artifact token to redeem.
    pub artifact: String,
    /// The request's own message identifier, echoed back as the
    /// correlation id of the response.
    pub request_id: String,
    /// Entity id of the requesting party, echoed back as the audience
    /// of the issued assertion.
    pub issuer: String,
}

/// A parsed authorization decision query batch.
///
/// One subject, any number of resources. Queries with a blank
/// resource attribute are dropped during parsing, so `resources`
/// carries only the entries that will actually be decided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthzQuery {
    /// The principal the decisions are about.
    pub subject: String,
    /// Resource URLs to decide, in document order.
    pub resources: Vec<String>,
}

/// Outcome of a single authorization decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionOutcome {
    /// The subject may retrieve the resource.
    Permit,
    /// The subject may not retrieve the resource.
    Deny,
    /// No reliable answer could be produced. Consumers treat this the
    /// same as a denial.
    Indeterminate,
}

impl DecisionOutcome {
    /// Returns the wire value of this outcome.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Permit => "Permit",
            Self::Deny => "Deny",
            Self::Indeterminate => "Indeterminate",
        }
    }
}

/// A decided resource, paired with its outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decision {
    /// The resource URL the decision covers.
    pub resource: String,
    /// The outcome for this resource.
    pub outcome: DecisionOutcome,
}

/// Inputs for rendering an artifact response, gathered by the resolve
/// handler from the redeemed artifact entry and the inbound request.
#[derive(Debug, Clone, Copy)]
pub struct ResolveContext<'a> {
    /// Message id of the resolve request being answered.
    pub in_response_to: &'a str,
    /// Authenticated principal bound to the artifact.
    pub subject: &'a str,
    /// Id of the authentication request that started the exchange.
    pub authn_request_id: &'a str,
    /// Absolute URL the assertion is addressed to.
    pub recipient: &'a str,
    /// Entity id of the party allowed to consume the assertion.
    pub audience: &'a str,
}
