//! Rendering of outbound responses.
//!
//! Every response keeps a fixed element shape; only the value slots
//! vary per message. Rendering goes through a structured writer so
//! each slot is escaped exactly once, whether it lands in a text node
//! or an attribute. Assertions leave unsigned; the deployment relies
//! on the protected network segment between the appliance and the
//! bridge.

use chrono::{DateTime, Duration, Utc};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use tracing::{error, warn};

use sb_core::event::{Event as AuditEvent, EventType};
use sb_core::{BridgeConfig, BridgeError, BridgeResult};

use crate::constants::{
    status_codes, sub_status_codes, AuthnContextClass, BEARER_METHOD, GHPP_ACTION_NS,
    HTTP_GET_ACTION, SAMLP_NS, SAML_NS, SAML_VERSION, SOAP_ENV_NS,
};
use crate::random::protocol_id;
use crate::types::{Decision, ResolveContext};

type XmlWriter = Writer<Vec<u8>>;

/// Fault of last resort, served only if structured rendering itself
/// fails. Carries no dynamic content.
const FALLBACK_FAULT: &str = concat!(
    r#"<?xml version="1.0" encoding="UTF-8"?>"#,
    r#"<soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/">"#,
    r#"<soapenv:Body>"#,
    r#"<samlp:Response xmlns:samlp="urn:oasis:names:tc:SAML:2.0:protocol" Version="2.0">"#,
    r#"<samlp:Status>"#,
    r#"<samlp:StatusCode Value="urn:oasis:names:tc:SAML:2.0:status:Responder"/>"#,
    r#"</samlp:Status>"#,
    r#"</samlp:Response>"#,
    r#"</soapenv:Body>"#,
    r#"</soapenv:Envelope>"#,
);

/// Renders the responses the bridge sends back to the appliance.
///
/// The issuer entity id and the validity windows are fixed at
/// construction; timestamps and message ids are fresh per message.
#[derive(Debug, Clone)]
pub struct ResponseBuilder {
    issuer: String,
    validity: Duration,
    clock_skew: Duration,
}

/// Timestamps shared by every slot of a single message.
struct Window {
    instant: String,
    not_before: String,
    not_on_or_after: String,
}

impl ResponseBuilder {
    /// Creates a builder from configuration.
    ///
    /// An empty issuer entity id falls back to the local hostname.
    /// The fallback is audited since it usually means the deployment
    /// has not been configured yet.
    #[must_use]
    pub fn new(config: &BridgeConfig) -> Self {
        let configured = config.issuer_entity_id.trim();
        let issuer = if configured.is_empty() {
            let host = hostname::get()
                .ok()
                .and_then(|name| name.into_string().ok())
                .unwrap_or_else(|| "localhost".to_string());
            warn!(
                issuer = %host,
                "issuer entity id not configured, falling back to hostname"
            );
            AuditEvent::builder(EventType::FallbackIssuer)
                .detail("issuer", host.as_str())
                .build()
                .emit();
            host
        } else {
            configured.to_string()
        };
        Self {
            issuer,
            validity: config.validity(),
            clock_skew: config.clock_skew(),
        }
    }

    /// The issuer entity id stamped on every outbound message.
    #[must_use]
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    fn window(&self) -> Window {
        let now = Utc::now();
        Window {
            instant: format_instant(now),
            not_before: format_instant(now - self.clock_skew),
            not_on_or_after: format_instant(now + self.validity),
        }
    }

    /// Renders the artifact response for a successfully redeemed
    /// artifact.
    ///
    /// The assertion carries the subject bound to the artifact, is
    /// addressed to the requester's own entity id, and is valid from
    /// one clock skew in the past until one validity window in the
    /// future.
    pub fn artifact_response(&self, ctx: &ResolveContext<'_>) -> BridgeResult<String> {
        let window = self.window();
        let response_id = protocol_id();
        let inner_response_id = protocol_id();
        let assertion_id = protocol_id();
        let session_index = protocol_id();

        let mut w = Writer::new(Vec::new());
        declaration(&mut w)?;
        open(&mut w, "soapenv:Envelope", &[("xmlns:soapenv", SOAP_ENV_NS)])?;
        open(&mut w, "soapenv:Body", &[])?;
        open(
            &mut w,
            "samlp:ArtifactResponse",
            &[
                ("xmlns:samlp", SAMLP_NS),
                ("xmlns:saml", SAML_NS),
                ("ID", response_id.as_str()),
                ("Version", SAML_VERSION),
                ("InResponseTo", ctx.in_response_to),
                ("IssueInstant", window.instant.as_str()),
            ],
        )?;
        leaf(&mut w, "saml:Issuer", &[], &self.issuer)?;
        status(&mut w, status_codes::SUCCESS, None, None)?;
        open(
            &mut w,
            "samlp:Response",
            &[
                ("ID", inner_response_id.as_str()),
                ("Version", SAML_VERSION),
                ("IssueInstant", window.instant.as_str()),
            ],
        )?;
        leaf(&mut w, "saml:Issuer", &[], &self.issuer)?;
        status(&mut w, status_codes::SUCCESS, None, None)?;
        open(
            &mut w,
            "saml:Assertion",
            &[
                ("ID", assertion_id.as_str()),
                ("Version", SAML_VERSION),
                ("IssueInstant", window.instant.as_str()),
            ],
        )?;
        leaf(&mut w, "saml:Issuer", &[], &self.issuer)?;
        open(&mut w, "saml:Subject", &[])?;
        leaf(&mut w, "saml:NameID", &[], ctx.subject)?;
        open(
            &mut w,
            "saml:SubjectConfirmation",
            &[("Method", BEARER_METHOD)],
        )?;
        empty(
            &mut w,
            "saml:SubjectConfirmationData",
            &[
                ("InResponseTo", ctx.authn_request_id),
                ("Recipient", ctx.recipient),
                ("NotOnOrAfter", window.not_on_or_after.as_str()),
            ],
        )?;
        close(&mut w, "saml:SubjectConfirmation")?;
        close(&mut w, "saml:Subject")?;
        open(
            &mut w,
            "saml:Conditions",
            &[
                ("NotBefore", window.not_before.as_str()),
                ("NotOnOrAfter", window.not_on_or_after.as_str()),
            ],
        )?;
        open(&mut w, "saml:AudienceRestriction", &[])?;
        leaf(&mut w, "saml:Audience", &[], ctx.audience)?;
        close(&mut w, "saml:AudienceRestriction")?;
        close(&mut w, "saml:Conditions")?;
        open(
            &mut w,
            "saml:AuthnStatement",
            &[
                ("AuthnInstant", window.instant.as_str()),
                ("SessionIndex", session_index.as_str()),
            ],
        )?;
        open(&mut w, "saml:AuthnContext", &[])?;
        leaf(
            &mut w,
            "saml:AuthnContextClassRef",
            &[],
            AuthnContextClass::InternetProtocol.uri(),
        )?;
        close(&mut w, "saml:AuthnContext")?;
        close(&mut w, "saml:AuthnStatement")?;
        close(&mut w, "saml:Assertion")?;
        close(&mut w, "samlp:Response")?;
        close(&mut w, "samlp:ArtifactResponse")?;
        close(&mut w, "soapenv:Body")?;
        close(&mut w, "soapenv:Envelope")?;
        finish(w)
    }

    /// Renders the response to an authorization query batch.
    ///
    /// One response block per decision, preserving input order; the
    /// subject is echoed into every block. An empty batch yields an
    /// envelope with an empty body.
    pub fn authz_response(&self, subject: &str, decisions: &[Decision]) -> BridgeResult<String> {
        let mut w = Writer::new(Vec::new());
        declaration(&mut w)?;
        open(&mut w, "soapenv:Envelope", &[("xmlns:soapenv", SOAP_ENV_NS)])?;
        open(&mut w, "soapenv:Body", &[])?;
        for decision in decisions {
            self.decision_block(&mut w, subject, decision)?;
        }
        close(&mut w, "soapenv:Body")?;
        close(&mut w, "soapenv:Envelope")?;
        finish(w)
    }

    fn decision_block(
        &self,
        w: &mut XmlWriter,
        subject: &str,
        decision: &Decision,
    ) -> BridgeResult<()> {
        let window = self.window();
        let response_id = protocol_id();
        let assertion_id = protocol_id();

        open(
            w,
            "samlp:Response",
            &[
                ("xmlns:samlp", SAMLP_NS),
                ("xmlns:saml", SAML_NS),
                ("ID", response_id.as_str()),
                ("Version", SAML_VERSION),
                ("IssueInstant", window.instant.as_str()),
            ],
        )?;
        leaf(w, "saml:Issuer", &[], &self.issuer)?;
        status(w, status_codes::SUCCESS, None, None)?;
        open(
            w,
            "saml:Assertion",
            &[
                ("ID", assertion_id.as_str()),
                ("Version", SAML_VERSION),
                ("IssueInstant", window.instant.as_str()),
            ],
        )?;
        leaf(w, "saml:Issuer", &[], &self.issuer)?;
        open(w, "saml:Subject", &[])?;
        leaf(w, "saml:NameID", &[], subject)?;
        close(w, "saml:Subject")?;
        open(
            w,
            "saml:AuthzDecisionStatement",
            &[
                ("Resource", decision.resource.as_str()),
                ("Decision", decision.outcome.as_str()),
            ],
        )?;
        leaf(w, "saml:Action", &[("Namespace", GHPP_ACTION_NS)], HTTP_GET_ACTION)?;
        close(w, "saml:AuthzDecisionStatement")?;
        close(w, "saml:Assertion")?;
        close(w, "samlp:Response")
    }

    /// Renders a protocol fault for the given error.
    ///
    /// The fault carries only the error's display text, which is
    /// deliberately generic for artifact lookups. This never fails:
    /// if structured rendering itself errors, a pre-rendered
    /// responder fault is returned.
    #[must_use]
    pub fn fault(&self, error: &BridgeError) -> String {
        match self.render_fault(error) {
            Ok(xml) => xml,
            Err(render_error) => {
                error!(%render_error, "fault rendering failed");
                FALLBACK_FAULT.to_string()
            }
        }
    }

    fn render_fault(&self, error: &BridgeError) -> BridgeResult<String> {
        let (code, sub_code) = status_codes_for(error);
        let window = self.window();
        let response_id = protocol_id();

        let mut w = Writer::new(Vec::new());
        declaration(&mut w)?;
        open(&mut w, "soapenv:Envelope", &[("xmlns:soapenv", SOAP_ENV_NS)])?;
        open(&mut w, "soapenv:Body", &[])?;
        open(
            &mut w,
            "samlp:Response",
            &[
                ("xmlns:samlp", SAMLP_NS),
                ("xmlns:saml", SAML_NS),
                ("ID", response_id.as_str()),
                ("Version", SAML_VERSION),
                ("IssueInstant", window.instant.as_str()),
            ],
        )?;
        leaf(&mut w, "saml:Issuer", &[], &self.issuer)?;
        status(&mut w, code, sub_code, Some(&error.to_string()))?;
        close(&mut w, "samlp:Response")?;
        close(&mut w, "soapenv:Body")?;
        close(&mut w, "soapenv:Envelope")?;
        finish(w)
    }
}

/// Maps an error to the status codes reported to the peer. Artifact
/// lookup failures share one code pair regardless of cause.
fn status_codes_for(error: &BridgeError) -> (&'static str, Option<&'static str>) {
    match error {
        BridgeError::MalformedRequest(_) | BridgeError::DuplicateArtifact(_) => {
            (status_codes::REQUESTER, None)
        }
        BridgeError::UnknownArtifact => {
            (status_codes::REQUESTER, Some(sub_status_codes::REQUEST_DENIED))
        }
        _ => (status_codes::RESPONDER, None),
    }
}

/// Completes a reply-to value against the host header of the current
/// request. Values already carrying a scheme pass through unchanged.
#[must_use]
pub fn complete_reply_to(reply_to: &str, host: &str) -> String {
    if reply_to.starts_with("http") {
        reply_to.to_string()
    } else {
        format!("http://{host}{reply_to}")
    }
}

/// Formats an instant in the fixed wire form, UTC at second
/// precision.
#[must_use]
pub fn format_instant(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

fn render_err(err: impl std::fmt::Display) -> BridgeError {
    BridgeError::Render(err.to_string())
}

fn declaration(w: &mut XmlWriter) -> BridgeResult<()> {
    w.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(render_err)
}

fn open(w: &mut XmlWriter, name: &str, attrs: &[(&str, &str)]) -> BridgeResult<()> {
    let mut elem = BytesStart::new(name);
    for (key, value) in attrs {
        elem.push_attribute((*key, *value));
    }
    w.write_event(Event::Start(elem)).map_err(render_err)
}

fn empty(w: &mut XmlWriter, name: &str, attrs: &[(&str, &str)]) -> BridgeResult<()> {
    let mut elem = BytesStart::new(name);
    for (key, value) in attrs {
        elem.push_attribute((*key, *value));
    }
    w.write_event(Event::Empty(elem)).map_err(render_err)
}

fn close(w: &mut XmlWriter, name: &str) -> BridgeResult<()> {
    w.write_event(Event::End(BytesEnd::new(name))).map_err(render_err)
}

fn leaf(w: &mut XmlWriter, name: &str, attrs: &[(&str, &str)], text: &str) -> BridgeResult<()> {
    open(w, name, attrs)?;
    w.write_event(Event::Text(BytesText::new(text)))
        .map_err(render_err)?;
    close(w, name)
}

fn status(
    w: &mut XmlWriter,
    code: &str,
    sub_code: Option<&str>,
    message: Option<&str>,
) -> BridgeResult<()> {
    open(w, "samlp:Status", &[])?;
    match sub_code {
        Some(sub) => {
            open(w, "samlp:StatusCode", &[("Value", code)])?;
            empty(w, "samlp:StatusCode", &[("Value", sub)])?;
            close(w, "samlp:StatusCode")?;
        }
        None => empty(w, "samlp:StatusCode", &[("Value", code)])?,
    }
    if let Some(message) = message {
        leaf(w, "samlp:StatusMessage", &[], message)?;
    }
    close(w, "samlp:Status")
}

fn finish(w: XmlWriter) -> BridgeResult<String> {
    String::from_utf8(w.into_inner()).map_err(render_err)
}
