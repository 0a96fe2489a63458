//! Parsing of inbound appliance requests.
//!
//! Both request kinds arrive as XML from an untrusted peer. Parsing
//! is event based and namespace agnostic: elements are matched by
//! local name so the prefix choices of the sender do not matter.
//! Document type declarations are rejected outright and only the five
//! predefined XML entities are ever expanded.

use quick_xml::events::Event;
use quick_xml::Reader;
use tracing::warn;

use sb_core::{BridgeError, BridgeResult};

use crate::types::{ArtifactResolve, AuthzQuery};

fn malformed(message: impl Into<String>) -> BridgeError {
    BridgeError::MalformedRequest(message.into())
}

/// Parses an artifact resolution request.
///
/// The artifact token, the message id of the request, and the
/// requester's issuer entity id are all mandatory; a message missing
/// any of them is rejected.
pub fn parse_artifact_resolve(xml: &str) -> BridgeResult<ArtifactResolve> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut artifact: Option<String> = None;
    let mut request_id: Option<String> = None;
    let mut issuer: Option<String> = None;
    let mut in_artifact = false;
    let mut in_issuer = false;

    loop {
        match reader.read_event() {
            Ok(Event::DocType(_)) => {
                return Err(malformed("document type declarations are not allowed"));
            }
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                let name = e.local_name();
                match std::str::from_utf8(name.as_ref()).unwrap_or("") {
                    "ArtifactResolve" => {
                        for attr in e.attributes().flatten() {
                            let key = std::str::from_utf8(attr.key.as_ref()).unwrap_or("");
                            if key == "ID" && request_id.is_none() {
                                let value = attr
                                    .unescape_value()
                                    .map_err(|err| malformed(format!("invalid XML: {err}")))?;
                                request_id = Some(value.trim().to_string());
                            }
                        }
                    }
                    "Artifact" => in_artifact = true,
                    "Issuer" => in_issuer = true,
                    _ => {}
                }
            }
            Ok(Event::Text(e)) => {
                if in_artifact || in_issuer {
                    let text = e
                        .unescape()
                        .map_err(|err| malformed(format!("invalid XML: {err}")))?;
                    if in_artifact && artifact.is_none() {
                        artifact = Some(text.trim().to_string());
                    } else if in_issuer && issuer.is_none() {
                        issuer = Some(text.trim().to_string());
                    }
                }
            }
            Ok(Event::End(e)) => {
                let name = e.local_name();
                match std::str::from_utf8(name.as_ref()).unwrap_or("") {
                    "Artifact" => in_artifact = false,
                    "Issuer" => in_issuer = false,
                    _ => {}
                }
            }
            Ok(Event::Eof) => break,
            Err(err) => return Err(malformed(format!("invalid XML: {err}"))),
            _ => {}
        }
    }

    let artifact = artifact
        .filter(|a| !a.is_empty())
        .ok_or_else(|| malformed("missing Artifact element"))?;
    let request_id = request_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| malformed("missing ID attribute on ArtifactResolve"))?;
    let issuer = issuer
        .filter(|issuer| !issuer.is_empty())
        .ok_or_else(|| malformed("missing Issuer element"))?;

    Ok(ArtifactResolve {
        artifact,
        request_id,
        issuer,
    })
}

/// Parses an authorization decision query batch.
///
/// The subject principal is mandatory. Queries whose `Resource`
/// attribute is absent or blank are logged and dropped; the remaining
/// resources keep their document order.
pub fn parse_authz_query(xml: &str) -> BridgeResult<AuthzQuery> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut subject: Option<String> = None;
    let mut resources: Vec<String> = Vec::new();
    let mut in_name_id = false;
    let mut query_index: usize = 0;

    loop {
        match reader.read_event() {
            Ok(Event::DocType(_)) => {
                return Err(malformed("document type declarations are not allowed"));
            }
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                let name = e.local_name();
                match std::str::from_utf8(name.as_ref()).unwrap_or("") {
                    "AuthzDecisionQuery" => {
                        let mut resource: Option<String> = None;
                        for attr in e.attributes().flatten() {
                            let key = std::str::from_utf8(attr.key.as_ref()).unwrap_or("");
                            if key == "Resource" {
                                let value = attr
                                    .unescape_value()
                                    .map_err(|err| malformed(format!("invalid XML: {err}")))?;
                                resource = Some(value.trim().to_string());
                            }
                        }
                        match resource.filter(|r| !r.is_empty()) {
                            Some(resource) => resources.push(resource),
                            None => {
                                warn!(
                                    index = query_index,
                                    "authorization query with blank resource skipped"
                                );
                            }
                        }
                        query_index += 1;
                    }
                    "NameID" => in_name_id = true,
                    _ => {}
                }
            }
            Ok(Event::Text(e)) => {
                if in_name_id && subject.is_none() {
                    let text = e
                        .unescape()
                        .map_err(|err| malformed(format!("invalid XML: {err}")))?;
                    let text = text.trim();
                    if !text.is_empty() {
                        subject = Some(text.to_string());
                    }
                }
            }
            Ok(Event::End(e)) => {
                if e.local_name().as_ref() == b"NameID" {
                    in_name_id = false;
                }
            }
            Ok(Event::Eof) => break,
            Err(err) => return Err(malformed(format!("invalid XML: {err}"))),
            _ => {}
        }
    }

    let subject = subject.ok_or_else(|| malformed("missing subject in authorization query"))?;

    Ok(AuthzQuery { subject, resources })
}
