//! Protocol fault handling tests.
//!
//! Bad requests never take the connection down: the bridge answers
//! with a SAML status document the appliance can read.

use crate::common::{artifact_resolve_xml, status_message, TestEnv};

const REQUESTER: &str = "urn:oasis:names:tc:SAML:2.0:status:Requester";

async fn post_xml(env: &TestEnv, url: String, body: String) -> anyhow::Result<(u16, String)> {
    let response = env
        .client
        .post(url)
        .header("content-type", "text/xml; charset=utf-8")
        .body(body)
        .send()
        .await?;
    let status = response.status().as_u16();
    Ok((status, response.text().await?))
}

/// Tests that a non-XML resolve body gets a malformed-request fault.
#[tokio::test]
async fn test_malformed_resolve_body() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;

    let (status, body) = post_xml(&env, env.resolve_url(), "this is not xml".to_string()).await?;

    assert_eq!(status, 200, "Faults travel as status documents");
    assert!(
        body.contains(REQUESTER),
        "Expected requester fault, got: {}",
        body
    );
    assert!(
        status_message(&body)
            .is_some_and(|message| message.contains("malformed request")),
        "Fault should carry the failure class, got: {}",
        body
    );

    Ok(())
}

/// Tests that an empty resolve body gets a fault.
#[tokio::test]
async fn test_empty_resolve_body() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;

    let (status, body) = post_xml(&env, env.resolve_url(), String::new()).await?;

    assert_eq!(status, 200);
    assert!(body.contains(REQUESTER), "Expected fault, got: {}", body);

    Ok(())
}

/// Tests that a resolve request with a DTD is rejected.
#[tokio::test]
async fn test_doctype_is_rejected() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;

    let poisoned = artifact_resolve_xml("AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA", "_req_dtd").replace(
        "?>\n",
        "?>\n<!DOCTYPE Envelope [<!ENTITY xxe SYSTEM \"file:///etc/hostname\">]>\n",
    );
    let (status, body) = post_xml(&env, env.resolve_url(), poisoned).await?;

    assert_eq!(status, 200);
    assert!(
        body.contains(REQUESTER),
        "Documents with a DTD must be refused, got: {}",
        body
    );
    assert!(
        status_message(&body)
            .is_some_and(|message| message.contains("malformed request")),
        "Rejection should read as a malformed request"
    );

    Ok(())
}

/// Tests that a resolve request without an artifact gets a fault.
#[tokio::test]
async fn test_resolve_without_artifact() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;

    let incomplete = r#"<?xml version="1.0" encoding="UTF-8"?>
<soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/">
  <soapenv:Body>
    <samlp:ArtifactResolve xmlns:samlp="urn:oasis:names:tc:SAML:2.0:protocol"
        xmlns:saml="urn:oasis:names:tc:SAML:2.0:assertion"
        ID="_req_no_artifact" Version="2.0" IssueInstant="2026-08-22T00:00:00Z">
      <saml:Issuer>http://search.corp.example.com</saml:Issuer>
    </samlp:ArtifactResolve>
  </soapenv:Body>
</soapenv:Envelope>"#;

    let (status, body) = post_xml(&env, env.resolve_url(), incomplete.to_string()).await?;

    assert_eq!(status, 200);
    assert!(body.contains(REQUESTER), "Expected fault, got: {}", body);

    Ok(())
}

/// Tests that a decision batch without a subject gets a fault.
#[tokio::test]
async fn test_authz_without_subject() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;

    let subjectless = r#"<?xml version="1.0" encoding="UTF-8"?>
<soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/">
  <soapenv:Body>
    <samlp:AuthzDecisionQuery xmlns:samlp="urn:oasis:names:tc:SAML:2.0:protocol"
        xmlns:saml="urn:oasis:names:tc:SAML:2.0:assertion"
        ID="_query_0" Version="2.0" IssueInstant="2026-08-22T00:00:00Z"
        Resource="http://content.example.com/docs/a">
      <saml:Action Namespace="urn:oasis:names:tc:SAML:1.0:action:ghpp">GET</saml:Action>
    </samlp:AuthzDecisionQuery>
  </soapenv:Body>
</soapenv:Envelope>"#;

    let (status, body) = post_xml(&env, env.authz_url(), subjectless.to_string()).await?;

    assert_eq!(status, 200);
    assert!(
        body.contains(REQUESTER),
        "A batch without a subject is malformed, got: {}",
        body
    );

    Ok(())
}

/// Tests that a publish without a subject is rejected with a client error.
#[tokio::test]
async fn test_publish_without_subject() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;

    let payload = serde_json::json!({
        "subject": "",
        "authn_request_id": "_authn_51",
        "reply_to": "/search",
    });
    let response = env
        .client
        .post(env.publish_url())
        .header("content-type", "application/json")
        .body(payload.to_string())
        .send()
        .await?;

    assert_eq!(
        response.status().as_u16(),
        400,
        "Blank subjects must be refused"
    );

    Ok(())
}
