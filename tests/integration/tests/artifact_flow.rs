//! Artifact publish and resolve integration tests.
//!
//! These cover the round trip the appliance drives: an identity is
//! published, an artifact token travels through the appliance, and
//! the appliance redeems it exactly once over SOAP.

use chrono::NaiveDateTime;

use crate::common::{attr_value, status_message, TestEnv};

const SUCCESS: &str = "urn:oasis:names:tc:SAML:2.0:status:Success";
const REQUESTER: &str = "urn:oasis:names:tc:SAML:2.0:status:Requester";
const REQUEST_DENIED: &str = "urn:oasis:names:tc:SAML:2.0:status:RequestDenied";

/// Tests that a published artifact resolves to the identity behind it.
#[tokio::test]
async fn test_artifact_resolve_returns_identity() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;

    let artifact = env
        .publish("jsmith@corp.example.com", "_authn_42", "/search?q=policy")
        .await?;
    let body = env.resolve(&artifact, "_appliance_req_1").await?;

    assert!(
        body.contains(SUCCESS),
        "Expected success status, got: {}",
        body
    );
    assert!(
        body.contains("<saml:NameID>jsmith@corp.example.com</saml:NameID>"),
        "Assertion should carry the published subject"
    );
    assert_eq!(
        attr_value(&body, "InResponseTo").as_deref(),
        Some("_appliance_req_1"),
        "ArtifactResponse should correlate to the resolve request"
    );
    assert!(
        body.contains("<saml:Audience>http://search.corp.example.com</saml:Audience>"),
        "Audience should echo the requester issuer"
    );

    Ok(())
}

/// Tests that a relative reply-to is completed against the request host.
#[tokio::test]
async fn test_relative_reply_to_completed_with_host() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;

    let artifact = env
        .publish("jsmith@corp.example.com", "_authn_43", "/search?q=policy")
        .await?;
    let body = env.resolve(&artifact, "_appliance_req_2").await?;

    let expected = format!("{}/search?q=policy", env.base_url);
    assert_eq!(
        attr_value(&body, "Recipient").as_deref(),
        Some(expected.as_str()),
        "Relative reply-to should gain the request host"
    );

    Ok(())
}

/// Tests that an absolute reply-to passes through unchanged.
#[tokio::test]
async fn test_absolute_reply_to_unchanged() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;

    let artifact = env
        .publish(
            "jsmith@corp.example.com",
            "_authn_44",
            "http://content.example.com/landing",
        )
        .await?;
    let body = env.resolve(&artifact, "_appliance_req_3").await?;

    assert_eq!(
        attr_value(&body, "Recipient").as_deref(),
        Some("http://content.example.com/landing"),
        "Absolute reply-to should not be rewritten"
    );

    Ok(())
}

/// Tests that an artifact can be redeemed exactly once.
#[tokio::test]
async fn test_artifact_is_single_use() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;

    let artifact = env
        .publish("jsmith@corp.example.com", "_authn_45", "/search")
        .await?;

    let first = env.resolve(&artifact, "_appliance_req_4").await?;
    assert!(
        first.contains(SUCCESS),
        "First redemption should succeed, got: {}",
        first
    );

    let second = env.resolve(&artifact, "_appliance_req_5").await?;
    assert!(
        !second.contains(SUCCESS),
        "Second redemption must not succeed"
    );
    assert!(
        second.contains(REQUESTER) && second.contains(REQUEST_DENIED),
        "Replay should be denied, got: {}",
        second
    );

    Ok(())
}

/// Tests that a replayed artifact and a never-issued artifact fail the
/// same way.
#[tokio::test]
async fn test_replay_and_unknown_artifact_agree() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;

    let artifact = env
        .publish("jsmith@corp.example.com", "_authn_46", "/search")
        .await?;
    env.resolve(&artifact, "_appliance_req_6").await?;

    let replayed = env.resolve(&artifact, "_appliance_req_7").await?;
    let unknown = env
        .resolve("AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA", "_appliance_req_7")
        .await?;

    assert_eq!(
        status_message(&replayed),
        status_message(&unknown),
        "Replayed and never-issued artifacts must be indistinguishable"
    );
    for body in [&replayed, &unknown] {
        assert!(body.contains(REQUESTER) && body.contains(REQUEST_DENIED));
        assert!(
            !body.contains("replay") && !body.contains("expired") && !body.contains("issued"),
            "Fault must not reveal why resolution failed: {}",
            body
        );
    }

    Ok(())
}

/// Tests that publishing the same artifact token twice is rejected.
#[tokio::test]
async fn test_duplicate_artifact_rejected() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;

    let payload = serde_json::json!({
        "subject": "jsmith@corp.example.com",
        "authn_request_id": "_authn_47",
        "reply_to": "/search",
        "artifact": "fixedfixedfixedfixedfixedfixed01",
    });

    let first = env
        .client
        .post(env.publish_url())
        .header("content-type", "application/json")
        .body(payload.to_string())
        .send()
        .await?;
    assert!(
        first.status().is_success(),
        "First publish should succeed, got {}",
        first.status()
    );

    let second = env
        .client
        .post(env.publish_url())
        .header("content-type", "application/json")
        .body(payload.to_string())
        .send()
        .await?;
    assert_eq!(
        second.status().as_u16(),
        409,
        "Second publish of a live artifact should conflict"
    );

    let body = second.text().await?;
    assert!(
        body.contains("already published"),
        "Conflict body should name the failure, got: {}",
        body
    );

    Ok(())
}

/// Tests that subject metacharacters are escaped in the response.
#[tokio::test]
async fn test_subject_metacharacters_are_escaped() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;

    let artifact = env
        .publish(r#"DOMAIN\o'brien <admin> & "ops""#, "_authn_48", "/search")
        .await?;
    let body = env.resolve(&artifact, "_appliance_req_8").await?;

    assert!(
        body.contains(SUCCESS),
        "Resolution should succeed, got: {}",
        body
    );
    assert!(
        body.contains("&lt;admin&gt;") && body.contains("&amp;"),
        "Markup characters in the subject must be escaped"
    );
    assert!(
        !body.contains("<admin>"),
        "Raw subject markup must never reach the document"
    );

    Ok(())
}

/// Tests that the assertion validity window matches the configuration.
#[tokio::test]
async fn test_validity_window_matches_configuration() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;

    let artifact = env
        .publish("jsmith@corp.example.com", "_authn_49", "/search")
        .await?;
    let body = env.resolve(&artifact, "_appliance_req_9").await?;

    let instant = parse_instant(&attr_value(&body, "IssueInstant").unwrap());
    let not_before = parse_instant(&attr_value(&body, "NotBefore").unwrap());
    let not_on_or_after = parse_instant(&attr_value(&body, "NotOnOrAfter").unwrap());

    // for_testing() uses a 300 second validity and 60 seconds of skew.
    assert_eq!((not_on_or_after - instant).num_seconds(), 300);
    assert_eq!((instant - not_before).num_seconds(), 60);

    Ok(())
}

fn parse_instant(value: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%SZ")
        .unwrap_or_else(|e| panic!("unparseable instant {value}: {e}"))
}
