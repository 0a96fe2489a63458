//! Authorization decision integration tests.
//!
//! The appliance batches one `AuthzDecisionQuery` per candidate URL
//! into a single SOAP envelope and expects one decision block per
//! query, in the same order.

use crate::common::{authz_query_xml, TestEnv};

const SUCCESS: &str = "urn:oasis:names:tc:SAML:2.0:status:Success";

async fn send_authz(env: &TestEnv, body: String) -> anyhow::Result<String> {
    let response = env
        .client
        .post(env.authz_url())
        .header("content-type", "text/xml; charset=utf-8")
        .body(body)
        .send()
        .await?;

    anyhow::ensure!(
        response.status().is_success(),
        "authz request failed with status {}",
        response.status()
    );

    Ok(response.text().await?)
}

/// Tests that a decision batch answers every query in request order.
#[tokio::test]
async fn test_batch_preserves_query_order() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;

    let resources = [
        "http://content.example.com/docs/alpha",
        "http://content.example.com/docs/beta",
        "http://content.example.com/docs/gamma",
    ];
    let body = send_authz(
        &env,
        authz_query_xml("jsmith@corp.example.com", &resources),
    )
    .await?;

    assert!(body.contains(SUCCESS), "Expected success, got: {}", body);

    let positions: Vec<usize> = resources
        .iter()
        .map(|resource| {
            body.find(resource)
                .unwrap_or_else(|| panic!("missing decision for {resource}"))
        })
        .collect();
    assert!(
        positions.windows(2).all(|pair| pair[0] < pair[1]),
        "Decisions must appear in query order"
    );

    // The built-in backend permits everything.
    assert_eq!(
        body.matches(r#"Decision="Permit""#).count(),
        3,
        "Every query should be answered, got: {}",
        body
    );
    assert_eq!(
        body.matches("<saml:NameID>jsmith@corp.example.com</saml:NameID>")
            .count(),
        3,
        "Every decision block should carry the subject"
    );

    Ok(())
}

/// Tests that resource URLs with metacharacters survive the round trip.
#[tokio::test]
async fn test_resource_metacharacters_round_trip() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;

    // The & is escaped on the wire in both directions.
    let body = send_authz(
        &env,
        authz_query_xml(
            "jsmith@corp.example.com",
            &["http://content.example.com/view?doc=1&amp;rev=2"],
        ),
    )
    .await?;

    assert!(body.contains(SUCCESS), "Expected success, got: {}", body);
    assert!(
        body.contains(r#"Resource="http://content.example.com/view?doc=1&amp;rev=2""#),
        "Resource should come back escaped exactly once, got: {}",
        body
    );

    Ok(())
}

/// Tests that queries with a blank resource are skipped.
#[tokio::test]
async fn test_blank_resources_are_skipped() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;

    let body = send_authz(
        &env,
        authz_query_xml(
            "jsmith@corp.example.com",
            &["", "http://content.example.com/docs/a"],
        ),
    )
    .await?;

    assert_eq!(
        body.matches("<saml:AuthzDecisionStatement").count(),
        1,
        "Blank resources should not produce decisions, got: {}",
        body
    );
    assert!(
        body.contains("http://content.example.com/docs/a"),
        "The non-blank resource should still be decided"
    );

    Ok(())
}

/// Tests that a batch whose only resource is blank yields an empty
/// response rather than a fault.
#[tokio::test]
async fn test_all_blank_batch_yields_empty_envelope() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;

    let body = send_authz(&env, authz_query_xml("jsmith@corp.example.com", &[""])).await?;

    assert!(
        body.contains("soapenv:Body"),
        "Response should still be a SOAP envelope, got: {}",
        body
    );
    assert!(
        !body.contains("AuthzDecisionStatement"),
        "Skipped queries must not produce decisions"
    );
    assert!(
        !body.contains("samlp:StatusMessage"),
        "An empty batch is not a protocol fault, got: {}",
        body
    );

    Ok(())
}
