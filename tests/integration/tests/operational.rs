//! Health and diagnostics endpoint tests.

use crate::common::TestEnv;

/// Tests that all health endpoints respond.
#[tokio::test]
async fn test_health_endpoints() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;

    let health = env
        .client
        .get(format!("{}/health", env.base_url))
        .send()
        .await?;
    assert!(health.status().is_success());
    assert!(health.text().await?.contains("healthy"));

    for path in ["/health/live", "/health/ready"] {
        let response = env
            .client
            .get(format!("{}{}", env.base_url, path))
            .send()
            .await?;
        assert!(
            response.status().is_success(),
            "Expected success from {}, got {}",
            path,
            response.status()
        );
    }

    Ok(())
}

/// Tests that the root endpoint identifies the server.
#[tokio::test]
async fn test_root_endpoint() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;

    let response = env.client.get(&env.base_url).send().await?;
    assert!(response.status().is_success());

    let body = response.text().await?;
    assert!(
        body.contains("SAML Artifact Bridge"),
        "Root should name the server, got: {}",
        body
    );

    Ok(())
}

/// Tests that diagnostics reports configuration and live artifacts.
#[tokio::test]
async fn test_diagnostics_reports_state() -> anyhow::Result<()> {
    let env = TestEnv::new().await?;

    let before: serde_json::Value =
        serde_json::from_str(&env.client.get(env.diagnostics_url()).send().await?.text().await?)?;

    assert_eq!(before["name"], "saml-artifact-bridge");
    assert_eq!(before["policy_backend"], "allow_all");
    assert_eq!(before["issuer"], "https://bridge.test.example/idp");
    assert_eq!(before["assertion_validity_secs"], 300);
    assert_eq!(before["live_artifacts"], 0);

    env.publish("jsmith@corp.example.com", "_authn_50", "/search")
        .await?;

    let after: serde_json::Value =
        serde_json::from_str(&env.client.get(env.diagnostics_url()).send().await?.text().await?)?;
    assert_eq!(
        after["live_artifacts"], 1,
        "Published artifact should be visible, got: {}",
        after
    );

    // The response never carries subjects or artifact tokens.
    assert!(after.get("subject").is_none());
    assert!(after.get("artifact").is_none());

    Ok(())
}
