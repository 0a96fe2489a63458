//! Server configuration.
//!
//! Configuration is loaded from environment variables with sensible
//! defaults. The policy backend selector is the one value that fails
//! loudly on an unrecognized setting instead of falling back to a
//! default.

use std::time::Duration;

use sb_core::BridgeConfig;

/// Which policy backend the authorization endpoint consults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyBackendKind {
    /// Permit every query.
    AllowAll,
    /// Probe the resource with a HEAD request.
    HeadProbe,
}

impl PolicyBackendKind {
    /// Parses a backend selector as it appears in the environment.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "allow_all" => Some(Self::AllowAll),
            "head_probe" => Some(Self::HeadProbe),
            _ => None,
        }
    }

    /// Name used in logs and diagnostics.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::AllowAll => "allow_all",
            Self::HeadProbe => "head_probe",
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server host to bind to.
    pub host: String,

    /// Server port.
    pub port: u16,

    /// Protocol-level settings (issuer, validity windows, artifact
    /// TTL, decision limits).
    pub bridge: BridgeConfig,

    /// Selected policy backend.
    pub policy_backend: PolicyBackendKind,

    /// Seconds between expired-artifact sweeps.
    pub sweep_interval_secs: u64,

    /// Log level.
    pub log_level: String,
}

impl ServerConfig {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if it exists
        let _ = dotenvy::dotenv();

        let host = std::env::var("SB_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = std::env::var("SB_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);

        let issuer_entity_id = std::env::var("SB_ISSUER_ENTITY_ID").unwrap_or_default();

        let validity_secs = std::env::var("SB_ASSERTION_VALIDITY_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(300); // 5 minutes

        let clock_skew_secs = std::env::var("SB_CLOCK_SKEW_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(60); // 1 minute

        let artifact_ttl_secs = std::env::var("SB_ARTIFACT_TTL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(300); // 5 minutes

        let decision_timeout_ms = std::env::var("SB_DECISION_TIMEOUT_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(5000); // 5 seconds

        let max_concurrent_decisions = std::env::var("SB_MAX_CONCURRENT_DECISIONS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(8);

        let policy_backend = match std::env::var("SB_POLICY_BACKEND") {
            Ok(value) => PolicyBackendKind::parse(&value).ok_or_else(|| {
                anyhow::anyhow!("unrecognized SB_POLICY_BACKEND value: {value:?}")
            })?,
            Err(_) => PolicyBackendKind::AllowAll,
        };

        let sweep_interval_secs = std::env::var("SB_SWEEP_INTERVAL_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(60);

        let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            host,
            port,
            bridge: BridgeConfig {
                issuer_entity_id,
                validity_secs,
                clock_skew_secs,
                artifact_ttl_secs,
                decision_timeout_ms,
                max_concurrent_decisions,
            },
            policy_backend,
            sweep_interval_secs,
            log_level,
        })
    }

    /// Creates a configuration for testing.
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 0, // Random port
            bridge: BridgeConfig {
                issuer_entity_id: "https://bridge.test.example/idp".to_string(),
                validity_secs: 300,
                clock_skew_secs: 60,
                artifact_ttl_secs: 300,
                decision_timeout_ms: 1000,
                max_concurrent_decisions: 4,
            },
            policy_backend: PolicyBackendKind::AllowAll,
            sweep_interval_secs: 1,
            log_level: "debug".to_string(),
        }
    }

    /// Returns the sweep interval as a duration.
    #[must_use]
    pub const fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            bridge: BridgeConfig::default(),
            policy_backend: PolicyBackendKind::AllowAll,
            sweep_interval_secs: 60,
            log_level: "info".to_string(),
        }
    }
}
