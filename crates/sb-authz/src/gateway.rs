//! Decision orchestration over a policy backend.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::timeout;
use tracing::warn;

use sb_core::event::{Event, EventType};
use sb_protocol::{Decision, DecisionOutcome};

use crate::backend::PolicyBackend;

/// Runs authorization decisions against a policy backend.
///
/// Concurrency is bounded by a semaphore sized at construction, and
/// every decision runs under its own timeout. Failures and timeouts
/// surface as [`DecisionOutcome::Indeterminate`], never as a permit.
pub struct AuthorizationGateway {
    backend: Arc<dyn PolicyBackend>,
    decision_timeout: Duration,
    fan_out: Arc<Semaphore>,
}

impl AuthorizationGateway {
    /// Creates a gateway over `backend` with the given per-decision
    /// timeout and fan-out bound.
    #[must_use]
    pub fn new(
        backend: Arc<dyn PolicyBackend>,
        decision_timeout: Duration,
        max_concurrent: usize,
    ) -> Self {
        Self {
            backend,
            decision_timeout,
            fan_out: Arc::new(Semaphore::new(max_concurrent.max(1))),
        }
    }

    /// Short name of the backend behind this gateway.
    #[must_use]
    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    /// Decides a single resource.
    ///
    /// Backend errors and timeouts come back as indeterminate.
    pub async fn decide(&self, subject: &str, resource: &str) -> DecisionOutcome {
        checked(
            Arc::clone(&self.backend),
            self.decision_timeout,
            subject.to_string(),
            resource.to_string(),
        )
        .await
    }

    /// Decides a batch of resources, preserving input order.
    ///
    /// Each resource is decided independently under the fan-out
    /// bound; one slow or failing probe affects only its own slot.
    pub async fn decide_batch(&self, subject: &str, resources: &[String]) -> Vec<Decision> {
        let mut outcomes: Vec<Option<DecisionOutcome>> = vec![None; resources.len()];
        let mut tasks = JoinSet::new();

        for (index, resource) in resources.iter().enumerate() {
            let permit = match Arc::clone(&self.fan_out).acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => {
                    warn!("decision semaphore closed, abandoning remainder of batch");
                    break;
                }
            };
            let backend = Arc::clone(&self.backend);
            let decision_timeout = self.decision_timeout;
            let subject = subject.to_string();
            let resource = resource.clone();
            tasks.spawn(async move {
                let outcome = checked(backend, decision_timeout, subject, resource).await;
                drop(permit);
                (index, outcome)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, outcome)) => outcomes[index] = Some(outcome),
                Err(join_error) => {
                    // A panicking backend loses its own slot only;
                    // the slot falls back to indeterminate below.
                    warn!(%join_error, "decision task aborted");
                }
            }
        }

        resources
            .iter()
            .zip(outcomes)
            .map(|(resource, outcome)| Decision {
                resource: resource.clone(),
                outcome: outcome.unwrap_or(DecisionOutcome::Indeterminate),
            })
            .collect()
    }
}

async fn checked(
    backend: Arc<dyn PolicyBackend>,
    decision_timeout: Duration,
    subject: String,
    resource: String,
) -> DecisionOutcome {
    match timeout(decision_timeout, backend.check(&subject, &resource)).await {
        Ok(Ok(outcome)) => outcome,
        Ok(Err(err)) => {
            warn!(%err, resource, "policy backend error");
            Event::builder(EventType::PolicyBackendError)
                .failure(err.to_string())
                .subject(subject)
                .detail("resource", resource)
                .build()
                .emit();
            DecisionOutcome::Indeterminate
        }
        Err(_) => {
            warn!(
                resource,
                timeout_ms = %decision_timeout.as_millis(),
                "policy decision timed out"
            );
            Event::builder(EventType::DecisionTimeout)
                .failure("decision timed out")
                .subject(subject)
                .detail("resource", resource)
                .build()
                .emit();
            DecisionOutcome::Indeterminate
        }
    }
}
