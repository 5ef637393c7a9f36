//! Pre-flight health probing.
//!
//! # Responsibilities
//! - Check that a backend answers before spending an invocation on it
//! - Report reachability as a plain bool; never error

use std::time::Duration;

use async_trait::async_trait;

use crate::observability::metrics;
use crate::registry::ModelBackend;
use crate::resilience::with_timeout;

/// Cheap reachability check for one backend.
#[async_trait]
pub trait HealthProber: Send + Sync {
    /// `false` on network error, non-success status, or timeout.
    async fn probe(&self, backend: &ModelBackend, timeout: Duration) -> bool;
}

/// Probes with a HEAD request carrying the backend credential.
#[derive(Debug, Clone, Default)]
pub struct HttpHealthProber {
    client: reqwest::Client,
}

impl HttpHealthProber {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HealthProber for HttpHealthProber {
    async fn probe(&self, backend: &ModelBackend, timeout: Duration) -> bool {
        let request = self
            .client
            .head(&backend.endpoint_url)
            .bearer_auth(&backend.credential)
            .header("user-agent", "llm-relay-health-check")
            .send();

        let healthy = match with_timeout(timeout, request).await {
            Ok(Ok(response)) => {
                let success = response.status().is_success();
                if !success {
                    tracing::warn!(backend = %backend.name, status = %response.status(), "Health probe failed: non-success status");
                }
                success
            }
            Ok(Err(e)) => {
                tracing::warn!(backend = %backend.name, error = %e, "Health probe failed: connection error");
                false
            }
            Err(_) => {
                tracing::warn!(backend = %backend.name, timeout = ?timeout, "Health probe failed: timeout");
                false
            }
        };

        metrics::record_backend_health(&backend.name, healthy);
        healthy
    }
}
