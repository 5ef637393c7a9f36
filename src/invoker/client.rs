//! HTTP inference client.
//!
//! # Responsibilities
//! - POST the generation request to one backend with its bearer credential
//! - Enforce the invocation deadline
//! - Map transport, status and decode failures to `InvokeError`
//! - Normalize the body to plain text

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::RelayConfig;
use crate::diagnostics::attempt::AttemptOutcome;
use crate::diagnostics::masking::redact;
use crate::invoker::request::{GenerationParameters, GenerationRequest};
use crate::invoker::response::normalize_response;
use crate::registry::ModelBackend;
use crate::resilience::with_timeout;

/// Bytes of an error body kept in diagnostics.
const ERROR_BODY_LIMIT: usize = 500;

/// Failure of a single invocation try.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvokeError {
    /// Backend answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// Connection, DNS, TLS or request-building failure.
    #[error("network error: {0}")]
    Network(String),

    /// The invocation deadline elapsed.
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    /// A success status with a body that is not JSON.
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl InvokeError {
    /// Diagnostic outcome once retries are exhausted.
    pub fn outcome(&self) -> AttemptOutcome {
        match self {
            Self::Http { .. } | Self::Malformed(_) => AttemptOutcome::HttpError,
            Self::Network(_) | Self::Timeout(_) => AttemptOutcome::NetworkError,
        }
    }

    /// Raw body text attached to the error, if any.
    pub fn body(&self) -> Option<&str> {
        match self {
            Self::Http { body, .. } => Some(body),
            _ => None,
        }
    }
}

/// Issues one inference request and returns normalized text.
///
/// Empty text is a successful return; deciding what it means is the
/// orchestrator's job.
#[async_trait]
pub trait ModelInvoker: Send + Sync {
    async fn invoke(&self, backend: &ModelBackend, prompt: &str) -> Result<String, InvokeError>;

    /// Parameters sent with each request, for diagnostics and debug export.
    fn parameters(&self) -> GenerationParameters {
        GenerationParameters::default()
    }
}

/// reqwest-based invoker.
#[derive(Debug, Clone)]
pub struct HttpModelInvoker {
    client: reqwest::Client,
    parameters: GenerationParameters,
    timeout: Duration,
}

impl HttpModelInvoker {
    pub fn new(client: reqwest::Client, parameters: GenerationParameters, timeout: Duration) -> Self {
        Self {
            client,
            parameters,
            timeout,
        }
    }

    pub fn from_config(client: reqwest::Client, config: &RelayConfig) -> Self {
        Self::new(
            client,
            GenerationParameters::from(&config.generation),
            Duration::from_secs(config.resilience.invoke_timeout_secs),
        )
    }

    async fn send(&self, backend: &ModelBackend, prompt: &str) -> Result<String, InvokeError> {
        let body = GenerationRequest::new(prompt, self.parameters);
        let response = self
            .client
            .post(&backend.endpoint_url)
            .bearer_auth(&backend.credential)
            .json(&body)
            .send()
            .await
            .map_err(|e| InvokeError::Network(redact(&e.to_string(), &backend.credential)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| InvokeError::Network(redact(&e.to_string(), &backend.credential)))?;

        if !status.is_success() {
            return Err(InvokeError::Http {
                status: status.as_u16(),
                body: truncate(&redact(&text, &backend.credential), ERROR_BODY_LIMIT),
            });
        }

        let value: serde_json::Value = serde_json::from_str(&text).map_err(|e| {
            InvokeError::Malformed(format!(
                "{} (body: {})",
                e,
                truncate(&redact(&text, &backend.credential), 120)
            ))
        })?;

        Ok(normalize_response(&value))
    }
}

#[async_trait]
impl ModelInvoker for HttpModelInvoker {
    async fn invoke(&self, backend: &ModelBackend, prompt: &str) -> Result<String, InvokeError> {
        tracing::debug!(
            backend = %backend.name,
            endpoint = %backend.endpoint_url,
            credential = %backend.masked_credential(),
            prompt_chars = prompt.chars().count(),
            "Invoking model backend"
        );

        match with_timeout(self.timeout, self.send(backend, prompt)).await {
            Ok(result) => result,
            Err(elapsed) => Err(InvokeError::Timeout(elapsed.0)),
        }
    }

    fn parameters(&self) -> GenerationParameters {
        self.parameters
    }
}

/// Truncate to at most `limit` characters, marking the cut.
pub fn truncate(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(limit).collect();
    cut.push_str("...");
    cut
}
