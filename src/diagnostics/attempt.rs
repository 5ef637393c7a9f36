//! Attempt records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::time::Instant;

use crate::diagnostics::masking::redact;
use crate::invoker::client::truncate;
use crate::registry::ModelBackend;

/// Characters of a response kept in an attempt record.
pub const RESPONSE_SNIPPET_CHARS: usize = 200;

/// How one backend attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttemptOutcome {
    Success,
    HttpError,
    NetworkError,
    EmptyResponse,
    SkippedDisabled,
    SkippedInvalidCredential,
}

impl AttemptOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::HttpError => "http_error",
            Self::NetworkError => "network_error",
            Self::EmptyResponse => "empty_response",
            Self::SkippedDisabled => "skipped_disabled",
            Self::SkippedInvalidCredential => "skipped_invalid_credential",
        }
    }

    /// The backend was passed over without any network call.
    pub fn is_skip(&self) -> bool {
        matches!(self, Self::SkippedDisabled | Self::SkippedInvalidCredential)
    }
}

impl std::fmt::Display for AttemptOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One try against one backend within one orchestration run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvocationAttempt {
    pub backend_name: String,
    pub endpoint_url: String,
    pub masked_credential: String,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
    pub outcome: AttemptOutcome,
    pub error_detail: Option<String>,
    pub request_payload_summary: String,
    pub response_snippet: Option<String>,
    /// Invocation tries spent, retries included. Zero for skips and failed probes.
    pub tries: u32,
}

/// An attempt that has started but not finished.
///
/// Holds the raw credential only to scrub it from error text.
pub struct PendingAttempt {
    backend_name: String,
    endpoint_url: String,
    masked_credential: String,
    credential: String,
    started_at: DateTime<Utc>,
    started: Instant,
    request_payload_summary: String,
}

impl PendingAttempt {
    pub fn start(backend: &ModelBackend, request_payload_summary: String) -> Self {
        Self {
            backend_name: backend.name.clone(),
            endpoint_url: backend.endpoint_url.clone(),
            masked_credential: backend.masked_credential(),
            credential: backend.credential.clone(),
            started_at: Utc::now(),
            started: Instant::now(),
            request_payload_summary,
        }
    }

    pub fn backend_name(&self) -> &str {
        &self.backend_name
    }

    /// Seal the attempt. Error text and snippet are scrubbed of the credential.
    pub fn finish(
        self,
        outcome: AttemptOutcome,
        tries: u32,
        error_detail: Option<String>,
        response_snippet: Option<&str>,
    ) -> InvocationAttempt {
        let credential = self.credential;
        InvocationAttempt {
            backend_name: self.backend_name,
            endpoint_url: self.endpoint_url,
            masked_credential: self.masked_credential,
            started_at: self.started_at,
            duration_ms: self.started.elapsed().as_millis() as u64,
            outcome,
            error_detail: error_detail.map(|detail| redact(&detail, &credential)),
            request_payload_summary: self.request_payload_summary,
            response_snippet: response_snippet
                .map(|snippet| truncate(&redact(snippet, &credential), RESPONSE_SNIPPET_CHARS)),
            tries,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_serializes_snake_case() {
        let value = serde_json::to_value(AttemptOutcome::SkippedInvalidCredential).unwrap();
        assert_eq!(value, "skipped_invalid_credential");
        assert_eq!(AttemptOutcome::HttpError.to_string(), "http_error");
        assert!(AttemptOutcome::SkippedDisabled.is_skip());
        assert!(!AttemptOutcome::NetworkError.is_skip());
    }

    #[tokio::test]
    async fn test_finish_scrubs_credential() {
        let backend = ModelBackend::new("a", "https://a", "sk-very-secret-123", 1);
        let attempt = PendingAttempt::start(&backend, "inputs=\"hi\"".to_string()).finish(
            AttemptOutcome::HttpError,
            3,
            Some("HTTP 401: bad token sk-very-secret-123".to_string()),
            Some(&"x".repeat(1000)),
        );

        assert_eq!(attempt.backend_name, "a");
        assert_eq!(attempt.tries, 3);
        assert!(!attempt.error_detail.as_deref().unwrap().contains("sk-very-secret-123"));
        assert_eq!(attempt.masked_credential, "sk-v...-123");
        assert!(attempt.response_snippet.unwrap().chars().count() <= RESPONSE_SNIPPET_CHARS + 3);
    }
}
