//! Per-run attempt accumulation and rendering.

use chrono::SecondsFormat;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::diagnostics::attempt::{AttemptOutcome, InvocationAttempt};
use crate::observability::metrics;

/// Collects attempts for one orchestration run, in order.
#[derive(Debug)]
pub struct DiagnosticsRecorder {
    run_id: Uuid,
    attempts: Vec<InvocationAttempt>,
}

impl DiagnosticsRecorder {
    pub fn new(run_id: Uuid) -> Self {
        Self {
            run_id,
            attempts: Vec::new(),
        }
    }

    pub fn record(&mut self, attempt: InvocationAttempt) {
        tracing::debug!(
            backend = %attempt.backend_name,
            outcome = %attempt.outcome,
            tries = attempt.tries,
            duration_ms = attempt.duration_ms,
            "Attempt recorded"
        );
        metrics::record_attempt(
            &attempt.backend_name,
            attempt.outcome.as_str(),
            std::time::Duration::from_millis(attempt.duration_ms),
        );
        self.attempts.push(attempt);
    }

    pub fn len(&self) -> usize {
        self.attempts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attempts.is_empty()
    }

    pub fn finish(self) -> Diagnostics {
        Diagnostics {
            run_id: self.run_id,
            attempts: self.attempts,
        }
    }
}

/// The immutable attempt trail of a finished run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics {
    pub run_id: Uuid,
    pub attempts: Vec<InvocationAttempt>,
}

/// Row of the "failed attempts" operator view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedAttemptView {
    pub model: String,
    pub endpoint: String,
    pub outcome: AttemptOutcome,
    pub request_payload: String,
    pub response: Option<String>,
    pub error: Option<String>,
    pub timestamp: String,
}

impl Diagnostics {
    /// Human-readable multi-line trace for an inline debug panel.
    pub fn trace(&self) -> String {
        let mut lines = vec![format!(
            "run {}: {} attempt(s)",
            self.run_id,
            self.attempts.len()
        )];

        for (i, attempt) in self.attempts.iter().enumerate() {
            let mut line = format!(
                "[{}] {} ({}, key {}) {}",
                i + 1,
                attempt.backend_name,
                attempt.endpoint_url,
                attempt.masked_credential,
                attempt.outcome
            );
            if !attempt.outcome.is_skip() {
                let unit = if attempt.tries == 1 { "try" } else { "tries" };
                line.push_str(&format!(
                    " after {} {} in {}ms",
                    attempt.tries, unit, attempt.duration_ms
                ));
            }
            if let Some(detail) = &attempt.error_detail {
                line.push_str(": ");
                line.push_str(detail);
            }
            lines.push(line);
        }

        lines.join("\n")
    }

    /// Structured list of every non-successful attempt.
    pub fn failed_attempts(&self) -> Vec<FailedAttemptView> {
        self.attempts
            .iter()
            .filter(|a| a.outcome != AttemptOutcome::Success)
            .map(|a| FailedAttemptView {
                model: a.backend_name.clone(),
                endpoint: a.endpoint_url.clone(),
                outcome: a.outcome,
                request_payload: a.request_payload_summary.clone(),
                response: a.response_snippet.clone(),
                error: a.error_detail.clone(),
                timestamp: a.started_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            })
            .collect()
    }

    /// Backend names in attempt order.
    pub fn backend_sequence(&self) -> Vec<&str> {
        self.attempts.iter().map(|a| a.backend_name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.attempts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attempts.is_empty()
    }
}
