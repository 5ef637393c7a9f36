//! Priority-ordered fallback across model backends.
//!
//! # Responsibilities
//! - Walk enabled backends in ascending priority, one at a time
//! - Skip invalid credentials and tripped circuits without a network call
//! - Probe, then invoke with retry; first non-empty text wins
//! - Record every candidate in the run's diagnostics
//!
//! # Design Decisions
//! - No racing: priority order is the operator's quality/cost ranking
//! - Backend errors are converted to attempt records, never propagated
//! - Only `NoBackends` and `AllFailed` leave the run

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::Instrument;
use uuid::Uuid;

use crate::config::RelayConfig;
use crate::diagnostics::{AttemptOutcome, Diagnostics, DiagnosticsRecorder, PendingAttempt};
use crate::health::{HealthProber, HttpHealthProber};
use crate::invoker::request::summarize_payload;
use crate::invoker::{GenerationParameters, HttpModelInvoker, ModelInvoker};
use crate::observability::metrics;
use crate::orchestrator::error::OrchestrationError;
use crate::orchestrator::state::{RunState, RunStateMachine};
use crate::registry::{BackendRegistry, ModelBackend};
use crate::resilience::{retry_with_backoff, CircuitBreaker, RetryPolicy};

/// Tunables of one orchestrator.
#[derive(Debug, Clone, Copy)]
pub struct OrchestratorSettings {
    pub retry: RetryPolicy,
    pub probe_enabled: bool,
    pub probe_timeout: Duration,
}

impl OrchestratorSettings {
    pub fn from_config(config: &RelayConfig) -> Self {
        Self {
            retry: RetryPolicy::from_config(&config.resilience),
            probe_enabled: config.health_check.enabled,
            probe_timeout: Duration::from_secs(config.health_check.timeout_secs),
        }
    }
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self::from_config(&RelayConfig::default())
    }
}

/// Successful generation.
#[derive(Debug, Clone, Serialize)]
pub struct Generation {
    pub text: String,
    /// Name of the backend that produced `text`.
    pub backend: String,
    pub diagnostics: Diagnostics,
}

/// Runs prompts through the registry's backends with fallback.
pub struct FallbackOrchestrator {
    registry: Arc<dyn BackendRegistry>,
    prober: Arc<dyn HealthProber>,
    invoker: Arc<dyn ModelInvoker>,
    breaker: Arc<CircuitBreaker>,
    settings: OrchestratorSettings,
}

impl FallbackOrchestrator {
    pub fn new(
        registry: Arc<dyn BackendRegistry>,
        prober: Arc<dyn HealthProber>,
        invoker: Arc<dyn ModelInvoker>,
        breaker: Arc<CircuitBreaker>,
        settings: OrchestratorSettings,
    ) -> Self {
        Self {
            registry,
            prober,
            invoker,
            breaker,
            settings,
        }
    }

    /// Wire the HTTP prober and invoker over one shared client.
    pub fn from_config(config: &RelayConfig, registry: Arc<dyn BackendRegistry>) -> Self {
        let client = reqwest::Client::new();
        Self::new(
            registry,
            Arc::new(HttpHealthProber::new(client.clone())),
            Arc::new(HttpModelInvoker::from_config(client, config)),
            Arc::new(CircuitBreaker::from_config(&config.resilience)),
            OrchestratorSettings::from_config(config),
        )
    }

    pub fn registry(&self) -> &Arc<dyn BackendRegistry> {
        &self.registry
    }

    pub fn breaker(&self) -> &Arc<CircuitBreaker> {
        &self.breaker
    }

    pub fn parameters(&self) -> GenerationParameters {
        self.invoker.parameters()
    }

    /// Produce text for `prompt` from the first backend that delivers.
    pub async fn generate(&self, prompt: &str) -> Result<Generation, OrchestrationError> {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("generate", run_id = %run_id);
        self.run(run_id, prompt).instrument(span).await
    }

    async fn run(&self, run_id: Uuid, prompt: &str) -> Result<Generation, OrchestrationError> {
        let mut machine = RunStateMachine::new();
        let mut recorder = DiagnosticsRecorder::new(run_id);

        let backends = self.registry.list_enabled_backends().await;
        if backends.is_empty() {
            machine.advance(RunState::Terminal);
            tracing::error!("No enabled model backends configured");
            metrics::record_generation("no_backends");
            return Err(OrchestrationError::NoBackends {
                diagnostics: recorder.finish(),
            });
        }

        tracing::debug!(candidates = backends.len(), "Starting fallback run");
        let summary = summarize_payload(prompt, &self.invoker.parameters());

        for backend in &backends {
            machine.advance(RunState::SelectingCandidate);
            let pending = PendingAttempt::start(backend, summary.clone());

            if !backend.has_valid_credential() {
                machine.advance(RunState::Skipped);
                tracing::warn!(backend = %backend.name, "Skipping backend with invalid credential");
                recorder.record(pending.finish(
                    AttemptOutcome::SkippedInvalidCredential,
                    0,
                    Some("credential is empty, too long, or not header-safe".to_string()),
                    None,
                ));
                continue;
            }

            if self.breaker.is_disabled(&backend.name) {
                machine.advance(RunState::Skipped);
                let failures = self.breaker.failure_count(&backend.name);
                tracing::info!(backend = %backend.name, failures, "Skipping backend with open circuit");
                metrics::record_circuit_state(&backend.name, true);
                recorder.record(pending.finish(
                    AttemptOutcome::SkippedDisabled,
                    0,
                    Some(format!(
                        "temporarily disabled after {} consecutive failures",
                        failures
                    )),
                    None,
                ));
                continue;
            }

            if self.settings.probe_enabled {
                machine.advance(RunState::Probing);
                if !self.prober.probe(backend, self.settings.probe_timeout).await {
                    machine.advance(RunState::Skipped);
                    self.count_failure(backend);
                    recorder.record(pending.finish(
                        AttemptOutcome::NetworkError,
                        0,
                        Some("health probe failed".to_string()),
                        None,
                    ));
                    continue;
                }
            }

            machine.advance(RunState::Invoking);
            let outcome = retry_with_backoff(&self.settings.retry, move |attempt| {
                tracing::debug!(backend = %backend.name, attempt, "Invocation try");
                self.invoker.invoke(backend, prompt)
            })
            .await;

            match outcome.result {
                Ok(text) if !text.trim().is_empty() => {
                    machine.advance(RunState::Succeeded);
                    self.breaker.record_success(&backend.name);
                    metrics::record_circuit_state(&backend.name, false);
                    recorder.record(pending.finish(
                        AttemptOutcome::Success,
                        outcome.tries,
                        None,
                        Some(&text),
                    ));

                    machine.advance(RunState::Terminal);
                    metrics::record_generation("success");
                    tracing::info!(
                        backend = %backend.name,
                        attempts = recorder.len(),
                        "Generation succeeded"
                    );
                    return Ok(Generation {
                        text,
                        backend: backend.name.clone(),
                        diagnostics: recorder.finish(),
                    });
                }
                Ok(_) => {
                    machine.advance(RunState::Failed);
                    tracing::warn!(backend = %backend.name, "Backend returned empty text, falling back");
                    self.count_failure(backend);
                    recorder.record(pending.finish(
                        AttemptOutcome::EmptyResponse,
                        outcome.tries,
                        Some("backend returned no extractable text".to_string()),
                        None,
                    ));
                }
                Err(e) => {
                    machine.advance(RunState::Failed);
                    tracing::warn!(backend = %backend.name, tries = outcome.tries, error = %e, "Backend failed, falling back");
                    self.count_failure(backend);
                    recorder.record(pending.finish(
                        e.outcome(),
                        outcome.tries,
                        Some(e.to_string()),
                        e.body(),
                    ));
                }
            }
        }

        machine.advance(RunState::Terminal);
        metrics::record_generation("all_failed");
        tracing::error!(attempts = recorder.len(), "All model backends failed");
        Err(OrchestrationError::AllFailed {
            diagnostics: recorder.finish(),
        })
    }

    fn count_failure(&self, backend: &ModelBackend) {
        let failures = self.breaker.record_failure(&backend.name);
        metrics::record_circuit_state(&backend.name, failures >= self.breaker.threshold());
    }
}

impl std::fmt::Debug for FallbackOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FallbackOrchestrator")
            .field("settings", &self.settings)
            .field("breaker", &self.breaker)
            .finish()
    }
}
