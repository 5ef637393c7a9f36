use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::diagnostics::{Diagnostics, FailedAttemptView};
use crate::http::request::GenerateRequest;
use crate::http::response::ErrorResponse;
use crate::http::server::AppState;
use crate::invoker::{curl_command, CredentialDisplay};
use crate::orchestrator::ErrorKind;

#[derive(Debug, Serialize, Deserialize)]
pub struct SystemStatus {
    pub version: String,
    pub status: String,
    pub registry: String,
    pub failure_threshold: u32,
    pub failure_window_secs: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BackendStatus {
    pub name: String,
    pub endpoint_url: String,
    pub priority: i64,
    pub credential: String,
    pub credential_valid: bool,
    pub consecutive_failures: u32,
    pub disabled: bool,
}

/// Generation outcome with the operator-only diagnostics attached.
#[derive(Debug, Serialize, Deserialize)]
pub struct DiagnosedGeneration {
    pub text: Option<String>,
    pub backend: Option<String>,
    pub kind: Option<ErrorKind>,
    pub trace: String,
    pub failed_attempts: Vec<FailedAttemptView>,
    pub diagnostics: Diagnostics,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReproduceRequest {
    pub backend: String,
    pub prompt: String,
    #[serde(default)]
    pub reveal: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReproduceResponse {
    pub backend: String,
    pub command: String,
}

pub async fn get_status(State(state): State<AppState>) -> Json<SystemStatus> {
    let breaker = state.orchestrator.breaker();
    let registry = if state.static_registry.is_some() { "static" } else { "rest" };
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION").to_string(),
        status: "operational".to_string(),
        registry: registry.to_string(),
        failure_threshold: breaker.threshold(),
        failure_window_secs: breaker.window().as_secs(),
    })
}

/// Enabled backends in candidate order, credentials masked.
pub async fn get_backends(State(state): State<AppState>) -> Json<Vec<BackendStatus>> {
    let breaker = state.orchestrator.breaker();
    let backends = state.orchestrator.registry().list_enabled_backends().await;

    let statuses = backends
        .into_iter()
        .map(|b| BackendStatus {
            credential: b.masked_credential(),
            credential_valid: b.has_valid_credential(),
            consecutive_failures: breaker.failure_count(&b.name),
            disabled: breaker.is_disabled(&b.name),
            name: b.name,
            endpoint_url: b.endpoint_url,
            priority: b.priority,
        })
        .collect();

    Json(statuses)
}

/// Run a generation and return everything the operator needs to debug it.
pub async fn post_generate(
    State(state): State<AppState>,
    Json(request): Json<GenerateRequest>,
) -> Response {
    if request.prompt.trim().is_empty() {
        return ErrorResponse::bad_request("prompt must not be empty");
    }

    match state.orchestrator.generate(&request.prompt).await {
        Ok(generation) => Json(DiagnosedGeneration {
            text: Some(generation.text),
            backend: Some(generation.backend),
            kind: None,
            trace: generation.diagnostics.trace(),
            failed_attempts: generation.diagnostics.failed_attempts(),
            diagnostics: generation.diagnostics,
        })
        .into_response(),
        Err(e) => {
            let kind = e.kind();
            let diagnostics = e.into_diagnostics();
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(DiagnosedGeneration {
                    text: None,
                    backend: None,
                    kind: Some(kind),
                    trace: diagnostics.trace(),
                    failed_attempts: diagnostics.failed_attempts(),
                    diagnostics,
                }),
            )
                .into_response()
        }
    }
}

/// Export a curl command reproducing one backend call.
pub async fn post_reproduce(
    State(state): State<AppState>,
    Json(request): Json<ReproduceRequest>,
) -> Response {
    let backends = state.orchestrator.registry().list_enabled_backends().await;
    let Some(backend) = backends.into_iter().find(|b| b.name == request.backend) else {
        return (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("unknown backend '{}'", request.backend),
                kind: None,
            }),
        )
            .into_response();
    };

    let display = if request.reveal {
        tracing::warn!(backend = %backend.name, "Exporting debug command with clear-text credential");
        CredentialDisplay::Reveal
    } else {
        CredentialDisplay::Masked
    };

    let command = curl_command(&backend, &request.prompt, state.orchestrator.parameters(), display);
    Json(ReproduceResponse {
        backend: backend.name,
        command,
    })
    .into_response()
}
