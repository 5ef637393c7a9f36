//! Response mapping.
//!
//! # Responsibilities
//! - Shape successful generations for clients
//! - Map orchestration failures to `503` with a generic message
//! - Map request deadline expiry to the same `503` body
//!
//! # Design Decisions
//! - Public responses never include diagnostics, statuses or backend text

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::orchestrator::{ErrorKind, OrchestrationError, USER_FACING_MESSAGE};

/// Body of a successful `POST /v1/generate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub text: String,
}

/// Body of every error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<ErrorKind>,
}

impl ErrorResponse {
    pub fn bad_request(message: impl Into<String>) -> Response {
        (
            StatusCode::BAD_REQUEST,
            Json(Self {
                error: message.into(),
                kind: None,
            }),
        )
            .into_response()
    }
}

impl IntoResponse for OrchestrationError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.user_message().to_string(),
            kind: Some(self.kind()),
        };
        (StatusCode::SERVICE_UNAVAILABLE, Json(body)).into_response()
    }
}

/// Turn the empty `408` the timeout layer emits into the public `503` body.
pub async fn map_request_timeout(response: Response) -> Response {
    if response.status() != StatusCode::REQUEST_TIMEOUT {
        return response;
    }

    tracing::warn!("Request deadline expired before the fallback run finished");
    let body = ErrorResponse {
        error: USER_FACING_MESSAGE.to_string(),
        kind: None,
    };
    (StatusCode::SERVICE_UNAVAILABLE, Json(body)).into_response()
}
