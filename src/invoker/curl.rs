//! Shell reproduction of a backend request.
//!
//! Operators paste the output into a terminal to replay exactly what the
//! relay sent. The credential is masked unless the caller asks otherwise.

use crate::invoker::request::{GenerationParameters, GenerationRequest};
use crate::registry::ModelBackend;

/// How the credential appears in an exported command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CredentialDisplay {
    #[default]
    Masked,
    /// Clear text. Trusted operator surfaces only.
    Reveal,
}

/// Build a `curl` command equivalent to the invocation of `backend` with `prompt`.
pub fn curl_command(
    backend: &ModelBackend,
    prompt: &str,
    parameters: GenerationParameters,
    display: CredentialDisplay,
) -> String {
    let credential = match display {
        CredentialDisplay::Masked => backend.masked_credential(),
        CredentialDisplay::Reveal => backend.credential.clone(),
    };
    let body = GenerationRequest::new(prompt, parameters).to_json();

    format!(
        "curl -X POST {} \\\n  -H {} \\\n  -H {} \\\n  -d {}",
        shell_quote(&backend.endpoint_url),
        shell_quote(&format!("Authorization: Bearer {}", credential)),
        shell_quote("Content-Type: application/json"),
        shell_quote(&body)
    )
}

/// Single-quote for POSIX shells.
fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "'\\''"))
}
