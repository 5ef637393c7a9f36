//! Model backend abstraction.
//!
//! # Responsibilities
//! - Represent a single configured inference endpoint
//! - Decide whether its credential is structurally usable
//! - Keep the credential out of `Debug` output

use serde::{Deserialize, Serialize};

use crate::diagnostics::masking::mask_credential;

/// Upper bound on credential length accepted by the orchestrator.
pub const MAX_CREDENTIAL_LEN: usize = 1024;

/// A single model backend.
#[derive(Clone, Serialize, Deserialize)]
pub struct ModelBackend {
    /// Opaque identifier (row id, or the name for config-defined backends).
    pub id: String,
    /// Display and matching key.
    pub name: String,
    /// Inference endpoint.
    pub endpoint_url: String,
    /// Bearer credential. Never logged in full.
    #[serde(skip_serializing)]
    pub credential: String,
    /// Ascending: lower values are tried first.
    pub priority: i64,
    /// Disabled backends are filtered out by the registry.
    pub enabled: bool,
}

impl ModelBackend {
    /// Create an enabled backend whose id is its name.
    ///
    /// Surrounding whitespace is stripped from the credential.
    pub fn new(
        name: impl Into<String>,
        endpoint_url: impl Into<String>,
        credential: impl Into<String>,
        priority: i64,
    ) -> Self {
        let name = name.into();
        Self {
            id: name.clone(),
            name,
            endpoint_url: endpoint_url.into(),
            credential: normalize_credential(credential.into()),
            priority,
            enabled: true,
        }
    }

    /// Basic structural check: non-empty, bounded, header-safe, no
    /// surrounding whitespace.
    pub fn has_valid_credential(&self) -> bool {
        let credential = self.credential.trim();
        !credential.is_empty()
            && credential.len() == self.credential.len()
            && self.credential.len() <= MAX_CREDENTIAL_LEN
            && !self.credential.chars().any(|c| c.is_control())
    }

    /// Masked form of the credential, safe for traces.
    pub fn masked_credential(&self) -> String {
        mask_credential(&self.credential)
    }
}

impl std::fmt::Debug for ModelBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelBackend")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("endpoint_url", &self.endpoint_url)
            .field("credential", &self.masked_credential())
            .field("priority", &self.priority)
            .field("enabled", &self.enabled)
            .finish()
    }
}

/// Strip surrounding whitespace, reusing the allocation when there is none.
pub fn normalize_credential(credential: String) -> String {
    let trimmed = credential.trim();
    if trimmed.len() == credential.len() {
        credential
    } else {
        trimmed.to_string()
    }
}

/// Keep enabled backends and order them by ascending priority.
///
/// The sort is stable, so equal priorities keep insertion order.
pub fn order_enabled(backends: impl IntoIterator<Item = ModelBackend>) -> Vec<ModelBackend> {
    let mut enabled: Vec<ModelBackend> = backends.into_iter().filter(|b| b.enabled).collect();
    enabled.sort_by_key(|b| b.priority);
    enabled
}
