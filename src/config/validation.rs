//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, sampling parameters in range)
//! - Check backend definitions (unique names, parsable endpoints)
//! - Reject unsafe admin setups
//! - Make sure the request deadline covers a full fallback run
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RelayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::time::Duration;

use thiserror::Error;

use crate::config::schema::{RegistrySource, RelayConfig, PLACEHOLDER_ADMIN_KEY};
use crate::resilience::RetryPolicy;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{field} must not be empty")]
    Empty { field: String },

    #[error("{field} must be greater than zero")]
    Zero { field: String },

    #[error("{field} = {value} is out of range ({range})")]
    OutOfRange {
        field: String,
        value: String,
        range: &'static str,
    },

    #[error("duplicate backend name '{0}'")]
    DuplicateBackend(String),

    #[error("backend '{name}' has an invalid endpoint URL: {reason}")]
    InvalidEndpoint { name: String, reason: String },

    #[error("admin routes are enabled with the placeholder API key")]
    PlaceholderAdminKey,

    #[error(
        "server.request_timeout_secs = {timeout_secs} is shorter than a full fallback run \
         over {backends} backend(s) ({required_secs}s)"
    )]
    RequestTimeoutTooShort {
        timeout_secs: u64,
        required_secs: u64,
        backends: usize,
    },
}

/// Longest time one request can spend walking `backends` backends that all fail.
///
/// Each backend costs a health check (when enabled), every try at the invoke
/// timeout and the backoff sleeps between tries.
pub fn worst_case_fallback_duration(config: &RelayConfig, backends: usize) -> Duration {
    let policy = RetryPolicy::from_config(&config.resilience);
    let tries = policy.max_attempts.max(1);
    let invoke_timeout = Duration::from_secs(config.resilience.invoke_timeout_secs);

    let mut per_backend = invoke_timeout.saturating_mul(tries);
    for attempt in 1..tries {
        per_backend = per_backend.saturating_add(policy.delay_after(attempt));
    }
    if config.health_check.enabled {
        per_backend = per_backend.saturating_add(Duration::from_secs(config.health_check.timeout_secs));
    }

    per_backend.saturating_mul(u32::try_from(backends).unwrap_or(u32::MAX))
}

fn ceil_secs(duration: Duration) -> u64 {
    let secs = duration.as_secs();
    if duration.subsec_nanos() > 0 {
        secs.saturating_add(1)
    } else {
        secs
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &RelayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.server.bind_address.trim().is_empty() {
        errors.push(empty("server.bind_address"));
    }
    if config.server.request_timeout_secs == 0 {
        errors.push(zero("server.request_timeout_secs"));
    }

    let resilience = &config.resilience;
    if resilience.max_attempts == 0 {
        errors.push(zero("resilience.max_attempts"));
    }
    if resilience.invoke_timeout_secs == 0 {
        errors.push(zero("resilience.invoke_timeout_secs"));
    }
    if resilience.failure_threshold == 0 {
        errors.push(zero("resilience.failure_threshold"));
    }
    if resilience.failure_window_secs == 0 {
        errors.push(zero("resilience.failure_window_secs"));
    }
    if config.health_check.enabled && config.health_check.timeout_secs == 0 {
        errors.push(zero("health_check.timeout_secs"));
    }

    let generation = &config.generation;
    if generation.max_new_tokens == 0 {
        errors.push(zero("generation.max_new_tokens"));
    }
    if !(0.0..=2.0).contains(&generation.temperature) {
        errors.push(ValidationError::OutOfRange {
            field: "generation.temperature".to_string(),
            value: generation.temperature.to_string(),
            range: "0.0..=2.0",
        });
    }
    if !(generation.top_p > 0.0 && generation.top_p <= 1.0) {
        errors.push(ValidationError::OutOfRange {
            field: "generation.top_p".to_string(),
            value: generation.top_p.to_string(),
            range: "(0.0, 1.0]",
        });
    }

    if config.registry.source == RegistrySource::Rest {
        if config.registry.url.trim().is_empty() {
            errors.push(empty("registry.url"));
        }
        if config.registry.table.trim().is_empty() {
            errors.push(empty("registry.table"));
        }
    }

    let mut seen = HashSet::new();
    for backend in &config.backends {
        if backend.name.trim().is_empty() {
            errors.push(empty("backends.name"));
            continue;
        }
        if !seen.insert(backend.name.as_str()) {
            errors.push(ValidationError::DuplicateBackend(backend.name.clone()));
        }
        if let Err(e) = url::Url::parse(&backend.endpoint_url) {
            errors.push(ValidationError::InvalidEndpoint {
                name: backend.name.clone(),
                reason: e.to_string(),
            });
        }
    }

    // The backend count is only known up front for a static registry.
    if config.registry.source == RegistrySource::Static && config.server.request_timeout_secs > 0 {
        let backends = config.backends.iter().filter(|b| b.enabled).count();
        let required_secs = ceil_secs(worst_case_fallback_duration(config, backends));
        if config.server.request_timeout_secs < required_secs {
            errors.push(ValidationError::RequestTimeoutTooShort {
                timeout_secs: config.server.request_timeout_secs,
                required_secs,
                backends,
            });
        }
    }

    if config.admin.enabled
        && (config.admin.api_key.trim().is_empty() || config.admin.api_key == PLACEHOLDER_ADMIN_KEY)
    {
        errors.push(ValidationError::PlaceholderAdminKey);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn empty(field: &str) -> ValidationError {
    ValidationError::Empty {
        field: field.to_string(),
    }
}

fn zero(field: &str) -> ValidationError {
    ValidationError::Zero {
        field: field.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::BackendConfig;

    fn backend(name: &str, url: &str) -> BackendConfig {
        BackendConfig {
            name: name.to_string(),
            endpoint_url: url.to_string(),
            credential: Some("hf_0123456789".to_string()),
            credential_env: None,
            priority: 1,
            enabled: true,
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&RelayConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = RelayConfig::default();
        config.resilience.max_attempts = 0;
        config.resilience.failure_threshold = 0;
        config.generation.top_p = 1.5;
        config.backends.push(backend("a", "https://example.com/a"));
        config.backends.push(backend("a", "not a url"));

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 5);
        assert!(errors.contains(&ValidationError::DuplicateBackend("a".to_string())));
        assert!(errors
            .iter()
            .any(|e| matches!(e, ValidationError::InvalidEndpoint { .. })));
    }

    #[test]
    fn test_rest_source_requires_url() {
        let mut config = RelayConfig::default();
        config.registry.source = RegistrySource::Rest;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors[0].to_string(), "registry.url must not be empty");
    }

    #[test]
    fn test_worst_case_fallback_duration() {
        let config = RelayConfig::default();
        // 5s health check + 3 x 30s tries + 1s + 2s backoff.
        assert_eq!(
            worst_case_fallback_duration(&config, 1),
            Duration::from_secs(98)
        );
        assert_eq!(
            worst_case_fallback_duration(&config, 2),
            Duration::from_secs(196)
        );
        assert_eq!(worst_case_fallback_duration(&config, 0), Duration::ZERO);
    }

    #[test]
    fn test_request_timeout_must_cover_fallback_run() {
        let mut config = RelayConfig::default();
        config.backends.push(backend("a", "https://example.com/a"));
        assert!(validate_config(&config).is_ok());

        config.backends.push(backend("b", "https://example.com/b"));
        assert_eq!(
            validate_config(&config).unwrap_err(),
            vec![ValidationError::RequestTimeoutTooShort {
                timeout_secs: 180,
                required_secs: 196,
                backends: 2,
            }]
        );

        config.server.request_timeout_secs = 196;
        assert!(validate_config(&config).is_ok());

        // Disabled backends are never walked.
        config.server.request_timeout_secs = 180;
        config.backends[1].enabled = false;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_request_timeout_rounds_backoff_up() {
        let mut config = RelayConfig::default();
        config.health_check.enabled = false;
        config.resilience.max_attempts = 2;
        config.resilience.invoke_timeout_secs = 1;
        config.resilience.initial_delay_ms = 500;
        config.backends.push(backend("a", "https://example.com/a"));

        config.server.request_timeout_secs = 2;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::RequestTimeoutTooShort {
                timeout_secs: 2,
                required_secs: 3,
                backends: 1,
            }]
        );

        config.server.request_timeout_secs = 3;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_admin_placeholder_rejected() {
        let mut config = RelayConfig::default();
        config.admin.enabled = true;
        assert_eq!(
            validate_config(&config).unwrap_err(),
            vec![ValidationError::PlaceholderAdminKey]
        );

        config.admin.api_key = "a-real-operator-key".to_string();
        assert!(validate_config(&config).is_ok());
    }
}
