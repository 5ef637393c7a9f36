//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the relay.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the relay.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RelayConfig {
    /// HTTP surface (bind address, request timeout).
    pub server: ServerConfig,

    /// Where the model registry is read from.
    pub registry: RegistryConfig,

    /// Statically configured model backends.
    pub backends: Vec<BackendConfig>,

    /// Retry, backoff and circuit breaker thresholds.
    pub resilience: ResilienceConfig,

    /// Health probe settings.
    pub health_check: HealthCheckConfig,

    /// Sampling parameters sent to every backend.
    pub generation: GenerationConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Operator routes.
    pub admin: AdminConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Upper bound on a whole inbound request, in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 180,
        }
    }
}

/// Registry backing store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RegistrySource {
    /// `[[backends]]` tables in this file.
    #[default]
    Static,
    /// Hosted Postgres via its REST interface.
    Rest,
}

/// Model registry configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RegistryConfig {
    pub source: RegistrySource,

    /// Base URL of the hosted store (REST source only).
    pub url: String,

    /// Table holding backend rows.
    pub table: String,

    /// Service key for the REST interface.
    pub api_key: String,

    /// Environment variable holding the service key, used when `api_key` is empty.
    pub api_key_env: Option<String>,

    /// Timeout for one registry read, in seconds.
    pub timeout_secs: u64,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            source: RegistrySource::Static,
            url: String::new(),
            table: "ai_models".to_string(),
            api_key: String::new(),
            api_key_env: None,
            timeout_secs: 10,
        }
    }
}

/// Model backend definition.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BackendConfig {
    /// Unique backend name.
    pub name: String,

    /// Inference endpoint URL.
    pub endpoint_url: String,

    /// Inline credential.
    #[serde(default)]
    pub credential: Option<String>,

    /// Environment variable holding the credential.
    #[serde(default)]
    pub credential_env: Option<String>,

    /// Ascending priority (lower is tried first).
    #[serde(default)]
    pub priority: i64,

    /// Disabled backends are never tried.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl BackendConfig {
    /// Resolve the credential: inline value first, then the named env var.
    pub fn resolve_credential(&self) -> String {
        if let Some(credential) = &self.credential {
            return credential.clone();
        }
        self.credential_env
            .as_deref()
            .and_then(|var| std::env::var(var).ok())
            .unwrap_or_default()
    }
}

fn default_enabled() -> bool {
    true
}

/// Retry, backoff and circuit breaker configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ResilienceConfig {
    /// Total invocation tries per backend (first try included).
    pub max_attempts: u32,

    /// Delay before the second try; doubles after each further failure.
    pub initial_delay_ms: u64,

    /// Cap on a single backoff delay.
    pub max_delay_ms: u64,

    /// Hard timeout for one invocation, in seconds.
    pub invoke_timeout_secs: u64,

    /// Consecutive failures that disable a backend.
    pub failure_threshold: u32,

    /// Window after the last failure during which the count is kept.
    pub failure_window_secs: u64,
}

impl Default for ResilienceConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay_ms: 1000,
            max_delay_ms: 30_000,
            invoke_timeout_secs: 30,
            failure_threshold: 5,
            failure_window_secs: 300,
        }
    }
}

/// Health probe configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct HealthCheckConfig {
    /// Probe each candidate before invoking it.
    pub enabled: bool,

    /// Probe timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for HealthCheckConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            timeout_secs: 5,
        }
    }
}

/// Sampling parameters for generation requests.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct GenerationConfig {
    pub max_new_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub do_sample: bool,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_new_tokens: 1024,
            temperature: 0.7,
            top_p: 0.9,
            do_sample: true,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Human-readable or JSON log lines.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Placeholder admin key; validation rejects it when admin routes are enabled.
pub const PLACEHOLDER_ADMIN_KEY: &str = "CHANGE_ME_IN_PRODUCTION";

/// Admin routes configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Mount the admin routes.
    pub enabled: bool,

    /// API key for authentication (Bearer token).
    pub api_key: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_key: PLACEHOLDER_ADMIN_KEY.to_string(),
        }
    }
}
