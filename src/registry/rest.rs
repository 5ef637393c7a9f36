//! Registry read from the hosted store's REST interface.
//!
//! # Responsibilities
//! - Select enabled backend rows ordered by priority
//! - Tolerate the column spellings the admin screens have used
//! - Degrade to an empty list on any read failure

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::RegistryConfig;
use crate::registry::backend::{normalize_credential, order_enabled, ModelBackend};
use crate::registry::BackendRegistry;

/// One row of the backend table.
#[derive(Debug, Deserialize)]
struct BackendRow {
    #[serde(default)]
    id: Option<serde_json::Value>,
    name: String,
    #[serde(alias = "api_key", default)]
    credential: Option<String>,
    #[serde(alias = "endpoint_url", alias = "endpointUrl")]
    endpoint: String,
    #[serde(default)]
    priority: Option<i64>,
    #[serde(alias = "is_active", default = "default_enabled")]
    enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl From<BackendRow> for ModelBackend {
    fn from(row: BackendRow) -> Self {
        let id = match row.id {
            Some(serde_json::Value::String(s)) => s,
            Some(other) => other.to_string(),
            None => row.name.clone(),
        };
        Self {
            id,
            name: row.name,
            endpoint_url: row.endpoint,
            credential: normalize_credential(row.credential.unwrap_or_default()),
            priority: row.priority.unwrap_or(i64::MAX),
            enabled: row.enabled,
        }
    }
}

/// Decode a REST response body into ordered, enabled backends.
///
/// Rows that fail to decode are dropped individually.
pub fn parse_rows(body: &str) -> Vec<ModelBackend> {
    let rows: Vec<serde_json::Value> = match serde_json::from_str(body) {
        Ok(rows) => rows,
        Err(e) => {
            tracing::warn!(error = %e, "Registry response is not a JSON array");
            return Vec::new();
        }
    };

    let backends = rows.into_iter().filter_map(|row| {
        match serde_json::from_value::<BackendRow>(row) {
            Ok(row) => Some(ModelBackend::from(row)),
            Err(e) => {
                tracing::warn!(error = %e, "Skipping malformed registry row");
                None
            }
        }
    });
    order_enabled(backends)
}

/// Reads backends from `{url}/rest/v1/{table}` on every call.
#[derive(Debug, Clone)]
pub struct RestRegistry {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    timeout: Duration,
}

impl RestRegistry {
    pub fn new(config: &RegistryConfig) -> Self {
        let api_key = if config.api_key.is_empty() {
            config
                .api_key_env
                .as_deref()
                .and_then(|var| std::env::var(var).ok())
                .unwrap_or_default()
        } else {
            config.api_key.clone()
        };

        Self {
            client: reqwest::Client::new(),
            endpoint: format!(
                "{}/rest/v1/{}",
                config.url.trim_end_matches('/'),
                config.table
            ),
            api_key,
            timeout: Duration::from_secs(config.timeout_secs),
        }
    }

    async fn fetch(&self) -> Result<String, reqwest::Error> {
        self.client
            .get(&self.endpoint)
            .query(&[
                ("select", "*"),
                ("enabled", "eq.true"),
                ("order", "priority.asc"),
            ])
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .timeout(self.timeout)
            .send()
            .await?
            .error_for_status()?
            .text()
            .await
    }
}

#[async_trait]
impl BackendRegistry for RestRegistry {
    async fn list_enabled_backends(&self) -> Vec<ModelBackend> {
        match self.fetch().await {
            Ok(body) => {
                let backends = parse_rows(&body);
                tracing::debug!(count = backends.len(), "Loaded backends from registry");
                backends
            }
            Err(e) => {
                tracing::error!(endpoint = %self.endpoint, error = %e, "Registry read failed");
                Vec::new()
            }
        }
    }
}
