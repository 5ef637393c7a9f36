//! Registry backed by the configuration file.

use std::sync::Arc;

use arc_swap::ArcSwap;
use async_trait::async_trait;

use crate::config::BackendConfig;
use crate::registry::backend::{order_enabled, ModelBackend};
use crate::registry::BackendRegistry;

/// Backends defined in `[[backends]]`, swappable on config reload.
#[derive(Debug)]
pub struct StaticRegistry {
    backends: ArcSwap<Vec<ModelBackend>>,
}

impl StaticRegistry {
    pub fn new(backends: Vec<ModelBackend>) -> Self {
        Self {
            backends: ArcSwap::from_pointee(backends),
        }
    }

    /// Build from config, resolving credentials from the environment where asked.
    pub fn from_config(configs: &[BackendConfig]) -> Self {
        Self::new(configs.iter().map(backend_from_config).collect())
    }

    /// Replace the whole backend set. Runs already in flight keep their snapshot.
    pub fn replace(&self, backends: Vec<ModelBackend>) {
        tracing::info!(count = backends.len(), "Model registry replaced");
        self.backends.store(Arc::new(backends));
    }

    /// Replace the backend set from reloaded config tables.
    pub fn reload(&self, configs: &[BackendConfig]) {
        self.replace(configs.iter().map(backend_from_config).collect());
    }

    /// Every configured backend, enabled or not, in insertion order.
    pub fn all_backends(&self) -> Vec<ModelBackend> {
        self.backends.load().as_ref().clone()
    }
}

fn backend_from_config(config: &BackendConfig) -> ModelBackend {
    let mut backend = ModelBackend::new(
        config.name.clone(),
        config.endpoint_url.clone(),
        config.resolve_credential(),
        config.priority,
    );
    backend.enabled = config.enabled;
    backend
}

#[async_trait]
impl BackendRegistry for StaticRegistry {
    async fn list_enabled_backends(&self) -> Vec<ModelBackend> {
        order_enabled(self.backends.load().iter().cloned())
    }
}
