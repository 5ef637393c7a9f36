//! Model registry subsystem.
//!
//! # Data Flow
//! ```text
//! Orchestration run starts
//!     → BackendRegistry::list_enabled_backends()
//!         - static_registry.rs (config tables, swapped on reload)
//!         - rest.rs (hosted store, read on every run)
//!     → backend.rs (filter enabled, stable sort by priority)
//!     → Ordered candidates (possibly empty)
//! ```
//!
//! # Design Decisions
//! - Read-only to the orchestrator; re-read on every run, never cached
//! - An empty list is a normal return value, never an error
//! - Equal priorities keep insertion order

pub mod backend;
pub mod rest;
pub mod static_registry;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{RegistrySource, RelayConfig};

pub use backend::ModelBackend;
pub use rest::RestRegistry;
pub use static_registry::StaticRegistry;

/// Source of candidate backends for an orchestration run.
#[async_trait]
pub trait BackendRegistry: Send + Sync {
    /// Enabled backends sorted ascending by priority.
    async fn list_enabled_backends(&self) -> Vec<ModelBackend>;
}

/// Registry selected by configuration.
///
/// The static registry is returned separately so config reloads can swap it.
pub fn build_registry(config: &RelayConfig) -> (Arc<dyn BackendRegistry>, Option<Arc<StaticRegistry>>) {
    match config.registry.source {
        RegistrySource::Static => {
            let registry = Arc::new(StaticRegistry::from_config(&config.backends));
            (registry.clone(), Some(registry))
        }
        RegistrySource::Rest => (Arc::new(RestRegistry::new(&config.registry)), None),
    }
}
