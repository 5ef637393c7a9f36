//! Multi-provider LLM relay library.
//!
//! Turns a prompt into text by walking a priority-ordered list of model
//! backends with health probing, retry with backoff, a per-backend circuit
//! breaker and per-run diagnostics.

pub mod admin;
pub mod config;
pub mod diagnostics;
pub mod health;
pub mod http;
pub mod invoker;
pub mod lifecycle;
pub mod observability;
pub mod orchestrator;
pub mod registry;
pub mod resilience;

pub use config::schema::RelayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use orchestrator::{FallbackOrchestrator, Generation, OrchestrationError};
