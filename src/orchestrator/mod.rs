//! Fallback orchestration subsystem.
//!
//! # Data Flow
//! ```text
//! generate(prompt)
//!     → registry (ordered candidates)
//!     → for each candidate:
//!         credential check → circuit breaker → health probe
//!         → invoker under retry_with_backoff
//!         → diagnostics recorder
//!     → Ok(Generation) | Err(NoBackends | AllFailed)
//! ```
//!
//! # Design Decisions
//! - Sequential and priority-ordered; never parallel across backends
//! - Per-run state (state.rs, diagnostics) is never shared between runs
//! - The circuit breaker is the only cross-run state

pub mod error;
pub mod fallback;
pub mod state;

pub use error::{ErrorKind, OrchestrationError, USER_FACING_MESSAGE};
pub use fallback::{FallbackOrchestrator, Generation, OrchestratorSettings};
pub use state::{RunState, RunStateMachine};
