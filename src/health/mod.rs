//! Health checking subsystem.
//!
//! # Data Flow
//! ```text
//! Orchestrator picks a candidate
//!     → probe.rs (HEAD with short timeout)
//!     → true: invoke the backend
//!     → false: skip to the next candidate
//! ```
//!
//! # Design Decisions
//! - Advisory only: a healthy probe does not promise a successful invocation
//! - Probes never error; every failure mode collapses to `false`
//! - Probing is per-run and on demand, not a periodic background task

pub mod probe;

pub use probe::{HealthProber, HttpHealthProber};
