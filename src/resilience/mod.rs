//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Invocation of one backend:
//!     → circuit_breaker.rs (skip backends that tripped recently)
//!     → retries.rs (retry with backoff.rs delays)
//!     → timeouts.rs (deadline on every try)
//!     → On final failure: circuit_breaker.rs records it
//! ```
//!
//! # Design Decisions
//! - Timeouts are non-negotiable; every external call has a deadline
//! - Retries are sequential and bounded per backend
//! - Circuit breaker state is the only state shared across runs

pub mod backoff;
pub mod circuit_breaker;
pub mod retries;
pub mod timeouts;

pub use circuit_breaker::{CircuitBreaker, CircuitSnapshot};
pub use retries::{retry_with_backoff, RetryOutcome, RetryPolicy};
pub use timeouts::{with_timeout, Elapsed};
