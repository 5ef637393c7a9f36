//! Diagnostics subsystem.
//!
//! # Data Flow
//! ```text
//! Orchestrator, per candidate:
//!     → attempt.rs (PendingAttempt::start → finish, credential scrubbed)
//!     → recorder.rs (ordered accumulation for the run)
//!     → Diagnostics (trace string, failed-attempts list, JSON)
//! ```
//!
//! # Design Decisions
//! - Attempts are immutable once recorded and live only for one run
//! - Credentials appear masked (masking.rs) in every rendering
//! - Operator-facing only; end users get a generic message instead

pub mod attempt;
pub mod masking;
pub mod recorder;

pub use attempt::{AttemptOutcome, InvocationAttempt, PendingAttempt};
pub use masking::{mask_credential, redact};
pub use recorder::{Diagnostics, DiagnosticsRecorder, FailedAttemptView};
