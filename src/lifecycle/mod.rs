//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → wait_for_signal() resolves
//!
//! Shutdown (shutdown.rs):
//!     trigger() → server stops accepting → drains in-flight runs → exit
//! ```
//!
//! # Design Decisions
//! - Config reload comes from the file watcher, not SIGHUP
//! - In-flight generations finish; no new ones start after the trigger

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
pub use signals::wait_for_signal;
