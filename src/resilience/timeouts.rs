//! Timeout enforcement.
//!
//! Every outbound call (health probe, invocation) runs under its own
//! deadline. Expiry drops the in-flight future, which cancels the request.

use std::future::Future;
use std::time::Duration;

use thiserror::Error;

/// The deadline elapsed before the operation finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("timed out after {0:?}")]
pub struct Elapsed(pub Duration);

/// Run `future` with a deadline.
pub async fn with_timeout<F: Future>(limit: Duration, future: F) -> Result<F::Output, Elapsed> {
    tokio::time::timeout(limit, future)
        .await
        .map_err(|_| Elapsed(limit))
}
