//! Exponential backoff.

use std::time::Duration;

/// Delay to wait after failed try number `attempt` (1-based).
///
/// `base_ms * 2^(attempt - 1)`, capped at `max_ms`. No jitter: one caller
/// retries one backend, so there is no herd to spread out.
pub fn calculate_backoff(attempt: u32, base_ms: u64, max_ms: u64) -> Duration {
    if attempt == 0 {
        return Duration::from_millis(0);
    }

    let exponential_base = 2u64.saturating_pow(attempt - 1);
    let delay_ms = base_ms.saturating_mul(exponential_base);

    Duration::from_millis(delay_ms.min(max_ms))
}
