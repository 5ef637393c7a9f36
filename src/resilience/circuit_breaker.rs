//! Circuit breaker for backend protection.
//!
//! # States
//! - Closed: no entry, or fewer than `threshold` consecutive failures
//! - Open: `threshold` or more failures, the last one within `window`
//!
//! # State Transitions
//! ```text
//! Closed → Open: failure_count >= threshold within window
//! Open → Closed: window elapses since the last failure (lazy, on read)
//! Any → Closed: a single success removes the entry
//! ```
//!
//! # Design Decisions
//! - Per-backend state keyed by backend name, shared by all runs
//! - Expiry is evaluated on read; no background sweep
//! - Read-modify-write on a concurrent map; a race can only leave a
//!   slightly stale count

use std::time::Duration;

use dashmap::DashMap;
use serde::Serialize;
use tokio::time::Instant;

use crate::config::ResilienceConfig;

/// Failure tracking for one backend.
#[derive(Debug, Clone, Copy)]
pub struct CircuitState {
    pub consecutive_failures: u32,
    pub last_failure_at: Instant,
}

impl CircuitState {
    fn is_expired(&self, now: Instant, window: Duration) -> bool {
        now.saturating_duration_since(self.last_failure_at) > window
    }
}

/// Point-in-time view of one backend's circuit, for operator surfaces.
#[derive(Debug, Clone, Serialize)]
pub struct CircuitSnapshot {
    pub backend: String,
    pub consecutive_failures: u32,
    pub seconds_since_last_failure: u64,
    pub disabled: bool,
}

/// Process-wide consecutive-failure tracker.
#[derive(Debug)]
pub struct CircuitBreaker {
    states: DashMap<String, CircuitState>,
    threshold: u32,
    window: Duration,
}

impl CircuitBreaker {
    pub fn new(threshold: u32, window: Duration) -> Self {
        Self {
            states: DashMap::new(),
            threshold,
            window,
        }
    }

    pub fn from_config(config: &ResilienceConfig) -> Self {
        Self::new(
            config.failure_threshold,
            Duration::from_secs(config.failure_window_secs),
        )
    }

    /// True while the backend has tripped and the window has not elapsed.
    pub fn is_disabled(&self, backend: &str) -> bool {
        let now = Instant::now();
        self.states
            .get(backend)
            .map(|state| {
                !state.is_expired(now, self.window) && state.consecutive_failures >= self.threshold
            })
            .unwrap_or(false)
    }

    /// Count a failure. Returns the new consecutive-failure count.
    pub fn record_failure(&self, backend: &str) -> u32 {
        let now = Instant::now();
        let window = self.window;
        let mut entry = self
            .states
            .entry(backend.to_string())
            .or_insert(CircuitState {
                consecutive_failures: 0,
                last_failure_at: now,
            });

        let state = entry.value_mut();
        if state.is_expired(now, window) {
            state.consecutive_failures = 0;
        }
        state.consecutive_failures += 1;
        state.last_failure_at = now;

        let count = state.consecutive_failures;
        if count == self.threshold {
            tracing::warn!(
                backend = %backend,
                failures = count,
                window_secs = window.as_secs(),
                "Circuit opened, backend temporarily disabled"
            );
        }
        count
    }

    /// Clear all failure history for the backend.
    pub fn record_success(&self, backend: &str) {
        if self.states.remove(backend).is_some() {
            tracing::debug!(backend = %backend, "Circuit reset after success");
        }
    }

    /// Current consecutive failures; zero when absent or expired.
    pub fn failure_count(&self, backend: &str) -> u32 {
        let now = Instant::now();
        self.states
            .get(backend)
            .filter(|state| !state.is_expired(now, self.window))
            .map(|state| state.consecutive_failures)
            .unwrap_or(0)
    }

    /// Live (unexpired) entries, sorted by backend name.
    pub fn snapshot(&self) -> Vec<CircuitSnapshot> {
        let now = Instant::now();
        let mut snapshots: Vec<CircuitSnapshot> = self
            .states
            .iter()
            .filter(|entry| !entry.value().is_expired(now, self.window))
            .map(|entry| {
                let state = entry.value();
                CircuitSnapshot {
                    backend: entry.key().clone(),
                    consecutive_failures: state.consecutive_failures,
                    seconds_since_last_failure: now
                        .saturating_duration_since(state.last_failure_at)
                        .as_secs(),
                    disabled: state.consecutive_failures >= self.threshold,
                }
            })
            .collect();
        snapshots.sort_by(|a, b| a.backend.cmp(&b.backend));
        snapshots
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    pub fn window(&self) -> Duration {
        self.window
    }
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::from_config(&ResilienceConfig::default())
    }
}
