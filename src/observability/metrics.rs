//! Metrics collection and exposition.
//!
//! # Metrics
//! - `relay_attempts_total` (counter): attempts by backend and outcome
//! - `relay_attempt_duration_seconds` (histogram): per-backend attempt latency
//! - `relay_generations_total` (counter): runs by result
//! - `relay_circuit_open` (gauge): 1 while a backend is disabled
//! - `relay_backend_health` (gauge): last probe result, 1=healthy, 0=unhealthy
//!
//! Without an installed recorder every call is a no-op.

use std::net::SocketAddr;
use std::time::Duration;

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record one backend attempt.
pub fn record_attempt(backend: &str, outcome: &str, duration: Duration) {
    counter!(
        "relay_attempts_total",
        "backend" => backend.to_string(),
        "outcome" => outcome.to_string()
    )
    .increment(1);
    histogram!("relay_attempt_duration_seconds", "backend" => backend.to_string())
        .record(duration.as_secs_f64());
}

/// Record the end of an orchestration run.
pub fn record_generation(result: &str) {
    counter!("relay_generations_total", "result" => result.to_string()).increment(1);
}

/// Record whether a backend's circuit is open.
pub fn record_circuit_state(backend: &str, open: bool) {
    gauge!("relay_circuit_open", "backend" => backend.to_string()).set(if open { 1.0 } else { 0.0 });
}

/// Record the latest health probe result.
pub fn record_backend_health(backend: &str, healthy: bool) {
    gauge!("relay_backend_health", "backend" => backend.to_string()).set(if healthy { 1.0 } else { 0.0 });
}
