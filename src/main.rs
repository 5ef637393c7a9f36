//! LLM relay (v1)
//!
//! An HTTP service that turns prompts into text through a ranked set of
//! hosted model backends.
//!
//! # Architecture Overview
//!
//! ```text
//!     POST /v1/generate
//!     ─────────────────▶ http ──▶ orchestrator ──▶ registry (ordered candidates)
//!                                     │
//!                                     ├──▶ circuit breaker (skip tripped backends)
//!                                     ├──▶ health probe (HEAD, short timeout)
//!                                     ├──▶ invoker under retry/backoff ──▶ Backend
//!                                     └──▶ diagnostics recorder
//!     ◀───────────────── text, or a generic 503
//!
//!     Cross-cutting: config (+ hot reload), logging, metrics, lifecycle
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use llm_relay::config::watcher::ConfigWatcher;
use llm_relay::config::{load_config, RelayConfig};
use llm_relay::lifecycle::{wait_for_signal, Shutdown};
use llm_relay::observability::{logging, metrics};
use llm_relay::HttpServer;

#[derive(Parser)]
#[command(name = "llm-relay", version, about = "Multi-provider LLM relay with fallback", long_about = None)]
struct Args {
    /// Path to the TOML configuration file. Defaults apply when omitted.
    #[arg(short, long, env = "LLM_RELAY_CONFIG")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => RelayConfig::default(),
    };

    logging::init_logging(&config.observability);
    tracing::info!("llm-relay v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.server.bind_address,
        registry = ?config.registry.source,
        backends = config.backends.len(),
        max_attempts = config.resilience.max_attempts,
        failure_threshold = config.resilience.failure_threshold,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    // Hot reload. The watcher handle must outlive the server.
    let (config_updates, _watcher) = match &args.config {
        Some(path) => {
            let (watcher, updates) = ConfigWatcher::new(path, config.clone());
            match watcher.run() {
                Ok(handle) => (updates, Some(handle)),
                Err(e) => {
                    tracing::warn!(error = %e, "Config watcher unavailable, hot reload disabled");
                    (updates, None)
                }
            }
        }
        None => (mpsc::unbounded_channel().1, None),
    };

    let listener = TcpListener::bind(&config.server.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config);
    let server_task = tokio::spawn(server.run(listener, config_updates, shutdown.subscribe()));

    wait_for_signal().await;
    shutdown.trigger();

    server_task.await??;
    tracing::info!("Shutdown complete");
    Ok(())
}
