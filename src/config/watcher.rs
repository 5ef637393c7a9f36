//! Configuration file watcher for hot reload.
//!
//! # Responsibilities
//! - Turn file system events into reloaded, validated configs
//! - Collapse the burst of events a single save produces into one reload
//! - Warn when a reload touches settings that only apply at startup
//!
//! # Design Decisions
//! - The notify callback only signals; loading happens on a tokio task
//! - Invalid files are logged and skipped, the running config stays

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::config::loader::load_config;
use crate::config::schema::RelayConfig;

/// Quiet period after the last file event before the file is read.
pub const RELOAD_QUIET_PERIOD: Duration = Duration::from_millis(250);

/// A watcher that monitors the configuration file for changes.
pub struct ConfigWatcher {
    path: PathBuf,
    startup: RelayConfig,
    update_tx: mpsc::UnboundedSender<RelayConfig>,
}

impl ConfigWatcher {
    /// Create a new ConfigWatcher for the config the process started with.
    ///
    /// Returns the watcher and a receiver for configuration updates.
    pub fn new(path: &Path, startup: RelayConfig) -> (Self, mpsc::UnboundedReceiver<RelayConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        (
            Self {
                path: path.to_path_buf(),
                startup,
                update_tx,
            },
            update_rx,
        )
    }

    /// Start watching the file. The returned watcher must be kept alive.
    ///
    /// Must be called from within a tokio runtime.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) if event.kind.is_modify() || event.kind.is_create() => {
                    let _ = event_tx.send(());
                }
                Ok(_) => {}
                Err(e) => tracing::error!("Watch error: {:?}", e),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&self.path, RecursiveMode::NonRecursive)?;
        tracing::info!(path = ?self.path, "Config watcher started");

        tokio::spawn(debounce_reloads(
            self.path,
            event_rx,
            self.update_tx,
            self.startup,
            RELOAD_QUIET_PERIOD,
        ));

        Ok(watcher)
    }
}

/// Reload once per burst of events, after `quiet` has passed with no new one.
async fn debounce_reloads(
    path: PathBuf,
    mut events: mpsc::UnboundedReceiver<()>,
    updates: mpsc::UnboundedSender<RelayConfig>,
    startup: RelayConfig,
    quiet: Duration,
) {
    while events.recv().await.is_some() {
        while let Ok(Some(())) = tokio::time::timeout(quiet, events.recv()).await {}

        tracing::info!(path = ?path, "Config file change detected, reloading");
        match load_config(&path) {
            Ok(new_config) => {
                let ignored = restart_required_sections(&startup, &new_config);
                if !ignored.is_empty() {
                    tracing::warn!(
                        sections = ?ignored,
                        "Changes to these settings take effect only after a restart"
                    );
                }
                if updates.send(new_config).is_err() {
                    break;
                }
            }
            Err(e) => {
                tracing::error!(
                    "Failed to reload config: {}. Keeping current configuration.",
                    e
                );
            }
        }
    }
}

/// Settings that differ between `running` and `reloaded` but are only read at
/// startup. Backends and the admin key are applied live and never listed.
pub fn restart_required_sections(running: &RelayConfig, reloaded: &RelayConfig) -> Vec<&'static str> {
    let mut sections = Vec::new();
    if running.server != reloaded.server {
        sections.push("server");
    }
    if running.registry != reloaded.registry {
        sections.push("registry");
    }
    if running.resilience != reloaded.resilience {
        sections.push("resilience");
    }
    if running.health_check != reloaded.health_check {
        sections.push("health_check");
    }
    if running.generation != reloaded.generation {
        sections.push("generation");
    }
    if running.observability != reloaded.observability {
        sections.push("observability");
    }
    if running.admin.enabled != reloaded.admin.enabled {
        sections.push("admin.enabled");
    }
    sections
}
