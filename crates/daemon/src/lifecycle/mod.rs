// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle management: startup, shutdown, catalog persistence.

mod startup;
pub use startup::{startup, StartupResult};

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use forge_core::ProjectCatalog;
use parking_lot::Mutex;
use thiserror::Error;
use tracing::{info, warn};

use crate::dispatch::Dispatcher;
use crate::farm::WorkerRegistry;

/// Daemon configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Root state directory (e.g. ~/.local/state/forge)
    pub state_dir: PathBuf,
    /// Path to the admin Unix socket
    pub socket_path: PathBuf,
    /// Path to lock/PID file
    pub lock_path: PathBuf,
    /// Path to daemon log file
    pub log_path: PathBuf,
    /// Path to the persisted project catalog
    pub catalog_path: PathBuf,
    /// TCP address for stream workers
    pub worker_addr: String,
    /// Optional TCP address for WebSocket workers
    pub ws_addr: Option<String>,
}

impl Config {
    /// Load configuration from the environment. One daemon serves all
    /// projects for a user.
    pub fn load() -> Result<Self, LifecycleError> {
        let state_dir = crate::env::state_dir()?;

        Ok(Self {
            socket_path: state_dir.join("forged.sock"),
            lock_path: state_dir.join("forged.pid"),
            log_path: state_dir.join("forged.log"),
            catalog_path: state_dir.join("catalog.json"),
            worker_addr: crate::env::worker_addr(),
            ws_addr: crate::env::ws_addr(),
            state_dir,
        })
    }
}

/// Daemon state during operation.
pub struct DaemonState {
    /// Configuration
    pub config: Config,
    // NOTE(lifetime): Held to maintain exclusive file lock; released on drop
    #[allow(dead_code)]
    lock_file: File,
    /// Project catalog (shared with the listener and dispatcher)
    pub catalog: Arc<Mutex<ProjectCatalog>>,
    /// Registry of live worker sessions
    pub registry: Arc<WorkerRegistry>,
    /// Clone/status entry point
    pub dispatcher: Arc<Dispatcher>,
}

impl DaemonState {
    /// Shutdown the daemon gracefully: persist the catalog, then remove
    /// the socket and PID files. Worker sessions are torn down by the
    /// cancellation token before this runs.
    pub fn shutdown(&mut self) -> Result<(), LifecycleError> {
        info!("Shutting down daemon...");

        if let Err(e) = save_catalog(&self.config.catalog_path, &self.catalog.lock()) {
            warn!("Failed to save catalog on shutdown: {}", e);
        }

        if self.config.socket_path.exists() {
            if let Err(e) = std::fs::remove_file(&self.config.socket_path) {
                warn!("Failed to remove socket file: {}", e);
            }
        }

        if self.config.lock_path.exists() {
            if let Err(e) = std::fs::remove_file(&self.config.lock_path) {
                warn!("Failed to remove PID file: {}", e);
            }
        }

        // Lock file is released automatically when self.lock_file is dropped

        info!("Daemon shutdown complete");
        Ok(())
    }
}

/// Lifecycle errors
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Could not determine state directory")]
    NoStateDir,

    #[error("Failed to acquire lock: daemon already running?")]
    LockFailed(#[source] std::io::Error),

    #[error("Failed to bind {0}: {1}")]
    BindFailed(String, std::io::Error),

    #[error("Catalog file error: {0}")]
    CatalogFile(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Load the catalog from its flat file. A missing file is an empty
/// catalog, not an error.
pub fn load_catalog(path: &Path) -> Result<ProjectCatalog, LifecycleError> {
    if !path.exists() {
        return Ok(ProjectCatalog::new());
    }
    let contents = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&contents)?)
}

/// Persist the catalog to its flat file.
pub fn save_catalog(path: &Path, catalog: &ProjectCatalog) -> Result<(), LifecycleError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let contents = serde_json::to_string_pretty(catalog)?;
    std::fs::write(path, contents)?;
    Ok(())
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
