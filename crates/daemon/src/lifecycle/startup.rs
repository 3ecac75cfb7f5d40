// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon startup and initialization logic.

use std::io::Write;
use std::sync::Arc;

use fs2::FileExt;
use parking_lot::Mutex;
use tokio::net::{TcpListener, UnixListener};
use tracing::info;

use crate::dispatch::Dispatcher;
use crate::farm::WorkerRegistry;

use super::{load_catalog, Config, DaemonState, LifecycleError};

/// Result of daemon startup — the state plus the listeners to spawn as
/// tasks.
pub struct StartupResult {
    /// The daemon state for the signal loop
    pub daemon: DaemonState,
    /// The admin Unix socket listener
    pub admin_listener: UnixListener,
    /// The stream worker listener
    pub worker_listener: TcpListener,
    /// The WebSocket worker listener, when configured
    pub ws_listener: Option<TcpListener>,
}

impl std::fmt::Debug for StartupResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StartupResult")
            .field("admin_listener", &self.admin_listener)
            .field("worker_listener", &self.worker_listener)
            .field("ws_listener", &self.ws_listener)
            .finish_non_exhaustive()
    }
}

/// Start the daemon
pub async fn startup(config: &Config) -> Result<StartupResult, LifecycleError> {
    match startup_inner(config).await {
        Ok(result) => Ok(result),
        Err(e) => {
            // Don't clean up if we failed to acquire the lock —
            // those files belong to the already-running daemon.
            if !matches!(e, LifecycleError::LockFailed(_)) {
                cleanup_on_failure(config);
            }
            Err(e)
        }
    }
}

/// Inner startup logic - cleanup_on_failure called if this fails
async fn startup_inner(config: &Config) -> Result<StartupResult, LifecycleError> {
    // 1. Create state directory (needed for socket, lock, catalog)
    std::fs::create_dir_all(&config.state_dir)?;

    // 2. Acquire lock file FIRST - prevents races
    // Use OpenOptions to avoid truncating the file before we hold the lock,
    // which would wipe the running daemon's PID.
    let lock_file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(&config.lock_path)?;
    lock_file.try_lock_exclusive().map_err(LifecycleError::LockFailed)?;

    // Write PID to lock file (truncate now that we hold the lock)
    let mut lock_file = lock_file;
    lock_file.set_len(0)?;
    writeln!(lock_file, "{}", std::process::id())?;
    let lock_file = lock_file; // Drop mutability

    // 3. Load the persisted catalog (missing file = empty catalog)
    let catalog = load_catalog(&config.catalog_path)?;
    info!(projects = catalog.len(), "loaded catalog");
    let catalog = Arc::new(Mutex::new(catalog));

    // 4. Work-dispatch engine state
    let registry = Arc::new(WorkerRegistry::new());
    let dispatcher = Arc::new(Dispatcher::new(Arc::clone(&catalog), Arc::clone(&registry)));

    // 5. Remove stale socket and bind (LAST - only after all validation passes)
    if config.socket_path.exists() {
        std::fs::remove_file(&config.socket_path)?;
    }
    let admin_listener = UnixListener::bind(&config.socket_path).map_err(|e| {
        LifecycleError::BindFailed(config.socket_path.display().to_string(), e)
    })?;

    let worker_listener = TcpListener::bind(&config.worker_addr)
        .await
        .map_err(|e| LifecycleError::BindFailed(config.worker_addr.clone(), e))?;

    let ws_listener = match &config.ws_addr {
        Some(addr) => Some(
            TcpListener::bind(addr)
                .await
                .map_err(|e| LifecycleError::BindFailed(addr.clone(), e))?,
        ),
        None => None,
    };

    info!("Daemon started");

    Ok(StartupResult {
        daemon: DaemonState {
            config: config.clone(),
            lock_file,
            catalog,
            registry,
            dispatcher,
        },
        admin_listener,
        worker_listener,
        ws_listener,
    })
}

/// Clean up resources on startup failure
fn cleanup_on_failure(config: &Config) {
    // Remove socket if we created it
    if config.socket_path.exists() {
        let _ = std::fs::remove_file(&config.socket_path);
    }

    // Remove PID/lock file
    if config.lock_path.exists() {
        let _ = std::fs::remove_file(&config.lock_path);
    }
}

#[cfg(test)]
#[path = "startup_tests.rs"]
mod tests;
