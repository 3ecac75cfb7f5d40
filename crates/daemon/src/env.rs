// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon crate.

use std::path::PathBuf;
use std::time::Duration;

use crate::lifecycle::LifecycleError;

/// Protocol version (from Cargo.toml)
pub const PROTOCOL_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Resolve state directory: FORGE_STATE_DIR > XDG_STATE_HOME/forge > ~/.local/state/forge
pub fn state_dir() -> Result<PathBuf, LifecycleError> {
    if let Ok(dir) = std::env::var("FORGE_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("forge"));
    }
    let home = std::env::var("HOME").map_err(|_| LifecycleError::NoStateDir)?;
    Ok(PathBuf::from(home).join(".local/state/forge"))
}

/// Default IPC timeout for the admin socket
pub fn ipc_timeout() -> Duration {
    std::env::var("FORGE_IPC_TIMEOUT_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_secs(5))
}

/// Per-message deadline on worker connections. Compiles are slow, so the
/// default is generous (5 minutes); 0 disables the deadline entirely.
pub fn message_timeout() -> Option<Duration> {
    let ms = std::env::var("FORGE_MSG_TIMEOUT_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(300_000);
    (ms > 0).then_some(Duration::from_millis(ms))
}

/// TCP address workers connect to with length-prefixed framing.
pub fn worker_addr() -> String {
    std::env::var("FORGE_WORKER_ADDR").unwrap_or_else(|_| "127.0.0.1:7420".to_string())
}

/// Optional TCP address for WebSocket workers. When unset, the daemon
/// accepts stream workers only.
pub fn ws_addr() -> Option<String> {
    std::env::var("FORGE_WS_ADDR").ok().filter(|s| !s.is_empty())
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
