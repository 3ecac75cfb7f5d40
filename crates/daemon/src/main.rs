// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Forge daemon (forged)
//!
//! Coordinator for a distributed compilation farm.
//!
//! Architecture:
//! - Worker Gateway: spawned task accepting worker connections, one
//!   session task per connection
//! - Admin Listener: spawned task handling CLI requests over the Unix
//!   socket
//! - Main task: signal handling and graceful shutdown

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

use std::sync::Arc;

use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use forge_daemon::env;
use forge_daemon::farm::WorkerGateway;
use forge_daemon::lifecycle::{self, Config, LifecycleError, StartupResult};
use forge_daemon::listener::{ListenCtx, Listener};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Handle info flags before any config/lock acquisition
    if let Some(arg) = std::env::args().nth(1) {
        match arg.as_str() {
            "--version" | "-V" | "-v" => {
                println!("forged {}", env::PROTOCOL_VERSION);
                return Ok(());
            }
            "--help" | "-h" | "help" => {
                println!("forged {}", env::PROTOCOL_VERSION);
                println!("Forge daemon - coordinator for a distributed compilation farm");
                println!();
                println!("USAGE:");
                println!("    forged");
                println!();
                println!("The daemon is typically started by the `forge` CLI and should not");
                println!("be invoked directly. It listens on a Unix socket for admin");
                println!("commands and on a TCP port for compile workers.");
                println!();
                println!("OPTIONS:");
                println!("    -h, --help       Print help information");
                println!("    -v, --version    Print version information");
                return Ok(());
            }
            _ => {
                eprintln!("error: unexpected argument '{arg}'");
                eprintln!("Usage: forged [--help | --version]");
                std::process::exit(1);
            }
        }
    }

    // Load configuration
    let config = Config::load()?;

    // Set up logging
    let log_guard = setup_logging(&config)?;

    info!("Starting daemon");

    // Start daemon
    let StartupResult { mut daemon, admin_listener, worker_listener, ws_listener } =
        match lifecycle::startup(&config).await {
            Ok(r) => r,
            Err(LifecycleError::LockFailed(_)) => {
                // Another daemon is already running — print a human-readable
                // message instead of a raw debug error.
                let pid = std::fs::read_to_string(&config.lock_path)
                    .unwrap_or_default()
                    .trim()
                    .to_string();

                eprintln!("forged is already running");
                if !pid.is_empty() {
                    eprintln!("  pid: {pid}");
                }
                std::process::exit(1);
            }
            Err(e) => {
                error!("Failed to start daemon: {}", e);
                drop(log_guard);
                return Err(e.into());
            }
        };

    // Shutdown plumbing: the Notify wakes this task on an admin Shutdown
    // request; the token tears down worker sessions and accept loops.
    let shutdown_notify = Arc::new(Notify::new());
    let shutdown_token = CancellationToken::new();

    // Spawn the admin listener task
    let listener = Listener::new(
        admin_listener,
        Arc::new(ListenCtx {
            catalog: Arc::clone(&daemon.catalog),
            dispatcher: Arc::clone(&daemon.dispatcher),
            shutdown: Arc::clone(&shutdown_notify),
        }),
    );
    tokio::spawn(listener.run());

    // Spawn the worker gateway task
    let mut gateway = WorkerGateway::new(
        worker_listener,
        Arc::clone(&daemon.registry),
        shutdown_token.clone(),
        env::message_timeout(),
    );
    if let Some(ws) = ws_listener {
        gateway = gateway.with_ws(ws);
    }
    tokio::spawn(gateway.run());

    // Set up signal handlers
    let mut sigterm = signal(SignalKind::terminate())?;
    let mut sigint = signal(SignalKind::interrupt())?;

    info!(
        socket = %config.socket_path.display(),
        workers = %config.worker_addr,
        "Daemon ready"
    );

    // Signal ready for parent process (e.g., systemd, CLI waiting for startup)
    println!("READY");

    tokio::select! {
        _ = shutdown_notify.notified() => {
            info!("Shutdown requested via command");
        }
        _ = sigterm.recv() => {
            info!("Received SIGTERM, shutting down...");
        }
        _ = sigint.recv() => {
            info!("Received SIGINT, shutting down...");
        }
    }

    // Unblock idle sessions and stop the accept loops, then persist
    // state and clean up runtime files.
    shutdown_token.cancel();
    daemon.shutdown()?;
    info!("Daemon stopped");
    Ok(())
}

fn setup_logging(
    config: &Config,
) -> Result<tracing_appender::non_blocking::WorkerGuard, LifecycleError> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    // Create log directory if needed
    if let Some(parent) = config.log_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Set up file appender
    let file_appender = tracing_appender::rolling::never(
        config.log_path.parent().ok_or(LifecycleError::NoStateDir)?,
        config
            .log_path
            .file_name()
            .ok_or(LifecycleError::NoStateDir)?,
    );
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // Set up subscriber with env filter
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(non_blocking))
        .init();

    Ok(guard)
}
