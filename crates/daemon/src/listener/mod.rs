// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Listener task for the admin socket.
//!
//! Runs in a spawned task, accepting Unix socket connections and
//! handling one request per connection without blocking the worker
//! gateway or any session.

mod builds;
mod projects;

use std::sync::Arc;

use forge_core::ProjectCatalog;
use parking_lot::Mutex;
use thiserror::Error;
use tokio::net::UnixListener;
use tokio::sync::Notify;
use tracing::{debug, error, info, warn};

use crate::dispatch::Dispatcher;
use crate::env::ipc_timeout;
use crate::protocol::{self, Request, Response};

/// Shared daemon context for all request handlers.
pub struct ListenCtx {
    pub catalog: Arc<Mutex<ProjectCatalog>>,
    pub dispatcher: Arc<Dispatcher>,
    pub shutdown: Arc<Notify>,
}

/// Listener task for accepting admin connections.
pub struct Listener {
    unix: UnixListener,
    ctx: Arc<ListenCtx>,
}

/// Errors from connection handling.
#[derive(Debug, Error)]
pub(crate) enum ConnectionError {
    #[error("Protocol error: {0}")]
    Protocol(#[from] forge_wire::ProtocolError),
}

impl Listener {
    pub fn new(unix: UnixListener, ctx: Arc<ListenCtx>) -> Self {
        Self { unix, ctx }
    }

    /// Run the accept loop, spawning a task for each connection.
    pub async fn run(self) {
        loop {
            match self.unix.accept().await {
                Ok((stream, _)) => {
                    let ctx = Arc::clone(&self.ctx);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, &ctx).await {
                            log_connection_error(e);
                        }
                    });
                }
                Err(e) => error!("admin accept error: {}", e),
            }
        }
    }
}

fn log_connection_error(e: ConnectionError) {
    match e {
        ConnectionError::Protocol(forge_wire::ProtocolError::ConnectionClosed) => {
            debug!("admin client disconnected")
        }
        ConnectionError::Protocol(forge_wire::ProtocolError::Timeout) => {
            warn!("admin connection timeout")
        }
        _ => error!("admin connection error: {}", e),
    }
}

/// Handle a single admin connection: one request, one response.
async fn handle_connection(
    stream: tokio::net::UnixStream,
    ctx: &ListenCtx,
) -> Result<(), ConnectionError> {
    let (mut reader, mut writer) = stream.into_split();

    let request = protocol::read_request(&mut reader, ipc_timeout()).await?;
    info!(request = ?request, "received request");

    let response = handle_request(request, ctx);
    debug!("sending response: {:?}", response);

    protocol::write_response(&mut writer, &response, ipc_timeout()).await?;
    Ok(())
}

/// Handle a single request and return a response.
fn handle_request(request: Request, ctx: &ListenCtx) -> Response {
    match request {
        Request::Ping => Response::Pong,

        Request::ProjectAdd { url, rev, options, files } => {
            projects::handle_project_add(ctx, url, rev, options, files)
        }

        Request::ProjectRemove { url } => projects::handle_project_remove(ctx, &url),

        Request::ProjectList => projects::handle_project_list(ctx),

        Request::Clone { url } => builds::handle_clone(ctx, &url),

        Request::Status { url } => builds::handle_status(ctx, &url),

        Request::Shutdown => {
            ctx.shutdown.notify_one();
            Response::ShuttingDown
        }
    }
}

#[cfg(test)]
pub(super) fn test_ctx() -> ListenCtx {
    test_ctx_with_registry().0
}

#[cfg(test)]
pub(super) fn test_ctx_with_registry() -> (ListenCtx, Arc<crate::farm::WorkerRegistry>) {
    let catalog = Arc::new(Mutex::new(ProjectCatalog::new()));
    let registry = Arc::new(crate::farm::WorkerRegistry::new());
    let ctx = ListenCtx {
        catalog: Arc::clone(&catalog),
        dispatcher: Arc::new(Dispatcher::new(catalog, Arc::clone(&registry))),
        shutdown: Arc::new(Notify::new()),
    };
    (ctx, registry)
}

#[cfg(test)]
#[path = "../listener_tests.rs"]
mod tests;
