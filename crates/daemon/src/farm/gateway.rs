// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Gateway task accepting worker connections.
//!
//! Workers connect over plain TCP with length-prefixed framing, or —
//! when a WebSocket address is configured — over WebSocket with one
//! frame per message. Each accepted connection gets its own session
//! task so a slow worker never blocks the accept loop.

use std::sync::Arc;
use std::time::Duration;

use forge_wire::{StreamChannel, WsChannel};
use tokio::net::{TcpListener, TcpStream};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use super::registry::WorkerRegistry;
use super::session::{self, SessionError};
use forge_wire::ProtocolError;

/// Accept loop for worker connections.
pub struct WorkerGateway {
    tcp: TcpListener,
    ws: Option<TcpListener>,
    registry: Arc<WorkerRegistry>,
    shutdown: CancellationToken,
    msg_timeout: Option<Duration>,
}

impl WorkerGateway {
    /// Create a gateway with the stream listener only.
    pub fn new(
        tcp: TcpListener,
        registry: Arc<WorkerRegistry>,
        shutdown: CancellationToken,
        msg_timeout: Option<Duration>,
    ) -> Self {
        Self { tcp, ws: None, registry, shutdown, msg_timeout }
    }

    /// Add a WebSocket listener.
    pub fn with_ws(mut self, ws: TcpListener) -> Self {
        self.ws = Some(ws);
        self
    }

    /// Run the accept loop until shutdown, spawning a session task per
    /// connection.
    pub async fn run(mut self) {
        match self.ws.take() {
            Some(ws) => self.run_dual(ws).await,
            None => self.run_stream_only().await,
        }
    }

    async fn run_stream_only(self) {
        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => break,
                result = self.tcp.accept() => match result {
                    Ok((stream, addr)) => {
                        debug!(%addr, "worker connection");
                        self.spawn_stream_session(stream);
                    }
                    Err(e) => error!("worker accept error: {}", e),
                },
            }
        }
    }

    async fn run_dual(self, ws: TcpListener) {
        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => break,
                result = self.tcp.accept() => match result {
                    Ok((stream, addr)) => {
                        debug!(%addr, "worker connection");
                        self.spawn_stream_session(stream);
                    }
                    Err(e) => error!("worker accept error: {}", e),
                },
                result = ws.accept() => match result {
                    Ok((stream, addr)) => {
                        debug!(%addr, "worker websocket connection");
                        self.spawn_ws_session(stream);
                    }
                    Err(e) => error!("websocket accept error: {}", e),
                },
            }
        }
    }

    fn spawn_stream_session(&self, stream: TcpStream) {
        let registry = Arc::clone(&self.registry);
        let shutdown = self.shutdown.clone();
        let msg_timeout = self.msg_timeout;
        tokio::spawn(async move {
            let channel = StreamChannel::new(stream);
            if let Err(e) = session::run_session(channel, registry, shutdown, msg_timeout).await {
                log_session_error(e);
            }
        });
    }

    fn spawn_ws_session(&self, stream: TcpStream) {
        let registry = Arc::clone(&self.registry);
        let shutdown = self.shutdown.clone();
        let msg_timeout = self.msg_timeout;
        tokio::spawn(async move {
            let ws = match tokio_tungstenite::accept_async(stream).await {
                Ok(ws) => ws,
                Err(e) => {
                    warn!("websocket handshake failed: {}", e);
                    return;
                }
            };
            let channel = WsChannel::new(ws);
            if let Err(e) = session::run_session(channel, registry, shutdown, msg_timeout).await {
                log_session_error(e);
            }
        });
    }
}

fn log_session_error(e: SessionError) {
    match e {
        SessionError::Protocol(ProtocolError::ConnectionClosed) => {
            debug!("worker disconnected")
        }
        SessionError::Protocol(ProtocolError::Timeout) => {
            warn!("worker timed out")
        }
        _ => error!("session error: {}", e),
    }
}

#[cfg(test)]
#[path = "gateway_tests.rs"]
mod tests;
