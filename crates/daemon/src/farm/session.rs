// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-connection worker session state machine.
//!
//! Connecting → Idle → Bootstrapping → Compiling → Idle (loop) →
//! Terminated. The session owns a private inbox of assigned projects;
//! everything else it touches is behind the BuildProject lock.

use std::sync::Arc;
use std::time::Duration;

use forge_core::{BuildProject, WorkerId};
use forge_wire::{decode, encode, CoordinatorMessage, MessageChannel, ProtocolError, WorkerMessage};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::registry::WorkerRegistry;

/// Errors that terminate a worker session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("unexpected message: expected {expected}, got {got}")]
    UnexpectedMessage {
        expected: &'static str,
        got: &'static str,
    },

    #[error("unsolicited message while idle")]
    Unsolicited,
}

/// Drive one worker connection from registration to termination.
///
/// Returns when the peer disconnects, a protocol error occurs, or the
/// coordinator shuts down. Registration is scoped: the registry slot is
/// released on every exit path, including cancellation.
pub async fn run_session<C: MessageChannel>(
    mut channel: C,
    registry: Arc<WorkerRegistry>,
    shutdown: CancellationToken,
    msg_timeout: Option<Duration>,
) -> Result<(), SessionError> {
    // Connecting: the first message must be a RegisterRequest. Failure
    // to decode terminates the session without registering.
    let version = match recv_msg(&mut channel, msg_timeout).await? {
        WorkerMessage::RegisterRequest { version } => version,
        other => {
            return Err(SessionError::UnexpectedMessage {
                expected: "RegisterRequest",
                got: other.kind(),
            })
        }
    };

    // Accept all versions; the field is reserved for negotiation.
    send_msg(&mut channel, &CoordinatorMessage::RegisterResponse { code: 0 }).await?;

    let (inbox_tx, mut inbox) = mpsc::unbounded_channel();
    let registration = WorkerRegistry::register(&registry, WorkerId::new(), inbox_tx);
    let id = registration.id().clone();
    info!(worker = %id, version, "worker registered");

    loop {
        // Idle: wait for an assigned project. Connection teardown and
        // coordinator shutdown both unblock this wait.
        debug!(worker = %id, "waiting for project");
        let project = tokio::select! {
            _ = shutdown.cancelled() => {
                info!(worker = %id, "coordinator shutting down, closing session");
                return Ok(());
            }
            assigned = inbox.recv() => match assigned {
                Some(project) => project,
                None => return Ok(()),
            },
            incoming = channel.recv() => {
                return match incoming {
                    // The protocol is request/response; a worker has
                    // nothing to say while idle.
                    Ok(_) => Err(SessionError::Unsolicited),
                    Err(ProtocolError::ConnectionClosed) => {
                        info!(worker = %id, "worker disconnected");
                        Ok(())
                    }
                    Err(e) => Err(e.into()),
                };
            }
        };

        debug!(worker = %id, build = %project.id(), "assigned project");
        run_build(&mut channel, &id, &project, msg_timeout).await?;
    }
}

/// Bootstrapping and the compile loop for one assigned project.
///
/// Returns `Ok(())` when the session should go back to Idle — either
/// the queue drained from this session's view, or bootstrap failed and
/// the project is abandoned on this worker. Errors are fatal to the
/// session; the shared queue is left as-is for other workers.
async fn run_build<C: MessageChannel>(
    channel: &mut C,
    id: &WorkerId,
    project: &BuildProject,
    msg_timeout: Option<Duration>,
) -> Result<(), SessionError> {
    let bootstrap = project.bootstrap();
    send_msg(
        channel,
        &CoordinatorMessage::BootstrapRequest {
            url: bootstrap.url.clone(),
            rev: bootstrap.rev.clone(),
            opt: bootstrap.options.clone(),
        },
    )
    .await?;

    let code = match recv_msg(channel, msg_timeout).await? {
        WorkerMessage::BootstrapResponse { code } => code,
        other => {
            return Err(SessionError::UnexpectedMessage {
                expected: "BootstrapResponse",
                got: other.kind(),
            })
        }
    };

    if code != 0 {
        // Recoverable at the session level: abandon this project and go
        // back to waiting. The pending queue is untouched, so other
        // workers sharing it may still make progress.
        warn!(worker = %id, build = %project.id(), code, "bootstrap failed, abandoning project");
        return Ok(());
    }

    loop {
        let Some(file) = project.pop_pending() else {
            // Nothing left from this session's view of the queue. Other
            // workers sharing the project may still be compiling.
            info!(worker = %id, build = %project.id(), "no more files to compile");
            send_msg(channel, &CoordinatorMessage::CompileRequest { file: String::new() })
                .await?;
            return Ok(());
        };

        let file = normalize_object_name(file);
        debug!(worker = %id, build = %project.id(), %file, "sending compile request");
        send_msg(channel, &CoordinatorMessage::CompileRequest { file: file.clone() }).await?;

        let (resp_file, error, data) = match recv_msg(channel, msg_timeout).await? {
            WorkerMessage::CompileResponse { file, error, data } => (file, error, data),
            other => {
                return Err(SessionError::UnexpectedMessage {
                    expected: "CompileResponse",
                    got: other.kind(),
                })
            }
        };

        if data.is_empty() {
            // Compile failed: requeue for retry, unbounded attempts.
            warn!(worker = %id, file = %resp_file, %error, "compile failed, requeueing");
            project.push_pending(file);
        } else {
            debug!(worker = %id, file = %resp_file, bytes = data.len(), "recording artifact");
            project.record_artifact(resp_file, data);
        }
    }
}

/// Presentation-layer convenience: requests name the object file.
fn normalize_object_name(file: String) -> String {
    if file.ends_with(".o") {
        file
    } else {
        format!("{file}.o")
    }
}

async fn recv_msg<C: MessageChannel>(
    channel: &mut C,
    msg_timeout: Option<Duration>,
) -> Result<WorkerMessage, SessionError> {
    let payload = match msg_timeout {
        Some(deadline) => tokio::time::timeout(deadline, channel.recv())
            .await
            .map_err(|_| ProtocolError::Timeout)??,
        None => channel.recv().await?,
    };
    Ok(decode(&payload)?)
}

async fn send_msg<C: MessageChannel>(
    channel: &mut C,
    msg: &CoordinatorMessage,
) -> Result<(), SessionError> {
    channel.send(&encode(msg)?).await?;
    Ok(())
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
