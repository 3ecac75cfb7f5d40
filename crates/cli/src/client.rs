// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Client for the daemon's admin socket.
//!
//! One request per connection: connect, send, read the response,
//! disconnect.

use std::path::PathBuf;
use std::time::Duration;

use forge_daemon::protocol::{read_response, write_request};
use forge_daemon::{ProjectEntry, Request, Response};
use thiserror::Error;
use tokio::net::UnixStream;

/// Client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("failed to connect to {0} (is forged running?): {1}")]
    Connect(PathBuf, std::io::Error),

    #[error("protocol error: {0}")]
    Protocol(#[from] forge_wire::ProtocolError),

    #[error("{0}")]
    Daemon(String),

    #[error("unexpected response: {0:?}")]
    Unexpected(Response),
}

/// Outcome of a clone request, for display.
#[derive(Debug)]
pub enum CloneResult {
    Started { build_id: String, workers: usize },
    NoWorkers,
    NotFound,
}

/// Progress of a project's most recent build.
#[derive(Debug)]
pub struct StatusResult {
    pub url: String,
    pub rev: String,
    pub artifacts: usize,
    pub pending: usize,
}

pub struct DaemonClient {
    socket_path: PathBuf,
    timeout: Duration,
}

impl DaemonClient {
    pub fn new(socket_path: PathBuf) -> Self {
        Self { socket_path, timeout: Duration::from_secs(5) }
    }

    /// Send one request and read the response. `Error` responses become
    /// `ClientError::Daemon`.
    pub async fn send(&self, request: &Request) -> Result<Response, ClientError> {
        let stream = UnixStream::connect(&self.socket_path)
            .await
            .map_err(|e| ClientError::Connect(self.socket_path.clone(), e))?;
        let (mut reader, mut writer) = stream.into_split();

        write_request(&mut writer, request, self.timeout).await?;
        match read_response(&mut reader, self.timeout).await? {
            Response::Error { message } => Err(ClientError::Daemon(message)),
            response => Ok(response),
        }
    }

    fn reject<T>(other: Response) -> Result<T, ClientError> {
        Err(ClientError::Unexpected(other))
    }

    pub async fn ping(&self) -> Result<(), ClientError> {
        match self.send(&Request::Ping).await? {
            Response::Pong => Ok(()),
            other => Self::reject(other),
        }
    }

    pub async fn add_project(
        &self,
        url: String,
        rev: String,
        options: String,
        files: Vec<String>,
    ) -> Result<(), ClientError> {
        let request = Request::ProjectAdd { url, rev, options, files };
        match self.send(&request).await? {
            Response::Ok => Ok(()),
            other => Self::reject(other),
        }
    }

    pub async fn remove_project(&self, url: &str) -> Result<(), ClientError> {
        let request = Request::ProjectRemove { url: url.to_string() };
        match self.send(&request).await? {
            Response::Ok => Ok(()),
            Response::NotFound { url } => {
                Err(ClientError::Daemon(format!("no such project: {url}")))
            }
            other => Self::reject(other),
        }
    }

    pub async fn list_projects(&self) -> Result<Vec<ProjectEntry>, ClientError> {
        match self.send(&Request::ProjectList).await? {
            Response::Projects { projects } => Ok(projects),
            other => Self::reject(other),
        }
    }

    pub async fn clone_project(&self, url: &str) -> Result<CloneResult, ClientError> {
        let request = Request::Clone { url: url.to_string() };
        match self.send(&request).await? {
            Response::CloneStarted { build_id, workers, .. } => {
                Ok(CloneResult::Started { build_id, workers })
            }
            Response::NoWorkers => Ok(CloneResult::NoWorkers),
            Response::NotFound { .. } => Ok(CloneResult::NotFound),
            other => Self::reject(other),
        }
    }

    pub async fn status(&self, url: &str) -> Result<Option<StatusResult>, ClientError> {
        let request = Request::Status { url: url.to_string() };
        match self.send(&request).await? {
            Response::BuildStatus { url, rev, artifacts, pending } => {
                Ok(Some(StatusResult { url, rev, artifacts, pending }))
            }
            Response::NotFound { .. } => Ok(None),
            other => Self::reject(other),
        }
    }

    pub async fn shutdown(&self) -> Result<(), ClientError> {
        match self.send(&Request::Shutdown).await? {
            Response::Ok | Response::ShuttingDown => Ok(()),
            other => Self::reject(other),
        }
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
