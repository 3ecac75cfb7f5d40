// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Message schema for the worker protocol.
//!
//! Traffic on one connection is strict request/response: the
//! coordinator never sends a second request before the worker has
//! answered the previous one.

use serde::{Deserialize, Serialize};

/// Messages the coordinator sends to a worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CoordinatorMessage {
    /// Acknowledges registration. `code` 0 accepts the worker.
    RegisterResponse { code: i32 },

    /// Tells the worker which project, revision, and build options to
    /// prepare before any compile work.
    BootstrapRequest { url: String, rev: String, opt: String },

    /// Asks the worker to compile one unit. An empty `file` is the
    /// end-of-work sentinel: this session has no more units to hand out.
    CompileRequest { file: String },
}

impl CoordinatorMessage {
    /// Variant name, for logs and protocol-error diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::RegisterResponse { .. } => "RegisterResponse",
            Self::BootstrapRequest { .. } => "BootstrapRequest",
            Self::CompileRequest { .. } => "CompileRequest",
        }
    }
}

/// Messages a worker sends to the coordinator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WorkerMessage {
    /// First message on every new connection.
    RegisterRequest { version: u32 },

    /// Result of preparing the project. `code` 0 means ready to compile;
    /// anything else abandons the project on this worker.
    BootstrapResponse { code: i32 },

    /// Result of one compile. Empty `data` means the compile failed and
    /// `error` carries the diagnostic.
    CompileResponse {
        file: String,
        #[serde(default)]
        error: String,
        #[serde(default)]
        data: Vec<u8>,
    },
}

impl WorkerMessage {
    /// Variant name, for logs and protocol-error diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::RegisterRequest { .. } => "RegisterRequest",
            Self::BootstrapResponse { .. } => "BootstrapResponse",
            Self::CompileResponse { .. } => "CompileResponse",
        }
    }
}

#[cfg(test)]
#[path = "message_tests.rs"]
mod tests;
