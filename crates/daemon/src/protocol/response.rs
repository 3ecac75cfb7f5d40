// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use serde::{Deserialize, Serialize};

/// Catalog entry summary for listings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProjectEntry {
    pub url: String,
    pub rev: String,
    pub options: String,
    /// Number of compilation units, not their names — listings stay
    /// readable for projects with thousands of files.
    pub files: usize,
}

/// Response from daemon to CLI
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Response {
    Ok,

    Pong,

    ShuttingDown,

    Error { message: String },

    Projects { projects: Vec<ProjectEntry> },

    /// A build was fanned out to `workers` live sessions.
    CloneStarted {
        url: String,
        rev: String,
        build_id: String,
        workers: usize,
    },

    /// The registry was empty; nothing was queued anywhere.
    NoWorkers,

    /// No catalog entry (or live build) matches the descriptor.
    NotFound { url: String },

    /// Progress of the most recent build for a project.
    BuildStatus {
        url: String,
        rev: String,
        artifacts: usize,
        pending: usize,
    },
}

#[cfg(test)]
#[path = "response_tests.rs"]
mod tests;
