// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use serde::{Deserialize, Serialize};

/// Request from CLI to daemon
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum Request {
    /// Health check ping
    Ping,

    /// Register a project. The compilation-unit list arrives
    /// precomputed from the project initializer.
    ProjectAdd {
        url: String,
        rev: String,
        #[serde(default)]
        options: String,
        #[serde(default)]
        files: Vec<String>,
    },

    /// Drop catalog entries by full URL (exact) or short name (suffix)
    ProjectRemove { url: String },

    /// List the catalog
    ProjectList,

    /// Fan a fresh build of the project out to every connected worker
    Clone { url: String },

    /// Progress snapshot for a project's most recent build
    Status { url: String },

    /// Request daemon shutdown
    Shutdown,
}

#[cfg(test)]
#[path = "request_tests.rs"]
mod tests;
