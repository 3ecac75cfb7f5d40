// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Project descriptors.

use serde::{Deserialize, Serialize};

/// Immutable descriptor sent to a worker before any compile work:
/// where to fetch the source tree and how to configure its build.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BootstrapInfo {
    /// Repository URL.
    pub url: String,
    /// Revision to check out.
    pub rev: String,
    /// Build configuration options, passed through verbatim.
    #[serde(default)]
    pub options: String,
}

/// One project known to the catalog.
///
/// The compilation-unit list is precomputed by the project initializer
/// (an external collaborator); the coordinator never enumerates units
/// itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectDescriptor {
    pub url: String,
    pub rev: String,
    #[serde(default)]
    pub options: String,
    /// Source files awaiting compilation, in initializer order.
    #[serde(default)]
    pub files: Vec<String>,
}

impl ProjectDescriptor {
    /// Catalog identity is (url, rev); options and files are payload.
    pub fn same_project(&self, url: &str, rev: &str) -> bool {
        self.url == url && self.rev == rev
    }

    pub fn bootstrap_info(&self) -> BootstrapInfo {
        BootstrapInfo {
            url: self.url.clone(),
            rev: self.rev.clone(),
            options: self.options.clone(),
        }
    }
}
