// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Project catalog: the set of projects a clone can be requested for.
//!
//! The daemon holds the catalog behind a single lock and persists it to
//! a flat file across restarts. Lookups accept either a full repository
//! URL or a short name matched as a trailing `/name` path segment, so
//! `forge clone sdizo` finds `https://example.com/pwr-sdizo` the same
//! way the full URL does.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::project::ProjectDescriptor;

/// Catalog errors.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("project already exists: {url}@{rev}")]
    Duplicate { url: String, rev: String },
}

/// All projects known to the coordinator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectCatalog {
    projects: Vec<ProjectDescriptor>,
}

impl ProjectCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a project. Rejects a descriptor whose (url, rev) is already
    /// present; differing revisions of the same URL are distinct entries.
    pub fn add(&mut self, descriptor: ProjectDescriptor) -> Result<(), CatalogError> {
        if self
            .projects
            .iter()
            .any(|p| p.same_project(&descriptor.url, &descriptor.rev))
        {
            return Err(CatalogError::Duplicate {
                url: descriptor.url,
                rev: descriptor.rev,
            });
        }
        self.projects.push(descriptor);
        Ok(())
    }

    /// Remove every entry matching `url`: an exact match for full URLs,
    /// otherwise a `/name` suffix match for short names. Returns how many
    /// entries were removed.
    pub fn remove(&mut self, url: &str) -> usize {
        let before = self.projects.len();
        if url.starts_with("https://") || url.starts_with("git://") {
            self.projects.retain(|p| p.url != url);
        } else {
            let suffix = format!("/{url}");
            self.projects.retain(|p| !p.url.ends_with(&suffix));
        }
        before - self.projects.len()
    }

    /// Find a project by full URL or short-name suffix. With multiple
    /// suffix matches the first (oldest) entry wins.
    pub fn find(&self, url: &str) -> Option<&ProjectDescriptor> {
        let suffix = format!("/{url}");
        self.projects
            .iter()
            .find(|p| p.url == url)
            .or_else(|| self.projects.iter().find(|p| p.url.ends_with(&suffix)))
    }

    pub fn projects(&self) -> &[ProjectDescriptor] {
        &self.projects
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }
}

#[cfg(test)]
#[path = "catalog_tests.rs"]
mod tests;
