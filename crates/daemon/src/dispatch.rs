// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Entry point for build dispatch: resolve a project, wrap its units in
//! a fresh BuildProject, and fan it out to every live worker.

use std::collections::HashMap;
use std::sync::Arc;

use forge_core::{BuildId, BuildProject, ProjectCatalog};
use parking_lot::Mutex;
use tracing::info;

use crate::farm::{DispatchError, WorkerRegistry};

/// Outcome of a clone request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloneOutcome {
    /// A fresh build was fanned out to `workers` sessions.
    Started {
        url: String,
        rev: String,
        build_id: BuildId,
        workers: usize,
    },
    /// Registry was empty; the build was not queued anywhere and must
    /// be redispatched later.
    NoWorkers,
    /// Descriptor matches no catalog entry.
    NotFound,
}

/// Progress snapshot for a project's most recent build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildStatus {
    pub url: String,
    pub rev: String,
    pub artifacts: usize,
    pub pending: usize,
}

/// Resolves clone/status requests against the catalog and the registry.
///
/// Keeps the most recent BuildProject per (url, rev) so status queries
/// have something to read; each new clone replaces the table entry with
/// an independent instance — workers still draining a previous build
/// hold their own references and are unaffected.
pub struct Dispatcher {
    catalog: Arc<Mutex<ProjectCatalog>>,
    registry: Arc<WorkerRegistry>,
    builds: Mutex<HashMap<(String, String), Arc<BuildProject>>>,
}

impl Dispatcher {
    pub fn new(catalog: Arc<Mutex<ProjectCatalog>>, registry: Arc<WorkerRegistry>) -> Self {
        Self {
            catalog,
            registry,
            builds: Mutex::new(HashMap::new()),
        }
    }

    /// Resolve `url` (full or short name), build a fresh BuildProject,
    /// and broadcast it to every currently registered worker.
    pub fn request_clone(&self, url: &str) -> CloneOutcome {
        let descriptor = {
            let catalog = self.catalog.lock();
            match catalog.find(url) {
                Some(descriptor) => descriptor.clone(),
                None => return CloneOutcome::NotFound,
            }
        };

        // Each dispatch gets an independent pending/artifact pair, even
        // for the same underlying project.
        let project = Arc::new(BuildProject::new(
            descriptor.bootstrap_info(),
            descriptor.files.clone(),
        ));
        let build_id = project.id().clone();

        match self.registry.dispatch(Arc::clone(&project)) {
            Ok(workers) => {
                info!(url = %descriptor.url, rev = %descriptor.rev, build = %build_id, workers,
                    "build dispatched");
                self.builds
                    .lock()
                    .insert((descriptor.url.clone(), descriptor.rev.clone()), project);
                CloneOutcome::Started {
                    url: descriptor.url,
                    rev: descriptor.rev,
                    build_id,
                    workers,
                }
            }
            Err(DispatchError::NoWorkers) => CloneOutcome::NoWorkers,
        }
    }

    /// Read-only progress snapshot. A project with no build yet reports
    /// all of its units as pending; an unknown descriptor reports
    /// nothing.
    pub fn request_status(&self, url: &str) -> Option<BuildStatus> {
        let descriptor = {
            let catalog = self.catalog.lock();
            catalog.find(url).cloned()
        };

        if let Some(descriptor) = descriptor {
            let build = {
                let builds = self.builds.lock();
                builds
                    .get(&(descriptor.url.clone(), descriptor.rev.clone()))
                    .cloned()
            };
            return Some(match build {
                Some(build) => {
                    let progress = build.progress();
                    BuildStatus {
                        url: descriptor.url,
                        rev: descriptor.rev,
                        artifacts: progress.artifacts,
                        pending: progress.pending,
                    }
                }
                None => BuildStatus {
                    url: descriptor.url,
                    rev: descriptor.rev,
                    artifacts: 0,
                    pending: descriptor.files.len(),
                },
            });
        }

        // Removed from the catalog but still building: fall back to the
        // active-builds table.
        let builds = self.builds.lock();
        let suffix = format!("/{url}");
        builds
            .iter()
            .find(|((build_url, _), _)| build_url == url || build_url.ends_with(&suffix))
            .map(|((build_url, rev), build)| {
                let progress = build.progress();
                BuildStatus {
                    url: build_url.clone(),
                    rev: rev.clone(),
                    artifacts: progress.artifacts,
                    pending: progress.pending,
                }
            })
    }
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;
