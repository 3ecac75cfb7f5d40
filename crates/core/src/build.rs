// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared work queue for one build attempt.
//!
//! A `BuildProject` is fanned out by reference to every worker session
//! registered at dispatch time; all of them drain the same pending list
//! concurrently and report artifacts back into the same map. One lock
//! covers both collections jointly, so a pop on one session can never
//! interleave with a record on another in a way that loses a unit.
//!
//! Retry order: `pop_pending` takes from the back of the queue and
//! `push_pending` reinserts at the front. A failed unit is therefore
//! revisited only after everything that was queued at pop time has
//! drained.

use std::collections::{HashMap, VecDeque};

use parking_lot::Mutex;

use crate::id::BuildId;
use crate::project::BootstrapInfo;

/// Point-in-time progress counts, taken under one lock acquisition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildProgress {
    /// Units with a recorded artifact.
    pub artifacts: usize,
    /// Units still awaiting compilation.
    pub pending: usize,
}

/// One dispatched build attempt: the bootstrap descriptor plus the
/// shared pending/artifact state.
#[derive(Debug)]
pub struct BuildProject {
    id: BuildId,
    bootstrap: BootstrapInfo,
    state: Mutex<BuildState>,
}

#[derive(Debug)]
struct BuildState {
    pending: VecDeque<String>,
    artifacts: HashMap<String, Vec<u8>>,
}

impl BuildProject {
    /// Wrap a fresh copy of a project's compilation units. Each dispatch
    /// gets its own instance; completing one build never touches another.
    pub fn new(bootstrap: BootstrapInfo, files: impl IntoIterator<Item = String>) -> Self {
        Self {
            id: BuildId::new(),
            bootstrap,
            state: Mutex::new(BuildState {
                pending: files.into_iter().collect(),
                artifacts: HashMap::new(),
            }),
        }
    }

    pub fn id(&self) -> &BuildId {
        &self.id
    }

    pub fn bootstrap(&self) -> &BootstrapInfo {
        &self.bootstrap
    }

    /// Remove and return one pending identifier, or `None` when this
    /// session's view of the queue is empty. Never blocks beyond the
    /// critical section.
    pub fn pop_pending(&self) -> Option<String> {
        self.state.lock().pending.pop_back()
    }

    /// Reinsert a unit for retry at the opposite end from removal.
    pub fn push_pending(&self, file: impl Into<String>) {
        self.state.lock().pending.push_front(file.into());
    }

    /// Record a compiled artifact. Idempotent upsert — if a straggler
    /// retry resolves late, the last write for an identifier wins.
    pub fn record_artifact(&self, file: impl Into<String>, data: Vec<u8>) {
        self.state.lock().artifacts.insert(file.into(), data);
    }

    /// Artifact bytes for one unit, if recorded.
    pub fn artifact(&self, file: &str) -> Option<Vec<u8>> {
        self.state.lock().artifacts.get(file).cloned()
    }

    pub fn progress(&self) -> BuildProgress {
        let state = self.state.lock();
        BuildProgress {
            artifacts: state.artifacts.len(),
            pending: state.pending.len(),
        }
    }
}

#[cfg(test)]
#[path = "build_tests.rs"]
mod tests;
