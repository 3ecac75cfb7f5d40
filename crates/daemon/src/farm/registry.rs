// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Registry of live worker sessions.

use std::collections::HashMap;
use std::sync::Arc;

use forge_core::{BuildProject, WorkerId};
use parking_lot::Mutex;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Errors from project dispatch.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DispatchError {
    #[error("no workers available")]
    NoWorkers,
}

/// Process-wide set of registered worker sessions.
///
/// A session appears here iff its connection is established and past
/// registration. The map value is the sending half of the session's
/// private inbox; the session owns the receiving half.
#[derive(Debug, Default)]
pub struct WorkerRegistry {
    workers: Mutex<HashMap<WorkerId, mpsc::UnboundedSender<Arc<BuildProject>>>>,
}

impl WorkerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a session. The returned guard removes it again when
    /// dropped, on every exit path.
    pub fn register(
        registry: &Arc<Self>,
        id: WorkerId,
        inbox: mpsc::UnboundedSender<Arc<BuildProject>>,
    ) -> Registration {
        registry.workers.lock().insert(id.clone(), inbox);
        debug!(worker = %id, "registered worker");
        Registration { registry: Arc::clone(registry), id }
    }

    /// Remove a session. Idempotent: removing an absent session is a
    /// no-op.
    pub fn deregister(&self, id: &WorkerId) {
        if self.workers.lock().remove(id).is_some() {
            debug!(worker = %id, "deregistered worker");
        }
    }

    /// Broadcast the same BuildProject reference into every currently
    /// registered session's inbox. Workers registering afterwards are
    /// not retroactively assigned.
    ///
    /// Enqueueing on an unbounded channel never blocks, so the registry
    /// lock is held for the snapshot-and-enqueue only — no I/O happens
    /// under it.
    pub fn dispatch(&self, project: Arc<BuildProject>) -> Result<usize, DispatchError> {
        let workers = self.workers.lock();
        if workers.is_empty() {
            return Err(DispatchError::NoWorkers);
        }

        for (id, inbox) in workers.iter() {
            if inbox.send(Arc::clone(&project)).is_err() {
                // The session is tearing down; its guard will deregister it.
                warn!(worker = %id, build = %project.id(), "inbox closed, skipping worker");
            }
        }
        Ok(workers.len())
    }

    pub fn len(&self) -> usize {
        self.workers.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.lock().is_empty()
    }
}

/// Scoped registry membership: deregisters the session when dropped,
/// whether the session ended normally, errored, or was cancelled.
#[derive(Debug)]
pub struct Registration {
    registry: Arc<WorkerRegistry>,
    id: WorkerId,
}

impl Registration {
    pub fn id(&self) -> &WorkerId {
        &self.id
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        self.registry.deregister(&self.id);
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
