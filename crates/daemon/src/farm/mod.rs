// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The work-dispatch engine: worker registry, per-connection session
//! state machine, and the gateway that accepts worker connections.
//!
//! One tokio task per connection. Sessions share state with the rest of
//! the daemon only through the `BuildProject` lock and the registry
//! lock — a stalled worker blocks its own session, never the others and
//! never the dispatch path.

mod gateway;
mod registry;
mod session;

pub use gateway::WorkerGateway;
pub use registry::{DispatchError, Registration, WorkerRegistry};
pub use session::{run_session, SessionError};
