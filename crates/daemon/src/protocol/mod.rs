// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! IPC protocol for admin communication with the daemon.
//!
//! Wire format: 4-byte length prefix (little-endian) + JSON payload,
//! shared with the worker protocol in `forge-wire`. One request per
//! connection.

mod request;
mod response;
mod wire;

pub use request::Request;
pub use response::{ProjectEntry, Response};
pub use wire::{read_request, read_response, write_request, write_response};
