// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! forge-wire: the worker wire protocol.
//!
//! Message schema, framing, and the channel abstraction shared by the
//! coordinator and Rust worker clients.
//!
//! Wire format on stream transports: 4-byte length prefix
//! (little-endian) + JSON payload. On message transports (WebSocket)
//! the transport frame is the message boundary.

mod channel;
mod framing;
mod message;

pub use channel::{MessageChannel, StreamChannel, WsChannel};
pub use framing::{decode, encode, read_frame, write_frame, ProtocolError, MAX_MESSAGE_SIZE};
pub use message::{CoordinatorMessage, WorkerMessage};
