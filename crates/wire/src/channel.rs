// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Channel abstraction over the two worker transports.
//!
//! A `MessageChannel` delivers discrete application messages over a
//! persistent bidirectional connection. `StreamChannel` applies the
//! length-prefix framing to a byte stream (TCP); `WsChannel` maps one
//! WebSocket frame to one message, discarding spurious zero-length
//! frames instead of treating them as valid empty messages.

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;

use crate::framing::{read_frame, write_frame, ProtocolError};

/// Blocking receive-one-message / send-one-message over a persistent
/// bidirectional connection.
#[async_trait]
pub trait MessageChannel: Send {
    /// Receive one complete message payload, waiting until the transport
    /// delivers it in full.
    async fn recv(&mut self) -> Result<Vec<u8>, ProtocolError>;

    /// Send one message payload as a single frame.
    async fn send(&mut self, payload: &[u8]) -> Result<(), ProtocolError>;
}

/// Length-prefixed framing over a stream transport.
pub struct StreamChannel<S> {
    stream: S,
}

impl<S: AsyncRead + AsyncWrite + Unpin + Send> StreamChannel<S> {
    pub fn new(stream: S) -> Self {
        Self { stream }
    }
}

#[async_trait]
impl<S: AsyncRead + AsyncWrite + Unpin + Send> MessageChannel for StreamChannel<S> {
    async fn recv(&mut self) -> Result<Vec<u8>, ProtocolError> {
        read_frame(&mut self.stream).await
    }

    async fn send(&mut self, payload: &[u8]) -> Result<(), ProtocolError> {
        write_frame(&mut self.stream, payload).await
    }
}

/// One WebSocket frame per message.
pub struct WsChannel<S> {
    ws: WebSocketStream<S>,
}

impl<S: AsyncRead + AsyncWrite + Unpin + Send> WsChannel<S> {
    pub fn new(ws: WebSocketStream<S>) -> Self {
        Self { ws }
    }
}

#[async_trait]
impl<S: AsyncRead + AsyncWrite + Unpin + Send> MessageChannel for WsChannel<S> {
    async fn recv(&mut self) -> Result<Vec<u8>, ProtocolError> {
        loop {
            match self.ws.next().await {
                Some(Ok(Message::Binary(data))) if !data.is_empty() => {
                    return Ok(data.to_vec());
                }
                Some(Ok(Message::Text(text))) if !text.is_empty() => {
                    return Ok(text.as_bytes().to_vec());
                }
                // Zero-length frames and control frames: keep waiting.
                Some(Ok(Message::Binary(_) | Message::Text(_))) => {}
                Some(Ok(Message::Ping(_) | Message::Pong(_) | Message::Frame(_))) => {}
                Some(Ok(Message::Close(_))) | None => {
                    return Err(ProtocolError::ConnectionClosed);
                }
                Some(Err(e)) => return Err(ProtocolError::Ws(e)),
            }
        }
    }

    async fn send(&mut self, payload: &[u8]) -> Result<(), ProtocolError> {
        self.ws.send(Message::binary(payload.to_vec())).await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "channel_tests.rs"]
mod tests;
