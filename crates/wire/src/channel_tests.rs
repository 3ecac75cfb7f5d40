// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use futures_util::SinkExt;
use tokio_tungstenite::tungstenite::protocol::Role;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;

use super::*;

#[tokio::test]
async fn stream_channel_roundtrip() {
    let (a, b) = tokio::io::duplex(4096);
    let mut left = StreamChannel::new(a);
    let mut right = StreamChannel::new(b);

    left.send(b"ping").await.unwrap();
    assert_eq!(right.recv().await.unwrap(), b"ping");

    right.send(b"pong").await.unwrap();
    assert_eq!(left.recv().await.unwrap(), b"pong");
}

#[tokio::test]
async fn stream_channel_reports_peer_close() {
    let (a, b) = tokio::io::duplex(4096);
    let mut right = StreamChannel::new(b);

    drop(a);
    let err = right.recv().await.unwrap_err();
    assert!(matches!(err, ProtocolError::ConnectionClosed));
}

async fn ws_pair() -> (
    WebSocketStream<tokio::io::DuplexStream>,
    WsChannel<tokio::io::DuplexStream>,
) {
    let (a, b) = tokio::io::duplex(4096);
    let client = WebSocketStream::from_raw_socket(a, Role::Client, None).await;
    let server = WebSocketStream::from_raw_socket(b, Role::Server, None).await;
    (client, WsChannel::new(server))
}

#[tokio::test]
async fn ws_channel_one_frame_is_one_message() {
    let (mut client, mut server) = ws_pair().await;

    client
        .send(Message::binary(b"payload".to_vec()))
        .await
        .unwrap();
    assert_eq!(server.recv().await.unwrap(), b"payload");
}

#[tokio::test]
async fn ws_channel_discards_zero_length_frames() {
    let (mut client, mut server) = ws_pair().await;

    // Spurious empty delivery, then the real message.
    client.send(Message::binary(Vec::new())).await.unwrap();
    client
        .send(Message::binary(b"real".to_vec()))
        .await
        .unwrap();

    assert_eq!(server.recv().await.unwrap(), b"real");
}

#[tokio::test]
async fn ws_channel_accepts_text_frames_as_payload() {
    let (mut client, mut server) = ws_pair().await;

    client
        .send(Message::text("{\"type\":\"RegisterRequest\",\"version\":1}"))
        .await
        .unwrap();

    let payload = server.recv().await.unwrap();
    let msg: crate::WorkerMessage = crate::decode(&payload).unwrap();
    assert_eq!(msg, crate::WorkerMessage::RegisterRequest { version: 1 });
}

#[tokio::test]
async fn ws_channel_close_frame_is_connection_closed() {
    let (mut client, mut server) = ws_pair().await;

    client.close(None).await.unwrap();
    let err = server.recv().await.unwrap_err();
    assert!(matches!(err, ProtocolError::ConnectionClosed));
}
