// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[tokio::test]
async fn frame_roundtrip() {
    let payload = b"hello world".to_vec();

    let mut buf = Vec::new();
    write_frame(&mut buf, &payload).await.unwrap();

    let mut reader: &[u8] = &buf;
    assert_eq!(read_frame(&mut reader).await.unwrap(), payload);
}

#[tokio::test]
async fn empty_payload_roundtrips() {
    let mut buf = Vec::new();
    write_frame(&mut buf, &[]).await.unwrap();
    assert_eq!(buf, vec![0, 0, 0, 0]);

    let mut reader: &[u8] = &buf;
    assert_eq!(read_frame(&mut reader).await.unwrap(), Vec::<u8>::new());
}

#[tokio::test]
async fn length_prefix_is_little_endian() {
    let mut buf = Vec::new();
    write_frame(&mut buf, &[0xAA; 258]).await.unwrap();

    // 258 = 0x0102
    assert_eq!(&buf[..4], &[0x02, 0x01, 0x00, 0x00]);
}

#[tokio::test]
async fn eof_before_prefix_is_connection_closed() {
    let mut reader: &[u8] = &[];
    let err = read_frame(&mut reader).await.unwrap_err();
    assert!(matches!(err, ProtocolError::ConnectionClosed));
}

#[tokio::test]
async fn truncated_payload_is_an_io_error() {
    // Declares 8 bytes, delivers 3.
    let buf: Vec<u8> = [8u8, 0, 0, 0].iter().chain([1u8, 2, 3].iter()).copied().collect();
    let mut reader: &[u8] = &buf;
    let err = read_frame(&mut reader).await.unwrap_err();
    assert!(matches!(err, ProtocolError::Io(_)));
}

#[tokio::test]
async fn oversized_declared_length_is_rejected() {
    let len = (MAX_MESSAGE_SIZE as u32 + 1).to_le_bytes();
    let mut reader: &[u8] = &len;
    let err = read_frame(&mut reader).await.unwrap_err();
    assert!(matches!(err, ProtocolError::MessageTooLarge { .. }));
}
