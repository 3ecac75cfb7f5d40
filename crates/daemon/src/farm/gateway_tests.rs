// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;
use std::time::Duration;

use forge_core::{BootstrapInfo, BuildProject};
use forge_wire::{decode, encode, CoordinatorMessage, MessageChannel, StreamChannel, WorkerMessage, WsChannel};
use tokio::net::{TcpListener, TcpStream};
use tokio_util::sync::CancellationToken;

use super::*;

async fn wait_until(mut cond: impl FnMut() -> bool) {
    for _ in 0..500 {
        if cond() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("condition not reached within 2.5s");
}

fn build() -> Arc<BuildProject> {
    Arc::new(BuildProject::new(
        BootstrapInfo {
            url: "repo://x".to_string(),
            rev: "abc".to_string(),
            options: String::new(),
        },
        ["a.cc".to_string()],
    ))
}

async fn start_gateway(
    ws: bool,
) -> (std::net::SocketAddr, Option<std::net::SocketAddr>, Arc<WorkerRegistry>, CancellationToken) {
    let registry = Arc::new(WorkerRegistry::new());
    let shutdown = CancellationToken::new();

    let tcp = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let tcp_addr = tcp.local_addr().unwrap();

    let mut gateway = WorkerGateway::new(
        tcp,
        Arc::clone(&registry),
        shutdown.clone(),
        Some(Duration::from_secs(5)),
    );

    let ws_addr = if ws {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        gateway = gateway.with_ws(listener);
        Some(addr)
    } else {
        None
    };

    tokio::spawn(gateway.run());
    (tcp_addr, ws_addr, registry, shutdown)
}

async fn drive_worker<C: MessageChannel>(channel: &mut C) {
    channel
        .send(&encode(&WorkerMessage::RegisterRequest { version: 1 }).unwrap())
        .await
        .unwrap();
    let response: CoordinatorMessage = decode(&channel.recv().await.unwrap()).unwrap();
    assert_eq!(response, CoordinatorMessage::RegisterResponse { code: 0 });
}

async fn drain_one_unit<C: MessageChannel>(channel: &mut C) {
    let bootstrap: CoordinatorMessage = decode(&channel.recv().await.unwrap()).unwrap();
    assert!(matches!(bootstrap, CoordinatorMessage::BootstrapRequest { .. }));
    channel
        .send(&encode(&WorkerMessage::BootstrapResponse { code: 0 }).unwrap())
        .await
        .unwrap();

    let request: CoordinatorMessage = decode(&channel.recv().await.unwrap()).unwrap();
    assert_eq!(
        request,
        CoordinatorMessage::CompileRequest { file: "a.cc.o".to_string() }
    );
    channel
        .send(
            &encode(&WorkerMessage::CompileResponse {
                file: "a.cc.o".to_string(),
                error: String::new(),
                data: vec![1],
            })
            .unwrap(),
        )
        .await
        .unwrap();

    let sentinel: CoordinatorMessage = decode(&channel.recv().await.unwrap()).unwrap();
    assert_eq!(
        sentinel,
        CoordinatorMessage::CompileRequest { file: String::new() }
    );
}

#[tokio::test]
async fn tcp_worker_compiles_through_the_gateway() {
    let (tcp_addr, _, registry, _shutdown) = start_gateway(false).await;

    let stream = TcpStream::connect(tcp_addr).await.unwrap();
    let mut channel = StreamChannel::new(stream);
    drive_worker(&mut channel).await;
    wait_until(|| registry.len() == 1).await;

    let project = build();
    registry.dispatch(Arc::clone(&project)).unwrap();
    drain_one_unit(&mut channel).await;

    assert_eq!(project.progress().artifacts, 1);
}

#[tokio::test]
async fn websocket_worker_compiles_through_the_gateway() {
    let (_, ws_addr, registry, _shutdown) = start_gateway(true).await;
    let ws_addr = ws_addr.unwrap();

    let stream = TcpStream::connect(ws_addr).await.unwrap();
    let (ws, _) = tokio_tungstenite::client_async(format!("ws://{ws_addr}/"), stream)
        .await
        .unwrap();
    let mut channel = WsChannel::new(ws);

    drive_worker(&mut channel).await;
    wait_until(|| registry.len() == 1).await;

    let project = build();
    registry.dispatch(Arc::clone(&project)).unwrap();
    drain_one_unit(&mut channel).await;

    assert_eq!(project.progress().artifacts, 1);
}

#[tokio::test]
async fn gateway_hosts_concurrent_workers_draining_one_queue() {
    let (tcp_addr, _, registry, _shutdown) = start_gateway(false).await;

    let mut channels = Vec::new();
    for _ in 0..3 {
        let stream = TcpStream::connect(tcp_addr).await.unwrap();
        let mut channel = StreamChannel::new(stream);
        drive_worker(&mut channel).await;
        channels.push(channel);
    }
    wait_until(|| registry.len() == 3).await;

    let files: Vec<String> = (0..30).map(|i| format!("f{i}.cc")).collect();
    let project = Arc::new(BuildProject::new(
        BootstrapInfo {
            url: "repo://x".to_string(),
            rev: "abc".to_string(),
            options: String::new(),
        },
        files,
    ));
    registry.dispatch(Arc::clone(&project)).unwrap();

    // Each worker independently bootstraps and drains the shared queue
    // until it observes the end-of-work sentinel.
    let mut handles = Vec::new();
    for mut channel in channels {
        handles.push(tokio::spawn(async move {
            let bootstrap: CoordinatorMessage =
                decode(&channel.recv().await.unwrap()).unwrap();
            assert!(matches!(bootstrap, CoordinatorMessage::BootstrapRequest { .. }));
            channel
                .send(&encode(&WorkerMessage::BootstrapResponse { code: 0 }).unwrap())
                .await
                .unwrap();

            loop {
                let request: CoordinatorMessage =
                    decode(&channel.recv().await.unwrap()).unwrap();
                let file = match request {
                    CoordinatorMessage::CompileRequest { file } => file,
                    other => panic!("expected CompileRequest, got {other:?}"),
                };
                if file.is_empty() {
                    return;
                }
                channel
                    .send(
                        &encode(&WorkerMessage::CompileResponse {
                            file,
                            error: String::new(),
                            data: vec![0xCC],
                        })
                        .unwrap(),
                    )
                    .await
                    .unwrap();
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let progress = project.progress();
    assert_eq!(progress.artifacts, 30);
    assert_eq!(progress.pending, 0);
}

#[tokio::test]
async fn shutdown_token_stops_accepting_and_tears_down_sessions() {
    let (tcp_addr, _, registry, shutdown) = start_gateway(false).await;

    let stream = TcpStream::connect(tcp_addr).await.unwrap();
    let mut channel = StreamChannel::new(stream);
    drive_worker(&mut channel).await;
    wait_until(|| registry.len() == 1).await;

    shutdown.cancel();
    wait_until(|| registry.is_empty()).await;
}
