//! Test helper utilities for webserver integration tests

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;
use tokio::sync::mpsc;
use webserver::{ClientEnvelope, WebServer};

pub const TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Server on an ephemeral port with the request queue exposed to the test
pub struct TestServer {
    pub addr: SocketAddr,
    pub requests_rx: mpsc::Receiver<ClientEnvelope>,
    pub server: WebServer,
}

pub async fn start_server(static_dir: &Path) -> TestServer {
    let (requests_tx, requests_rx) = mpsc::channel(16);
    let server = WebServer::new(requests_tx, static_dir);

    let listener = WebServer::bind("127.0.0.1:0".parse().unwrap()).await.unwrap();
    let addr = listener.local_addr().unwrap();
    let serving = server.clone();
    tokio::spawn(async move {
        let _ = serving.serve(listener).await;
    });

    TestServer {
        addr,
        requests_rx,
        server,
    }
}

/// Receive the next queued request or fail the test
pub async fn next_request(server: &mut TestServer) -> ClientEnvelope {
    tokio::time::timeout(TEST_TIMEOUT, server.requests_rx.recv())
        .await
        .expect("timed out waiting for a request")
        .expect("request queue closed")
}
