//! Webserver state shared by all handlers

use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Instant;
use tokio::sync::mpsc;

use crate::error::{WebServerError, WebServerResult};
use crate::types::ClientEnvelope;

#[derive(Debug)]
pub struct WebServerState {
    /// Queue into the scheduler's coordinator loop
    pub requests_tx: mpsc::Sender<ClientEnvelope>,
    pub static_dir: PathBuf,
    pub connection_count: AtomicU32,
    pub server_start_time: Instant,
}

impl WebServerState {
    pub fn new(requests_tx: mpsc::Sender<ClientEnvelope>, static_dir: impl Into<PathBuf>) -> Self {
        Self {
            requests_tx,
            static_dir: static_dir.into(),
            connection_count: AtomicU32::new(0),
            server_start_time: Instant::now(),
        }
    }

    /// Hand a client request to the scheduler
    pub async fn forward(&self, envelope: ClientEnvelope) -> WebServerResult<()> {
        self.requests_tx
            .send(envelope)
            .await
            .map_err(|_| WebServerError::SchedulerUnavailable)
    }

    /// Get server uptime in seconds
    pub fn get_uptime_seconds(&self) -> u64 {
        self.server_start_time.elapsed().as_secs()
    }

    pub fn get_connection_count(&self) -> u32 {
        self.connection_count.load(Ordering::Relaxed)
    }

    pub fn increment_connection_count(&self) -> u32 {
        self.connection_count.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn decrement_connection_count(&self) -> u32 {
        self.connection_count.fetch_sub(1, Ordering::Relaxed).saturating_sub(1)
    }
}
