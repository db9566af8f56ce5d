//! Type definitions for webserver

use shared::{ObserverRequest, ObserverUpdate};
use std::fmt;
use tokio::sync::mpsc;

/// Client identifier for WebSocket connections
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub struct ClientId(pub String);

impl ClientId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl Default for ClientId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A request from one client together with the way back to it
#[derive(Debug)]
pub struct ClientEnvelope {
    pub client_id: ClientId,
    pub request: ObserverRequest,
    /// Send queue of the client's socket
    pub updates: mpsc::UnboundedSender<ObserverUpdate>,
}
