//! Observer channel for the test scheduler
//!
//! Browsers connect over a websocket, send run/stop/list requests and
//! receive progress snapshots and run summaries. The scheduler binary
//! embeds this server and consumes the queued [`ClientEnvelope`]s.

pub mod error;
pub mod state;
pub mod types;
pub mod web;
pub mod webserver_impl;

pub use error::{WebServerError, WebServerResult};
pub use state::WebServerState;
pub use types::*;
pub use webserver_impl::WebServer;
