//! WebSocket connection handler
//!
//! Each browser connection gets a client id and an outgoing queue. Text
//! frames are parsed into observer requests and forwarded to the scheduler
//! together with that queue.

use axum::{
    extract::{
        ws::{Message, WebSocket},
        State, WebSocketUpgrade,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use shared::{process_debug, process_info, process_warn, ObserverRequest, ObserverUpdate, ProcessId};
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::error::{WebServerError, WebServerResult};
use crate::state::WebServerState;
use crate::types::{ClientEnvelope, ClientId};

/// WebSocket connection handler
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<WebServerState>>,
) -> Response {
    ws.on_upgrade(|socket| handle_websocket(socket, state))
}

/// Parse one text frame sent by a browser
pub fn parse_client_frame(text: &str) -> WebServerResult<ObserverRequest> {
    serde_json::from_str(text).map_err(|e| WebServerError::InvalidRequest {
        details: e.to_string(),
    })
}

/// Handle individual WebSocket connection
async fn handle_websocket(socket: WebSocket, state: Arc<WebServerState>) {
    let client_id = ClientId::new();
    let connections = state.increment_connection_count();
    process_info!(ProcessId::current(), "🔗 New WebSocket connection: {} ({} open)", client_id, connections);

    let (mut sender, mut receiver) = socket.split();
    let (updates_tx, mut updates_rx) = mpsc::unbounded_channel::<ObserverUpdate>();

    let outgoing_id = client_id.clone();
    let outgoing_task = tokio::spawn(async move {
        while let Some(update) = updates_rx.recv().await {
            let json = match serde_json::to_string(&update) {
                Ok(json) => json,
                Err(e) => {
                    process_warn!(ProcessId::current(), "Failed to serialize update: {}", e);
                    continue;
                }
            };
            if let Err(e) = sender.send(Message::Text(json)).await {
                process_debug!(ProcessId::current(), "Failed to send to client {}: {}", outgoing_id, e);
                break;
            }
        }
    });

    while let Some(msg) = receiver.next().await {
        let msg = match msg {
            Ok(msg) => msg,
            Err(e) => {
                process_warn!(ProcessId::current(), "WebSocket error for client {}: {}", client_id, e);
                break;
            }
        };

        match msg {
            Message::Text(text) => {
                process_debug!(ProcessId::current(), "📨 Received from client {}: {}", client_id, text);
                match parse_client_frame(&text) {
                    Ok(request) => {
                        let envelope = ClientEnvelope {
                            client_id: client_id.clone(),
                            request,
                            updates: updates_tx.clone(),
                        };
                        if let Err(e) = state.forward(envelope).await {
                            process_warn!(ProcessId::current(), "Dropping request from {}: {}", client_id, e);
                            break;
                        }
                    }
                    Err(e) => {
                        process_warn!(ProcessId::current(), "Failed to parse request from {}: {}", client_id, e);
                        let _ = updates_tx.send(ObserverUpdate::Error {
                            message: e.to_string(),
                        });
                    }
                }
            }
            Message::Binary(_) => {
                process_warn!(ProcessId::current(), "Received binary message from client {} - not supported", client_id);
            }
            Message::Ping(_) | Message::Pong(_) => {}
            Message::Close(_) => break,
        }
    }

    // The scheduler may still hold clones of the queue for a running test
    // run, so the outgoing task is not going to end on its own.
    outgoing_task.abort();
    state.decrement_connection_count();

    process_info!(ProcessId::current(), "👋 WebSocket connection closed: {}", client_id);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run_frame() {
        let request =
            parse_client_frame(r#"{"type":"run","testNames":["a","b"],"threadsCount":2}"#).unwrap();
        match request {
            ObserverRequest::Run {
                test_names,
                threads_count,
                no_headless,
                replay_speed,
            } => {
                assert_eq!(test_names, vec!["a".to_string(), "b".to_string()]);
                assert_eq!(threads_count, 2);
                assert!(!no_headless);
                assert_eq!(replay_speed, 1.0);
            }
            other => panic!("unexpected request: {other:?}"),
        }
    }

    #[test]
    fn test_parse_rejects_unknown_frames() {
        assert!(matches!(
            parse_client_frame(r#"{"type":"launchRockets"}"#),
            Err(WebServerError::InvalidRequest { .. })
        ));
        assert!(parse_client_frame("not json").is_err());
    }
}
