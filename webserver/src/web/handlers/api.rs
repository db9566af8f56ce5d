//! REST API handlers

use axum::{extract::State, response::Json};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::state::WebServerState;

/// Liveness probe
pub async fn health_check(State(state): State<Arc<WebServerState>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "connected_clients": state.get_connection_count(),
        "uptime_seconds": state.get_uptime_seconds(),
    }))
}
