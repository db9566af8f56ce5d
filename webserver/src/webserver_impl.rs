//! Main webserver implementation
//!
//! Serves the observer websocket, a health probe and the static browser
//! client. Requests received on the websocket are queued to the scheduler.

use axum::{routing::get, Router};
use shared::{process_info, ProcessId};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use crate::error::{WebServerError, WebServerResult};
use crate::state::WebServerState;
use crate::types::ClientEnvelope;
use crate::web::handlers::{health_check, websocket_handler};

#[derive(Clone)]
pub struct WebServer {
    state: Arc<WebServerState>,
}

impl WebServer {
    pub fn new(requests_tx: mpsc::Sender<ClientEnvelope>, static_dir: impl Into<PathBuf>) -> Self {
        Self {
            state: Arc::new(WebServerState::new(requests_tx, static_dir)),
        }
    }

    /// Build the Axum router with all routes
    pub fn build_router(&self) -> Router {
        Router::new()
            .route("/ws", get(websocket_handler))
            .route("/health", get(health_check))
            .fallback_service(ServeDir::new(&self.state.static_dir))
            .layer(
                ServiceBuilder::new()
                    .layer(CorsLayer::permissive()) // Allow CORS for development
                    .into_inner(),
            )
            .with_state(self.state.clone())
    }

    pub async fn bind(address: SocketAddr) -> WebServerResult<TcpListener> {
        TcpListener::bind(address)
            .await
            .map_err(|e| WebServerError::ServerStartup {
                address: address.to_string(),
                message: e.to_string(),
            })
    }

    /// Serve on an already bound listener until the server fails
    pub async fn serve(&self, listener: TcpListener) -> WebServerResult<()> {
        let router = self.build_router();
        axum::serve(listener, router).await?;
        Ok(())
    }

    /// Bind `address` and serve
    pub async fn run(&self, address: SocketAddr) -> WebServerResult<()> {
        let listener = Self::bind(address).await?;
        process_info!(ProcessId::current(), "🌐 Web server listening on http://{}", listener.local_addr()?);
        self.serve(listener).await
    }

    /// Get server state for external access
    pub fn state(&self) -> &Arc<WebServerState> {
        &self.state
    }
}
