//! HTTP viewer server

use axum::{routing::get, Router};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinHandle;
use tower_http::cors::CorsLayer;

use super::handlers;
use crate::config::UiConfig;
use crate::video::FrameBoard;

/// Shared state for all handlers
pub struct AppState {
    pub board: FrameBoard,
    pub is_sender: bool,
    pub started_at: Instant,
}

/// Serves the frame board over HTTP
pub struct WebServer {
    config: UiConfig,
    state: Arc<AppState>,
}

impl WebServer {
    pub fn new(config: UiConfig, board: FrameBoard, is_sender: bool) -> Self {
        Self {
            config,
            state: Arc::new(AppState {
                board,
                is_sender,
                started_at: Instant::now(),
            }),
        }
    }

    pub fn address(&self) -> SocketAddr {
        SocketAddr::new(self.config.bind_address, self.config.http_port)
    }

    pub fn router(&self) -> Router {
        Router::new()
            .route("/", get(handlers::index))
            .route("/api/status", get(handlers::get_status))
            .route("/api/windows", get(handlers::get_windows))
            .route("/windows/:name/frame.jpg", get(handlers::get_frame))
            .layer(CorsLayer::permissive())
            .with_state(self.state.clone())
    }

    /// Serve until `shutdown` resolves
    pub async fn serve<F>(self, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = self.address();
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("Viewer listening on http://{}", addr);

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("Viewer shut down");
        Ok(())
    }

    /// Spawn on the current tokio runtime; stops with the runtime
    pub fn start_background(self) -> JoinHandle<()> {
        tokio::spawn(async move {
            if let Err(e) = self.serve(std::future::pending()).await {
                tracing::error!("Viewer error: {}", e);
            }
        })
    }
}
