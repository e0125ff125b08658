//! HTTP host for a [`Pipe`].
//!
//! Serves the pipe under the OpenAI chat-completions route so a chat front-end
//! can use it directly.

mod handlers;

use crate::chat::CHAT_COMPLETIONS_PATH;
use crate::pipe::Pipe;
use anyhow::{Context, Result};
use axum::routing::post;
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

pub use handlers::{AppState, USER_ID_HEADER};

/// Host server settings.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub listen_addr: SocketAddr,
}

/// Build the host router around `pipe`.
pub fn router(pipe: Arc<Pipe>) -> Router {
    Router::new()
        .route(CHAT_COMPLETIONS_PATH, post(handlers::chat_completions))
        .with_state(AppState { pipe })
        .layer(TraceLayer::new_for_http())
}

/// Bind and serve until the process is stopped.
pub async fn serve(pipe: Arc<Pipe>, config: ServerConfig) -> Result<()> {
    let listener = TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.listen_addr))?;

    info!(
        target: "plain",
        "Pipe listening on http://{}",
        listener.local_addr().context("Failed to read local address")?
    );

    axum::serve(listener, router(pipe))
        .await
        .context("Server error")
}
