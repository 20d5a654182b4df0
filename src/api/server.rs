//! Webhook server lifecycle. Binds, mounts `webhook_router()` and serves
//! in a background task until the handle's shutdown signal fires.
//!
//! bind → spawn background task → return handle with shutdown channel.

use std::net::SocketAddr;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::api::router::webhook_router;
use crate::api::types::ApiContext;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Failed to bind webhook server on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        source: std::io::Error,
    },
}

/// Handle to a running webhook server.
pub struct WebhookServer {
    pub addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl WebhookServer {
    /// Signal a graceful shutdown. Safe to call more than once.
    pub fn shutdown(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
            tracing::info!("Webhook server shutdown signal sent");
        }
    }

    /// Wait for the server task to finish.
    pub async fn join(self) {
        if let Err(e) = self.task.await {
            tracing::error!("Webhook server task failed: {e}");
        }
    }
}

/// Start the webhook server on `addr` (port 0 picks an ephemeral port).
pub async fn start_webhook_server_on(
    addr: SocketAddr,
    ctx: ApiContext,
) -> Result<WebhookServer, ServerError> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| ServerError::Bind { addr, source })?;
    let addr = listener
        .local_addr()
        .map_err(|source| ServerError::Bind { addr, source })?;

    let app = webhook_router(ctx);
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

    let task = tokio::spawn(async move {
        let shutdown_signal = async move {
            let _ = shutdown_rx.await;
            tracing::info!("Webhook server received shutdown signal");
        };

        tracing::info!(%addr, "Webhook server started");

        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal)
            .await
        {
            tracing::error!("Webhook server error: {e}");
        }

        tracing::info!("Webhook server stopped");
    });

    Ok(WebhookServer {
        addr,
        shutdown_tx: Some(shutdown_tx),
        task,
    })
}
