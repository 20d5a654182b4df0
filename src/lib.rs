pub mod api;
pub mod config;
pub mod fulfillment;
pub mod generative;
pub mod knowledge;
pub mod training;
pub mod triage;
pub mod unrecognized;

#[cfg(test)]
mod query_audit;

use std::sync::Arc;

use thiserror::Error;
use tracing_subscriber::EnvFilter;

use crate::api::{start_webhook_server_on, ApiContext, ServerError};
use crate::config::{ConfigError, WebhookConfig};
use crate::fulfillment::RequestHandler;
use crate::generative::GenerativeError;

#[derive(Error, Debug)]
pub enum StartupError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Generative client setup failed: {0}")]
    Generative(#[from] GenerativeError),

    #[error(transparent)]
    Server(#[from] ServerError),
}

/// Install the global tracing subscriber. `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();
}

/// Load configuration, start the webhook server, and serve until Ctrl-C.
pub async fn run() -> Result<(), StartupError> {
    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let config = WebhookConfig::from_env()?;
    tracing::info!(
        fallback_intent = %config.fallback_intent,
        triage_intents = ?config.triage_intents,
        log_path = %config.unrecognized_log.path.display(),
        "Configuration loaded"
    );

    let handler = Arc::new(RequestHandler::from_config(&config)?);
    let mut server = start_webhook_server_on(config.socket_addr(), ApiContext::new(handler)).await?;

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Cannot listen for shutdown signal: {e}");
    }
    server.shutdown();
    server.join().await;
    Ok(())
}
