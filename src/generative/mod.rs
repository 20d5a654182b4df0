//! Generative text fallback for queries the agent cannot handle locally.
//!
//! `TextGenerator` is the seam: `ChatCompletionClient` talks to an
//! OpenAI-compatible chat endpoint, `MockGenerator` stands in for tests.
//! `GenerativeFallback` wraps any generator with a latency bound and
//! collapses every failure into one apology string.

pub mod client;
pub mod fallback;

pub use client::*;
pub use fallback::*;

use std::time::Duration;

use futures_util::future::BoxFuture;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerativeError {
    #[error("No API key configured for the generative service")]
    NotConfigured,

    #[error("Generative request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Generative service quota or rate limit exceeded (status {status})")]
    Quota { status: u16 },

    #[error("Cannot reach generative service: {0}")]
    Network(String),

    #[error("Generative service returned error (status {status}): {body}")]
    Status { status: u16, body: String },

    #[error("Malformed generative response: {0}")]
    MalformedResponse(String),

    #[error("HTTP client error: {0}")]
    HttpClient(String),
}

impl GenerativeError {
    /// Short stable label for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotConfigured => "not_configured",
            Self::Timeout(_) => "timeout",
            Self::Quota { .. } => "quota",
            Self::Network(_) => "network",
            Self::Status { .. } => "status",
            Self::MalformedResponse(_) => "malformed_response",
            Self::HttpClient(_) => "http_client",
        }
    }
}

/// Generative text backend abstraction (allows mocking).
pub trait TextGenerator: Send + Sync {
    fn generate<'a>(
        &'a self,
        system: &'a str,
        prompt: &'a str,
    ) -> BoxFuture<'a, Result<String, GenerativeError>>;
}
