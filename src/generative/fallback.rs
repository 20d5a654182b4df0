use std::sync::Arc;
use std::time::Duration;

use super::client::{ChatCompletionClient, DisabledGenerator};
use super::{GenerativeError, TextGenerator};
use crate::config::GenerativeConfig;

/// Instruction sent with every fallback query.
pub const SYSTEM_INSTRUCTION: &str = "You are a helpful medical assistant. \
Answer briefly in plain language, and advise consulting a doctor for serious conditions.";

/// Returned whenever the generative service cannot produce an answer.
pub const APOLOGY_RESPONSE: &str = "I'm sorry, I'm having trouble answering that right now. \
Please try again later, or consult a healthcare professional if you are concerned.";

/// Fail-soft wrapper around a `TextGenerator`.
///
/// Calls are bounded by `timeout` regardless of the backend, and any error
/// is logged by kind and replaced with `APOLOGY_RESPONSE`.
#[derive(Clone)]
pub struct GenerativeFallback {
    generator: Arc<dyn TextGenerator>,
    timeout: Duration,
}

impl GenerativeFallback {
    pub fn new(generator: Arc<dyn TextGenerator>, timeout: Duration) -> Self {
        Self { generator, timeout }
    }

    /// Build the production fallback. Without an API key the generative
    /// path is disabled and every answer is the apology.
    pub fn from_config(config: &GenerativeConfig) -> Result<Self, GenerativeError> {
        let generator: Arc<dyn TextGenerator> = match ChatCompletionClient::from_config(config) {
            Ok(client) => {
                tracing::info!(model = %config.model, "Generative fallback enabled");
                Arc::new(client)
            }
            Err(GenerativeError::NotConfigured) => {
                tracing::warn!("OPENAI_API_KEY not set; generative fallback disabled");
                Arc::new(DisabledGenerator)
            }
            Err(e) => return Err(e),
        };
        Ok(Self::new(generator, config.timeout))
    }

    /// Ask the generator, surfacing the typed error.
    pub async fn try_answer(&self, query: &str) -> Result<String, GenerativeError> {
        match tokio::time::timeout(self.timeout, self.generator.generate(SYSTEM_INSTRUCTION, query))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(GenerativeError::Timeout(self.timeout)),
        }
    }

    /// Answer a free-text query. Never fails.
    pub async fn answer(&self, query: &str) -> String {
        match self.try_answer(query).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(kind = e.kind(), error = %e, "Generative fallback failed");
                APOLOGY_RESPONSE.to_string()
            }
        }
    }
}
