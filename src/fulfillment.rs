//! Per-request dispatch for the webhook.
//!
//! Order of precedence:
//! 1. a non-blank knowledge-base answer is returned as-is (markers stripped)
//! 2. the configured fallback intent gets a clarification and is logged
//! 3. configured triage intents are classified and answered from templates
//! 4. anything else goes to the generative fallback and is logged
//!
//! No state is kept between requests apart from the unrecognized log.

use std::sync::Arc;

use crate::config::WebhookConfig;
use crate::generative::{GenerativeError, GenerativeFallback};
use crate::knowledge::extract_answer;
use crate::triage::{classify_triage, response_for, TriageCategory};
use crate::unrecognized::UnrecognizedLog;

/// Parameters extracted from one webhook call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IncomingRequest {
    pub intent_name: String,
    pub query_text: String,
    pub symptom: String,
    pub severity: String,
    pub duration: String,
    pub knowledge_answer: Option<String>,
}

/// Which branch produced the reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchPath {
    KnowledgeBase,
    FallbackIntent,
    Triage(TriageCategory),
    Generative,
}

impl std::fmt::Display for DispatchPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::KnowledgeBase => write!(f, "knowledge_base"),
            Self::FallbackIntent => write!(f, "fallback_intent"),
            Self::Triage(category) => write!(f, "triage:{category}"),
            Self::Generative => write!(f, "generative"),
        }
    }
}

/// Reply text plus the branch that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fulfillment {
    pub text: String,
    pub path: DispatchPath,
}

/// Clarification for the platform's fallback intent.
pub fn clarification_for(query: &str) -> String {
    let query = query.trim();
    if query.is_empty() {
        "Sorry, I didn't catch that. Could you describe your symptoms again?".to_string()
    } else {
        format!(
            "Sorry, I didn't understand \"{query}\". \
             Could you rephrase, or tell me your symptom, how severe it is, and how long you've had it?"
        )
    }
}

pub struct RequestHandler {
    fallback_intent: String,
    triage_intents: Vec<String>,
    unrecognized: Arc<UnrecognizedLog>,
    generative: GenerativeFallback,
}

impl RequestHandler {
    pub fn new(
        config: &WebhookConfig,
        unrecognized: Arc<UnrecognizedLog>,
        generative: GenerativeFallback,
    ) -> Self {
        Self {
            fallback_intent: config.fallback_intent.clone(),
            triage_intents: config.triage_intents.clone(),
            unrecognized,
            generative,
        }
    }

    /// Wire up the production collaborators from validated configuration.
    pub fn from_config(config: &WebhookConfig) -> Result<Self, GenerativeError> {
        let generative = GenerativeFallback::from_config(&config.generative)?;
        let unrecognized = Arc::new(UnrecognizedLog::new(&config.unrecognized_log));
        Ok(Self::new(config, unrecognized, generative))
    }

    pub fn unrecognized_log(&self) -> &Arc<UnrecognizedLog> {
        &self.unrecognized
    }

    /// Produce the reply for one request. Every branch yields text.
    pub async fn handle(&self, req: &IncomingRequest) -> Fulfillment {
        if let Some(answer) = req.knowledge_answer.as_deref().and_then(extract_answer) {
            return Fulfillment {
                text: answer,
                path: DispatchPath::KnowledgeBase,
            };
        }

        if req.intent_name == self.fallback_intent {
            let text = clarification_for(&req.query_text);
            self.record_unrecognized(&req.query_text, &text).await;
            return Fulfillment {
                text,
                path: DispatchPath::FallbackIntent,
            };
        }

        if self.is_triage_intent(&req.intent_name) {
            let category = classify_triage(
                &req.symptom.trim().to_lowercase(),
                &req.severity.to_lowercase(),
                &req.duration,
            );
            tracing::debug!(intent = %req.intent_name, %category, "Triage classified");
            return Fulfillment {
                text: response_for(category).to_string(),
                path: DispatchPath::Triage(category),
            };
        }

        let text = self.generative.answer(&req.query_text).await;
        self.record_unrecognized(&req.query_text, &text).await;
        Fulfillment {
            text,
            path: DispatchPath::Generative,
        }
    }

    /// Exact, case-sensitive match against the configured triage intents.
    pub fn is_triage_intent(&self, intent: &str) -> bool {
        self.triage_intents.iter().any(|i| i == intent)
    }

    /// Append to the unrecognized log off the async executor.
    /// Failures are reported and swallowed; the reply still goes out.
    async fn record_unrecognized(&self, query: &str, response: &str) {
        let log = Arc::clone(&self.unrecognized);
        let (query, response) = (query.to_string(), response.to_string());

        match tokio::task::spawn_blocking(move || log.append(&query, &response)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::warn!(error = %e, "Failed to record unrecognized query"),
            Err(e) => tracing::warn!(error = %e, "Unrecognized log task failed"),
        }
    }
}
