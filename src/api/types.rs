//! Shared state and wire types for the webhook API.
//!
//! The request types mirror the dialogue platform's webhook payload. Every
//! field defaults, so a payload missing `queryResult` or any of its children
//! still deserializes and is dispatched with empty strings.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::fulfillment::{IncomingRequest, RequestHandler};

// ═══════════════════════════════════════════════════════════
// API context: shared state for the router
// ═══════════════════════════════════════════════════════════

#[derive(Clone)]
pub struct ApiContext {
    pub handler: Arc<RequestHandler>,
}

impl ApiContext {
    pub fn new(handler: Arc<RequestHandler>) -> Self {
        Self { handler }
    }
}

// ═══════════════════════════════════════════════════════════
// Webhook payload
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WebhookRequest {
    pub query_result: QueryResult,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QueryResult {
    pub query_text: String,
    pub parameters: Map<String, Value>,
    pub intent: Intent,
    pub knowledge_answers: Option<KnowledgeAnswers>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Intent {
    pub display_name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct KnowledgeAnswers {
    pub answers: Vec<KnowledgeAnswer>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct KnowledgeAnswer {
    pub answer: String,
}

impl WebhookRequest {
    pub fn into_incoming(self) -> IncomingRequest {
        let q = self.query_result;
        let param = |name: &str| q.parameters.get(name).map(parameter_text).unwrap_or_default();

        IncomingRequest {
            symptom: param("symptom"),
            severity: param("severity"),
            duration: param("duration"),
            knowledge_answer: q
                .knowledge_answers
                .as_ref()
                .and_then(|k| k.answers.first())
                .map(|a| a.answer.clone()),
            intent_name: q.intent.display_name,
            query_text: q.query_text,
        }
    }
}

/// Flatten a platform parameter value to text.
///
/// Entity values are usually strings, but system entities arrive as numbers,
/// lists, or `{ "amount": 3, "unit": "day" }` objects.
pub fn parameter_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items
            .iter()
            .map(parameter_text)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" "),
        Value::Object(map) => match (map.get("amount"), map.get("unit")) {
            (Some(amount), Some(unit)) => {
                format!("{} {}", parameter_text(amount), parameter_text(unit))
            }
            _ => String::new(),
        },
    }
}

// ═══════════════════════════════════════════════════════════
// Webhook response
// ═══════════════════════════════════════════════════════════

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WebhookResponse {
    pub fulfillment_text: String,
}
