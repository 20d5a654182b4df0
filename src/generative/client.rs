use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use serde::{Deserialize, Serialize};

use super::{GenerativeError, TextGenerator};
use crate::config::GenerativeConfig;

/// HTTP client for an OpenAI-compatible `/chat/completions` endpoint.
pub struct ChatCompletionClient {
    base_url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
    timeout: Duration,
    client: reqwest::Client,
}

impl ChatCompletionClient {
    pub fn new(
        base_url: &str,
        api_key: &str,
        model: &str,
        max_tokens: u32,
        timeout: Duration,
    ) -> Result<Self, GenerativeError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| GenerativeError::HttpClient(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            max_tokens,
            timeout,
            client,
        })
    }

    /// Build from configuration. Fails with `NotConfigured` when no API key is set.
    pub fn from_config(config: &GenerativeConfig) -> Result<Self, GenerativeError> {
        let api_key = config
            .api_key
            .as_deref()
            .ok_or(GenerativeError::NotConfigured)?;
        Self::new(
            &config.base_url,
            api_key,
            &config.model,
            config.max_tokens,
            config.timeout,
        )
    }

    async fn complete(&self, system: &str, prompt: &str) -> Result<String, GenerativeError> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = ChatCompletionRequest {
            model: &self.model,
            messages: [
                ChatMessage { role: "system", content: system },
                ChatMessage { role: "user", content: prompt },
            ],
            max_tokens: self.max_tokens,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(GenerativeError::Quota {
                status: status.as_u16(),
            });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerativeError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatCompletionResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                GenerativeError::Timeout(self.timeout)
            } else {
                GenerativeError::MalformedResponse(e.to_string())
            }
        })?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| GenerativeError::MalformedResponse("completion has no content".into()))
    }

    fn map_transport_error(&self, e: reqwest::Error) -> GenerativeError {
        if e.is_timeout() {
            GenerativeError::Timeout(self.timeout)
        } else if e.is_connect() {
            GenerativeError::Network(self.base_url.clone())
        } else if e.is_builder() {
            GenerativeError::HttpClient(e.to_string())
        } else {
            GenerativeError::Network(e.to_string())
        }
    }
}

impl TextGenerator for ChatCompletionClient {
    fn generate<'a>(
        &'a self,
        system: &'a str,
        prompt: &'a str,
    ) -> BoxFuture<'a, Result<String, GenerativeError>> {
        self.complete(system, prompt).boxed()
    }
}

/// Stand-in used when no API key is configured.
pub struct DisabledGenerator;

impl TextGenerator for DisabledGenerator {
    fn generate<'a>(
        &'a self,
        _system: &'a str,
        _prompt: &'a str,
    ) -> BoxFuture<'a, Result<String, GenerativeError>> {
        async { Err(GenerativeError::NotConfigured) }.boxed()
    }
}

/// Request body for `/chat/completions`
#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    max_tokens: u32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

/// Response body from `/chat/completions`
#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// Mock generator for testing. Returns a configurable response or failure.
pub struct MockGenerator {
    response: Option<String>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    last_system: Mutex<Option<String>>,
}

impl MockGenerator {
    pub fn new(response: &str) -> Self {
        Self {
            response: Some(response.to_string()),
            delay: None,
            calls: AtomicUsize::new(0),
            last_system: Mutex::new(None),
        }
    }

    /// A generator whose every call fails with a network error.
    pub fn failing() -> Self {
        Self {
            response: None,
            ..Self::new("")
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_system(&self) -> Option<String> {
        self.last_system.lock().ok().and_then(|s| s.clone())
    }
}

impl TextGenerator for MockGenerator {
    fn generate<'a>(
        &'a self,
        system: &'a str,
        _prompt: &'a str,
    ) -> BoxFuture<'a, Result<String, GenerativeError>> {
        async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Ok(mut last) = self.last_system.lock() {
                *last = Some(system.to_string());
            }
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.response
                .clone()
                .ok_or_else(|| GenerativeError::Network("mock failure".into()))
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;

    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{json, Value};

    use super::*;

    /// Serve `router` on an ephemeral localhost port and return its base URL.
    async fn spawn_stub(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
            .await
            .unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}/v1")
    }

    fn client(base_url: &str, timeout: Duration) -> ChatCompletionClient {
        ChatCompletionClient::new(base_url, "sk-test", "gpt-test", 42, timeout).unwrap()
    }

    #[tokio::test]
    async fn returns_trimmed_completion_and_sends_expected_request() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|headers: HeaderMap, Json(body): Json<Value>| async move {
                let auth = headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_string();
                let content = format!(
                    "  {}|{}|{}|{}|{}  ",
                    auth,
                    body["model"].as_str().unwrap_or_default(),
                    body["max_tokens"],
                    body["messages"][0]["role"].as_str().unwrap_or_default(),
                    body["messages"][1]["content"].as_str().unwrap_or_default(),
                );
                Json(json!({ "choices": [{ "message": { "role": "assistant", "content": content } }] }))
            }),
        );
        let base = spawn_stub(router).await;

        let text = client(&base, Duration::from_secs(5))
            .generate("be helpful", "what is a fever?")
            .await
            .unwrap();
        assert_eq!(text, "Bearer sk-test|gpt-test|42|system|what is a fever?");
    }

    #[tokio::test]
    async fn too_many_requests_maps_to_quota() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|| async { (StatusCode::TOO_MANY_REQUESTS, "insufficient_quota") }),
        );
        let base = spawn_stub(router).await;

        let err = client(&base, Duration::from_secs(5))
            .generate("s", "p")
            .await
            .unwrap_err();
        assert!(matches!(err, GenerativeError::Quota { status: 429 }));
        assert_eq!(err.kind(), "quota");
    }

    #[tokio::test]
    async fn server_error_maps_to_status_with_body() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        );
        let base = spawn_stub(router).await;

        let err = client(&base, Duration::from_secs(5))
            .generate("s", "p")
            .await
            .unwrap_err();
        match err {
            GenerativeError::Status { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "boom");
            }
            other => panic!("expected Status, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn non_json_body_is_malformed() {
        let router = Router::new().route("/v1/chat/completions", post(|| async { "not json" }));
        let base = spawn_stub(router).await;

        let err = client(&base, Duration::from_secs(5))
            .generate("s", "p")
            .await
            .unwrap_err();
        assert!(matches!(err, GenerativeError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn empty_choices_is_malformed() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|| async { Json(json!({ "choices": [] })) }),
        );
        let base = spawn_stub(router).await;

        let err = client(&base, Duration::from_secs(5))
            .generate("s", "p")
            .await
            .unwrap_err();
        assert!(matches!(err, GenerativeError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn slow_service_times_out() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(3)).await;
                Json(json!({ "choices": [] }))
            }),
        );
        let base = spawn_stub(router).await;

        let err = client(&base, Duration::from_millis(200))
            .generate("s", "p")
            .await
            .unwrap_err();
        assert!(matches!(err, GenerativeError::Timeout(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn unreachable_service_is_network_error() {
        // Reserve a port, then release it so nothing is listening.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = client(&format!("http://{addr}/v1"), Duration::from_secs(2))
            .generate("s", "p")
            .await
            .unwrap_err();
        assert!(matches!(err, GenerativeError::Network(_)), "got {err:?}");
    }

    #[test]
    fn from_config_requires_api_key() {
        let config = crate::config::WebhookConfig::default().generative;
        assert!(matches!(
            ChatCompletionClient::from_config(&config),
            Err(GenerativeError::NotConfigured)
        ));
    }

    #[test]
    fn constructor_trims_trailing_slash() {
        let c = client("http://localhost:9000/v1/", Duration::from_secs(1));
        assert_eq!(c.base_url, "http://localhost:9000/v1");
        assert_eq!(c.max_tokens, 42);
    }

    #[tokio::test]
    async fn disabled_generator_always_errors() {
        let err = DisabledGenerator.generate("s", "p").await.unwrap_err();
        assert!(matches!(err, GenerativeError::NotConfigured));
    }

    #[tokio::test]
    async fn mock_generator_records_calls() {
        let mock = MockGenerator::new("hello");
        assert_eq!(mock.generate("sys", "p").await.unwrap(), "hello");
        assert_eq!(mock.calls(), 1);
        assert_eq!(mock.last_system().as_deref(), Some("sys"));

        let failing = MockGenerator::failing();
        assert!(failing.generate("sys", "p").await.is_err());
    }
}
