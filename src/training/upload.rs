use serde::Serialize;

use super::intents::IntentDefinition;
use super::TrainingError;

pub const DEFAULT_DIALOGFLOW_BASE_URL: &str = "https://dialogflow.googleapis.com";

/// Minimal client for the Dialogflow ES v2 intents API.
pub struct DialogflowClient {
    base_url: String,
    project_id: String,
    access_token: String,
    client: reqwest::Client,
}

impl DialogflowClient {
    pub fn new(base_url: &str, project_id: &str, access_token: &str) -> Result<Self, TrainingError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| TrainingError::HttpClient(e.to_string()))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            project_id: project_id.to_string(),
            access_token: access_token.to_string(),
            client,
        })
    }

    pub fn intents_url(&self) -> String {
        format!(
            "{}/v2/projects/{}/agent/intents",
            self.base_url, self.project_id
        )
    }

    /// Create one intent. Returns the platform's resource name when present.
    pub async fn create_intent(
        &self,
        intent: &IntentDefinition,
    ) -> Result<Option<String>, TrainingError> {
        let response = self
            .client
            .post(self.intents_url())
            .bearer_auth(&self.access_token)
            .json(&IntentPayload::from(intent))
            .send()
            .await
            .map_err(|e| TrainingError::HttpClient(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TrainingError::Api {
                intent: intent.display_name.clone(),
                status: status.as_u16(),
                body,
            });
        }

        let created: serde_json::Value = response
            .json()
            .await
            .map_err(|e| TrainingError::ResponseParsing(e.to_string()))?;
        Ok(created
            .get("name")
            .and_then(|n| n.as_str())
            .map(str::to_string))
    }

    /// Create every intent in order, stopping at the first failure.
    ///
    /// `on_created` runs after each success with the intent's display name.
    pub async fn create_all<F>(
        &self,
        intents: &[IntentDefinition],
        mut on_created: F,
    ) -> Result<usize, TrainingError>
    where
        F: FnMut(&IntentDefinition),
    {
        for (created, intent) in intents.iter().enumerate() {
            if let Err(e) = self.create_intent(intent).await {
                tracing::error!(
                    intent = %intent.display_name,
                    created,
                    error = %e,
                    "Intent upload stopped"
                );
                return Err(e);
            }
            on_created(intent);
        }
        Ok(intents.len())
    }
}

/// Request body for `projects.agent.intents.create`
#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IntentPayload<'a> {
    pub display_name: &'a str,
    pub training_phrases: Vec<TrainingPhrase<'a>>,
    pub messages: Vec<IntentMessage<'a>>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct TrainingPhrase<'a> {
    #[serde(rename = "type")]
    pub phrase_type: &'static str,
    pub parts: [PhrasePart<'a>; 1],
}

#[derive(Debug, Serialize, PartialEq)]
pub struct PhrasePart<'a> {
    pub text: &'a str,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct IntentMessage<'a> {
    pub text: MessageText<'a>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct MessageText<'a> {
    pub text: [&'a str; 1],
}

impl<'a> From<&'a IntentDefinition> for IntentPayload<'a> {
    fn from(def: &'a IntentDefinition) -> Self {
        Self {
            display_name: &def.display_name,
            training_phrases: def
                .phrases
                .iter()
                .map(|p| TrainingPhrase {
                    phrase_type: "EXAMPLE",
                    parts: [PhrasePart { text: p.as_str() }],
                })
                .collect(),
            messages: def
                .responses
                .iter()
                .map(|r| IntentMessage {
                    text: MessageText { text: [r.as_str()] },
                })
                .collect(),
        }
    }
}
