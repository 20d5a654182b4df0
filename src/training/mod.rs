//! Offline tooling for the dialogue platform's training data.
//!
//! `catalog` generates `intent,phrase,response` rows for the built-in
//! symptom intents, `intents` reads such a file and groups it per intent,
//! and `upload` pushes each grouped intent to the platform's REST API.
//! The loader is one-shot: no retry, no idempotence, no conflict handling.

pub mod catalog;
pub mod intents;
pub mod upload;

pub use catalog::*;
pub use intents::*;
pub use upload::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrainingError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Dialogflow returned error for intent {intent:?} (status {status}): {body}")]
    Api {
        intent: String,
        status: u16,
        body: String,
    },

    #[error("Malformed Dialogflow response: {0}")]
    ResponseParsing(String),

    #[error("A Dialogflow project id is required (--project-id or DIALOGFLOW_PROJECT_ID)")]
    MissingProjectId,

    #[error("A Dialogflow access token is required (--access-token or DIALOGFLOW_ACCESS_TOKEN)")]
    MissingAccessToken,
}
