//! Step service client: transport trait, wire shapes, and the reqwest
//! implementation.
//!
//! The service answers a step submission with one of three body shapes: a
//! bare step object, a wrapper carrying final answers and/or the next step
//! under `current_step`, or `null`. That discrimination happens exactly once
//! here, producing [`StepAdvance`]; nothing downstream re-inspects raw JSON.

use std::env;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Map, Value};

use intake_core::model::Step;

use crate::error::StepApiError;

//
// ─── WIRE SHAPES ───────────────────────────────────────────────────────────────
//

/// Wire payload for a step submission: question code to normalized value.
pub type AnswerPayload = Map<String, Value>;

/// Complete answer snapshot reported by the service once the questionnaire
/// has no further steps.
pub type FinalAnswers = Map<String, Value>;

/// Session bootstrap data returned by the step service.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionInit {
    #[serde(rename = "public_id")]
    pub session_id: String,
    #[serde(default)]
    pub current_step: Option<Step>,
}

/// One entry of a rejection body's `errors` list.
///
/// The service mixes bare message strings with structured items, and
/// structured items identify the offending question under several keys.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ServerErrorItem {
    Message(String),
    Item {
        #[serde(default)]
        question: Option<String>,
        #[serde(default)]
        question_code: Option<String>,
        #[serde(default)]
        field: Option<String>,
        #[serde(default)]
        message: Option<String>,
        #[serde(default)]
        detail: Option<String>,
    },
}

impl ServerErrorItem {
    /// Question code this item refers to, if any identifying key is present.
    /// Bare message strings identify no question.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Message(_) => None,
            Self::Item {
                question,
                question_code,
                field,
                ..
            } => question
                .as_deref()
                .or(question_code.as_deref())
                .or(field.as_deref()),
        }
    }

    /// Human-readable message carried by the item.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Message(message) => Some(message),
            Self::Item {
                message, detail, ..
            } => message.as_deref().or(detail.as_deref()),
        }
    }
}

/// Outcome of an accepted step submission, decided once at the protocol
/// boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum StepAdvance {
    /// The service returned the next step to present. A wrapper response may
    /// also carry an answer snapshot alongside the step.
    Next {
        step: Step,
        answers: Option<FinalAnswers>,
    },
    /// No further step: the questionnaire is complete.
    Complete { answers: Option<FinalAnswers> },
}

/// Raw submission response body before discrimination.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawAdvance {
    // A bare step requires `code` and `title`, so wrapper bodies fall
    // through to the second variant.
    Bare(Step),
    Wrapped {
        #[serde(default)]
        answers: Option<FinalAnswers>,
        #[serde(default)]
        current_step: Option<Step>,
    },
}

fn resolve_advance(raw: Option<RawAdvance>) -> StepAdvance {
    match raw {
        Some(RawAdvance::Bare(step)) => StepAdvance::Next {
            step,
            answers: None,
        },
        Some(RawAdvance::Wrapped {
            answers,
            current_step: Some(step),
        }) => StepAdvance::Next {
            step,
            answers,
        },
        Some(RawAdvance::Wrapped {
            answers,
            current_step: None,
        }) => StepAdvance::Complete { answers },
        None => StepAdvance::Complete { answers: None },
    }
}

#[derive(Debug, Deserialize)]
struct RejectionBody {
    #[serde(default)]
    errors: Option<Vec<ServerErrorItem>>,
}

//
// ─── TRANSPORT SEAM ────────────────────────────────────────────────────────────
//

/// Remote step service operations consumed by the flow orchestration.
#[async_trait]
pub trait StepApi: Send + Sync {
    /// Create or resume a questionnaire session.
    async fn initialize_session(&self) -> Result<SessionInit, StepApiError>;

    /// Fetch a step by its numeric identifier.
    async fn fetch_step(&self, step_id: u32) -> Result<Step, StepApiError>;

    /// Submit the current step's answers and interpret the response.
    async fn send_step_answer(
        &self,
        session_id: &str,
        step_code: &str,
        payload: AnswerPayload,
    ) -> Result<StepAdvance, StepApiError>;
}

#[derive(Clone, Debug)]
pub struct StepApiConfig {
    pub base_url: String,
}

impl StepApiConfig {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    #[must_use]
    pub fn from_env() -> Option<Self> {
        let base_url = env::var("INTAKE_API_BASE_URL").ok()?;
        if base_url.trim().is_empty() {
            return None;
        }
        Some(Self::new(base_url))
    }
}

/// HTTP implementation of [`StepApi`].
#[derive(Clone)]
pub struct HttpStepApi {
    client: Client,
    config: StepApiConfig,
}

impl HttpStepApi {
    #[must_use]
    pub fn new(config: StepApiConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.config.base_url.trim_end_matches('/'))
    }

    /// Maps a non-success response to an error, preferring a parsed
    /// `{ "errors": [...] }` validation body over the bare status.
    async fn rejection(response: reqwest::Response) -> StepApiError {
        let status = response.status().as_u16();
        let url = response.url().to_string();
        let errors = response
            .json::<RejectionBody>()
            .await
            .ok()
            .and_then(|body| body.errors);
        match errors {
            Some(errors) if !errors.is_empty() => StepApiError::Validation {
                status,
                url,
                errors,
            },
            _ => StepApiError::Status { status, url },
        }
    }
}

#[async_trait]
impl StepApi for HttpStepApi {
    async fn initialize_session(&self) -> Result<SessionInit, StepApiError> {
        let response = self.client.post(self.url("sessions")).send().await?;
        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }
        Ok(response.json().await?)
    }

    async fn fetch_step(&self, step_id: u32) -> Result<Step, StepApiError> {
        let response = self
            .client
            .get(self.url(&format!("steps/{step_id}")))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }
        Ok(response.json().await?)
    }

    async fn send_step_answer(
        &self,
        session_id: &str,
        step_code: &str,
        payload: AnswerPayload,
    ) -> Result<StepAdvance, StepApiError> {
        let url = self.url(&format!("sessions/{session_id}/steps/{step_code}/answers"));
        let response = self.client.post(url).json(&payload).send().await?;
        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }
        let raw: Option<RawAdvance> = response.json().await?;
        Ok(resolve_advance(raw))
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
