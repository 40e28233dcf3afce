//! API Models
//!
//! Request and response bodies for the HTTP API. Core types are mirrored here
//! so that `utoipa` can generate their OpenAPI schemas.

use interview_core::{FeedbackRecord, InterviewState, SessionContext};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, Copy, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Init,
    Question,
    Followup,
    Feedback,
    End,
}

impl From<InterviewState> for SessionState {
    fn from(state: InterviewState) -> Self {
        match state {
            InterviewState::Init => SessionState::Init,
            InterviewState::Question => SessionState::Question,
            InterviewState::Followup => SessionState::Followup,
            InterviewState::Feedback => SessionState::Feedback,
            InterviewState::End => SessionState::End,
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq)]
pub struct Feedback {
    /// Scores as the generator returned them; usually numbers.
    #[schema(value_type = Object, example = json!({"clarity": 4, "technical_depth": 3}))]
    pub scores: BTreeMap<String, serde_json::Value>,
    pub strengths: Vec<String>,
    pub improvements: Vec<String>,
    /// The generator's reply when it could not be parsed as structured feedback.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
}

impl From<FeedbackRecord> for Feedback {
    fn from(record: FeedbackRecord) -> Self {
        Self {
            scores: record.scores,
            strengths: record.strengths,
            improvements: record.improvements,
            raw: record.raw,
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone)]
pub struct SessionView {
    #[schema(value_type = String, format = Uuid)]
    pub id: Uuid,
    pub state: SessionState,
    #[schema(example = "software_engineer")]
    pub role: String,
    #[schema(example = "mid")]
    pub seniority: String,
    #[schema(example = "backend")]
    pub domain: String,
    #[schema(example = "efficient")]
    pub persona: String,
    pub answers: Vec<String>,
    pub feedback: Vec<Feedback>,
    pub average_scores: BTreeMap<String, f64>,
}

impl SessionView {
    pub fn new(id: Uuid, state: InterviewState, context: &SessionContext) -> Self {
        Self {
            id,
            state: state.into(),
            role: context.role.clone(),
            seniority: context.seniority.clone(),
            domain: context.domain.clone(),
            persona: context.persona.clone(),
            answers: context.answers.clone(),
            feedback: context.feedback.iter().cloned().map(Feedback::from).collect(),
            average_scores: context.average_scores(),
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct CreateSessionPayload {
    #[schema(example = "Software Engineer")]
    pub role: String,
    #[schema(example = "Mid")]
    pub seniority: String,
    #[schema(example = "Backend")]
    pub domain: String,
    #[schema(example = "Efficient")]
    pub persona: String,
}

#[derive(Deserialize, ToSchema)]
pub struct AnswerPayload {
    #[schema(example = "I would put a cache in front of the read path and measure the hit rate.")]
    pub answer: String,
}

#[derive(Serialize, Deserialize, ToSchema, Debug)]
pub struct TextResponse {
    pub text: String,
    pub state: SessionState,
}

#[derive(Serialize, Deserialize, ToSchema, Debug)]
pub struct FeedbackResponse {
    pub feedback: Feedback,
    pub state: SessionState,
}

#[derive(Serialize, Deserialize, ToSchema, Debug)]
pub struct CatalogView {
    /// Role id to its valid domains; the first domain is the fallback.
    pub roles: BTreeMap<String, Vec<String>>,
    pub personas: Vec<String>,
}

#[derive(Serialize, Deserialize, ToSchema, Debug)]
pub struct HealthResponse {
    pub status: String,
    pub provider: String,
    pub model: String,
}

#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub message: String,
}
